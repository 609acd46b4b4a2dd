//! Rule-based sentiment scorer (VADER rules)
//!
//! Output order is fixed: `[compound, positive, negative, neutral]`.
//!
//! Normalized text is lowercase and punctuation-free, so the capitalization
//! and punctuation-emphasis rules never fire and are omitted. Everything else
//! follows VADER: lexicon valence, booster/dampener words with distance decay,
//! negation in a three-token window, "no" handling, special idioms, the
//! "least" check, "kind of" neutralization and the "but" shift.

use super::lexicon::SentimentLexicon;
use crate::fusion::SENTIMENT_DIM;

/// Empirical booster increment
const B_INCR: f64 = 0.293;
const B_DECR: f64 = -0.293;
/// Negation scalar
const N_SCALAR: f64 = -0.74;
/// Compound normalization constant
const ALPHA: f64 = 15.0;

const NEGATE: &[&str] = &[
    "aint", "arent", "cannot", "cant", "couldnt", "darent", "didnt", "doesnt", "ain't", "aren't",
    "can't", "couldn't", "daren't", "didn't", "doesn't", "dont", "hadnt", "hasnt", "havent",
    "isnt", "mightnt", "mustnt", "neither", "don't", "hadn't", "hasn't", "haven't", "isn't",
    "mightn't", "mustn't", "neednt", "needn't", "never", "none", "nope", "nor", "not", "nothing",
    "nowhere", "oughtnt", "shant", "shouldnt", "uhuh", "wasnt", "werent", "oughtn't", "shan't",
    "shouldn't", "uh-uh", "wasn't", "weren't", "without", "wont", "wouldnt", "won't", "wouldn't",
    "rarely", "seldom", "despite",
];

const BOOSTERS: &[(&str, f64)] = &[
    ("absolutely", B_INCR),
    ("amazingly", B_INCR),
    ("awfully", B_INCR),
    ("completely", B_INCR),
    ("considerable", B_INCR),
    ("considerably", B_INCR),
    ("decidedly", B_INCR),
    ("deeply", B_INCR),
    ("effing", B_INCR),
    ("enormous", B_INCR),
    ("enormously", B_INCR),
    ("entirely", B_INCR),
    ("especially", B_INCR),
    ("exceptional", B_INCR),
    ("exceptionally", B_INCR),
    ("extreme", B_INCR),
    ("extremely", B_INCR),
    ("fabulously", B_INCR),
    ("flipping", B_INCR),
    ("flippin", B_INCR),
    ("frackin", B_INCR),
    ("fracking", B_INCR),
    ("fricking", B_INCR),
    ("frickin", B_INCR),
    ("frigging", B_INCR),
    ("friggin", B_INCR),
    ("fully", B_INCR),
    ("greatly", B_INCR),
    ("hella", B_INCR),
    ("highly", B_INCR),
    ("hugely", B_INCR),
    ("incredible", B_INCR),
    ("incredibly", B_INCR),
    ("intensely", B_INCR),
    ("major", B_INCR),
    ("majorly", B_INCR),
    ("more", B_INCR),
    ("most", B_INCR),
    ("particularly", B_INCR),
    ("purely", B_INCR),
    ("quite", B_INCR),
    ("really", B_INCR),
    ("remarkably", B_INCR),
    ("so", B_INCR),
    ("substantially", B_INCR),
    ("thoroughly", B_INCR),
    ("total", B_INCR),
    ("totally", B_INCR),
    ("tremendous", B_INCR),
    ("tremendously", B_INCR),
    ("uber", B_INCR),
    ("unbelievably", B_INCR),
    ("unusually", B_INCR),
    ("utter", B_INCR),
    ("utterly", B_INCR),
    ("very", B_INCR),
    ("almost", B_DECR),
    ("barely", B_DECR),
    ("hardly", B_DECR),
    ("just enough", B_DECR),
    ("kind of", B_DECR),
    ("kinda", B_DECR),
    ("kindof", B_DECR),
    ("kind-of", B_DECR),
    ("less", B_DECR),
    ("little", B_DECR),
    ("marginal", B_DECR),
    ("marginally", B_DECR),
    ("occasional", B_DECR),
    ("occasionally", B_DECR),
    ("partly", B_DECR),
    ("scarce", B_DECR),
    ("scarcely", B_DECR),
    ("slight", B_DECR),
    ("slightly", B_DECR),
    ("somewhat", B_DECR),
    ("sort of", B_DECR),
    ("sorta", B_DECR),
    ("sortof", B_DECR),
    ("sort-of", B_DECR),
];

/// Multi-word expressions whose valence overrides the word's own
const SPECIAL_CASES: &[(&str, f64)] = &[
    ("the shit", 3.0),
    ("the bomb", 3.0),
    ("bad ass", 1.5),
    ("badass", 1.5),
    ("bus stop", 0.0),
    ("yeah right", -2.0),
    ("kiss of death", -1.5),
    ("to die for", 3.0),
    ("beating heart", 3.1),
    ("broken heart", -2.9),
];

fn booster(word: &str) -> Option<f64> {
    BOOSTERS.iter().find(|(w, _)| *w == word).map(|(_, v)| *v)
}

fn special_case(phrase: &str) -> Option<f64> {
    SPECIAL_CASES
        .iter()
        .find(|(p, _)| *p == phrase)
        .map(|(_, v)| *v)
}

fn negated(word: &str) -> bool {
    NEGATE.contains(&word) || word.contains("n't")
}

/// Booster contribution of `word`, signed to follow the valence it modifies
fn scalar_inc_dec(word: &str, valence: f64) -> f64 {
    match booster(word) {
        Some(scalar) if valence < 0.0 => -scalar,
        Some(scalar) => scalar,
        None => 0.0,
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Sentiment scores for one text
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SentimentScores {
    pub compound: f64,
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
}

impl SentimentScores {
    /// Feature segment in `[compound, positive, negative, neutral]` order
    pub fn to_segment(self) -> [f32; SENTIMENT_DIM] {
        [
            self.compound as f32,
            self.positive as f32,
            self.negative as f32,
            self.neutral as f32,
        ]
    }
}

/// Lexicon and rule-based sentiment scorer
#[derive(Debug, Clone, Default)]
pub struct SentimentScorer {
    lexicon: SentimentLexicon,
}

impl SentimentScorer {
    pub fn new(lexicon: SentimentLexicon) -> Self {
        Self { lexicon }
    }

    /// Score normalized text
    pub fn score(&self, text: &str) -> [f32; SENTIMENT_DIM] {
        self.polarity_scores(text).to_segment()
    }

    pub fn polarity_scores(&self, text: &str) -> SentimentScores {
        let words: Vec<&str> = text.split_whitespace().collect();
        let mut sentiments = Vec::with_capacity(words.len());

        for (i, word) in words.iter().enumerate() {
            if booster(word).is_some() {
                sentiments.push(0.0);
                continue;
            }
            if *word == "kind" && words.get(i + 1) == Some(&"of") {
                sentiments.push(0.0);
                continue;
            }
            sentiments.push(self.valence(&words, i));
        }

        but_check(&words, &mut sentiments);
        score_valence(&sentiments)
    }

    fn in_lexicon(&self, word: &str) -> bool {
        self.lexicon.contains(word)
    }

    fn valence(&self, words: &[&str], i: usize) -> f64 {
        let word = words[i];
        let Some(base) = self.lexicon.get(word) else {
            return 0.0;
        };
        let mut valence = base;

        // "no" directly before a lexicon word negates it instead of scoring
        if word == "no" && i + 1 < words.len() && self.in_lexicon(words[i + 1]) {
            valence = 0.0;
        }
        if (i > 0 && words[i - 1] == "no")
            || (i > 1 && words[i - 2] == "no")
            || (i > 2 && words[i - 3] == "no" && matches!(words[i - 1], "or" | "nor"))
        {
            valence = base * N_SCALAR;
        }

        for start_i in 0..3 {
            if i > start_i && !self.in_lexicon(words[i - (start_i + 1)]) {
                let mut s = scalar_inc_dec(words[i - (start_i + 1)], valence);
                if start_i == 1 && s != 0.0 {
                    s *= 0.95;
                }
                if start_i == 2 && s != 0.0 {
                    s *= 0.9;
                }
                valence += s;
                valence = negation_check(valence, words, start_i, i);
                if start_i == 2 {
                    valence = special_idioms_check(valence, words, i);
                }
            }
        }

        self.least_check(valence, words, i)
    }

    fn least_check(&self, valence: f64, words: &[&str], i: usize) -> f64 {
        if i > 1 && words[i - 1] == "least" && !self.in_lexicon(words[i - 1]) {
            if words[i - 2] != "at" && words[i - 2] != "very" {
                return valence * N_SCALAR;
            }
        } else if i > 0 && words[i - 1] == "least" && !self.in_lexicon(words[i - 1]) {
            return valence * N_SCALAR;
        }
        valence
    }
}

fn negation_check(valence: f64, words: &[&str], start_i: usize, i: usize) -> f64 {
    match start_i {
        0 => {
            if negated(words[i - 1]) {
                return valence * N_SCALAR;
            }
        }
        1 => {
            if words[i - 2] == "never" && matches!(words[i - 1], "so" | "this") {
                return valence * 1.25;
            } else if words[i - 2] == "without" && words[i - 1] == "doubt" {
                return valence;
            } else if negated(words[i - 2]) {
                return valence * N_SCALAR;
            }
        }
        2 => {
            if (words[i - 3] == "never" && matches!(words[i - 2], "so" | "this"))
                || matches!(words[i - 1], "so" | "this")
            {
                return valence * 1.25;
            } else if words[i - 3] == "without"
                && (words[i - 2] == "doubt" || words[i - 1] == "doubt")
            {
                return valence;
            } else if negated(words[i - 3]) {
                return valence * N_SCALAR;
            }
        }
        _ => {}
    }
    valence
}

/// Only reached with `i >= 3`
fn special_idioms_check(mut valence: f64, words: &[&str], i: usize) -> f64 {
    let one_zero = format!("{} {}", words[i - 1], words[i]);
    let two_one_zero = format!("{} {} {}", words[i - 2], words[i - 1], words[i]);
    let two_one = format!("{} {}", words[i - 2], words[i - 1]);
    let three_two_one = format!("{} {} {}", words[i - 3], words[i - 2], words[i - 1]);
    let three_two = format!("{} {}", words[i - 3], words[i - 2]);

    for seq in [&one_zero, &two_one_zero, &two_one, &three_two_one, &three_two] {
        if let Some(v) = special_case(seq) {
            valence = v;
            break;
        }
    }

    if words.len() - 1 > i {
        if let Some(v) = special_case(&format!("{} {}", words[i], words[i + 1])) {
            valence = v;
        }
    }
    if words.len() - 1 > i + 1 {
        if let Some(v) =
            special_case(&format!("{} {} {}", words[i], words[i + 1], words[i + 2]))
        {
            valence = v;
        }
    }

    for n_gram in [&three_two_one, &three_two, &two_one] {
        if let Some(b) = booster(n_gram) {
            valence += b;
        }
    }
    valence
}

/// Dampen everything before the first "but", amplify everything after it
fn but_check(words: &[&str], sentiments: &mut [f64]) {
    if let Some(bi) = words.iter().position(|w| *w == "but") {
        for (si, s) in sentiments.iter_mut().enumerate() {
            if si < bi {
                *s *= 0.5;
            } else if si > bi {
                *s *= 1.5;
            }
        }
    }
}

fn normalize_compound(score: f64) -> f64 {
    (score / (score * score + ALPHA).sqrt()).clamp(-1.0, 1.0)
}

fn score_valence(sentiments: &[f64]) -> SentimentScores {
    if sentiments.is_empty() {
        return SentimentScores::default();
    }

    let sum: f64 = sentiments.iter().sum();
    let compound = normalize_compound(sum);

    let mut pos_sum = 0.0;
    let mut neg_sum = 0.0;
    let mut neu_count = 0.0;
    for &s in sentiments {
        if s > 0.0 {
            pos_sum += s + 1.0;
        } else if s < 0.0 {
            neg_sum += s - 1.0;
        } else {
            neu_count += 1.0;
        }
    }

    let total = pos_sum + neg_sum.abs() + neu_count;
    SentimentScores {
        compound: round_to(compound, 4),
        positive: round_to((pos_sum / total).abs(), 3),
        negative: round_to((neg_sum / total).abs(), 3),
        neutral: round_to((neu_count / total).abs(), 3),
    }
}
