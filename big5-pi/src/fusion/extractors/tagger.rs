//! Penn Treebank part-of-speech tagging
//!
//! [`RuleBasedTagger`] is a deterministic tagger for lowercase,
//! punctuation-free text: closed-class lexicon first, then an open-class seed
//! lexicon, suffix rules, and a few left-context rules. It produces the Penn
//! tag set (`JJ`, `JJS`, `NN`, `NNS`, `RB`, `VB`, `VBD`, `VBZ`, ...).
//! It is the fallback when the trained
//! [`AveragedPerceptronTagger`](super::perceptron::AveragedPerceptronTagger)
//! artifact is not available.

use std::collections::HashMap;

/// Assigns one Penn Treebank tag per token
///
/// Tags borrow from the tagger, so a loaded model can hand out its own
/// class names.
pub trait PosTagger: Send + Sync {
    fn tag<'a>(&'a self, tokens: &[&str]) -> Vec<&'a str>;
}

const CLOSED_CLASS: &[(&str, &str)] = &[
    ("a", "DT"),
    ("an", "DT"),
    ("the", "DT"),
    ("this", "DT"),
    ("that", "DT"),
    ("these", "DT"),
    ("those", "DT"),
    ("every", "DT"),
    ("each", "DT"),
    ("some", "DT"),
    ("any", "DT"),
    ("all", "DT"),
    ("no", "DT"),
    ("another", "DT"),
    ("i", "PRP"),
    ("you", "PRP"),
    ("he", "PRP"),
    ("she", "PRP"),
    ("it", "PRP"),
    ("we", "PRP"),
    ("they", "PRP"),
    ("me", "PRP"),
    ("him", "PRP"),
    ("her", "PRP$"),
    ("us", "PRP"),
    ("them", "PRP"),
    ("myself", "PRP"),
    ("yourself", "PRP"),
    ("themselves", "PRP"),
    ("my", "PRP$"),
    ("your", "PRP$"),
    ("his", "PRP$"),
    ("its", "PRP$"),
    ("our", "PRP$"),
    ("their", "PRP$"),
    ("in", "IN"),
    ("on", "IN"),
    ("at", "IN"),
    ("of", "IN"),
    ("for", "IN"),
    ("with", "IN"),
    ("from", "IN"),
    ("by", "IN"),
    ("about", "IN"),
    ("into", "IN"),
    ("over", "IN"),
    ("after", "IN"),
    ("before", "IN"),
    ("because", "IN"),
    ("if", "IN"),
    ("while", "IN"),
    ("than", "IN"),
    ("like", "IN"),
    ("through", "IN"),
    ("during", "IN"),
    ("without", "IN"),
    ("under", "IN"),
    ("since", "IN"),
    ("until", "IN"),
    ("though", "IN"),
    ("although", "IN"),
    ("and", "CC"),
    ("or", "CC"),
    ("but", "CC"),
    ("nor", "CC"),
    ("yet", "CC"),
    ("can", "MD"),
    ("could", "MD"),
    ("will", "MD"),
    ("would", "MD"),
    ("shall", "MD"),
    ("should", "MD"),
    ("may", "MD"),
    ("might", "MD"),
    ("must", "MD"),
    ("to", "TO"),
    ("which", "WDT"),
    ("what", "WP"),
    ("who", "WP"),
    ("whom", "WP"),
    ("when", "WRB"),
    ("where", "WRB"),
    ("why", "WRB"),
    ("how", "WRB"),
    ("there", "EX"),
    ("not", "RB"),
    ("is", "VBZ"),
    ("has", "VBZ"),
    ("does", "VBZ"),
    ("am", "VBP"),
    ("are", "VBP"),
    ("have", "VBP"),
    ("do", "VBP"),
    ("was", "VBD"),
    ("were", "VBD"),
    ("had", "VBD"),
    ("did", "VBD"),
    ("be", "VB"),
    ("been", "VBN"),
    ("being", "VBG"),
    ("one", "CD"),
    ("two", "CD"),
    ("three", "CD"),
    ("oh", "UH"),
    ("yes", "UH"),
    ("yeah", "UH"),
    ("wow", "UH"),
];

const ADJECTIVES: &[&str] = &[
    "good", "bad", "great", "new", "old", "big", "small", "happy", "sad", "nice", "fine",
    "positive", "negative", "important", "different", "hard", "easy", "kind", "calm", "angry",
    "quiet", "loud", "smart", "funny", "friendly", "lazy", "busy", "tired", "creative",
    "curious", "open", "honest", "shy", "nervous", "anxious", "organized", "messy", "social",
    "warm", "cold", "true", "real", "sure", "whole", "own", "other", "same", "few", "many",
    "much", "long", "short", "high", "low", "young", "early", "late", "free", "full", "strong",
    "weak", "right", "wrong", "best", "worst", "better", "worse", "interesting", "boring",
    "amazing", "awesome", "terrible", "horrible", "awful", "beautiful", "perfect", "excited",
    "worried", "upset", "lonely", "proud", "glad", "afraid", "alone", "crazy", "weird",
];

const ADVERBS: &[&str] = &[
    "very", "really", "always", "never", "often", "sometimes", "usually", "just", "also", "too",
    "so", "still", "already", "again", "even", "ever", "here", "now", "then", "only", "quite",
    "almost", "rather", "soon", "maybe", "perhaps", "well", "much", "more", "most", "less",
    "least", "once", "away", "back", "together", "today", "tomorrow", "yesterday", "else",
];

const VERBS: &[&str] = &[
    "love", "hate", "like", "enjoy", "think", "feel", "know", "want", "need", "make", "go",
    "get", "see", "say", "take", "come", "give", "find", "tell", "work", "try", "help", "plan",
    "meet", "talk", "read", "write", "learn", "explore", "keep", "let", "start", "stay", "play",
    "believe", "hope", "worry", "care", "prefer", "spend", "finish", "organize", "create",
    "imagine", "relax", "party", "travel", "listen", "watch", "look", "live", "change", "lose",
    "win", "agree", "trust", "understand", "remember", "forget", "seem", "become", "run",
];

/// Base verb forms reachable from a regular inflection
fn known_verb(word: &str) -> bool {
    VERBS.contains(&word)
}

/// Deterministic lexicon + suffix + context tagger
#[derive(Debug, Clone)]
pub struct RuleBasedTagger {
    closed: HashMap<&'static str, &'static str>,
}

impl RuleBasedTagger {
    pub fn new() -> Self {
        Self {
            closed: CLOSED_CLASS.iter().copied().collect(),
        }
    }

    /// Context-free tag for one token
    fn lexical_tag(&self, word: &str) -> &'static str {
        if let Some(&tag) = self.closed.get(word) {
            return tag;
        }
        if ADVERBS.contains(&word) {
            return "RB";
        }
        if ADJECTIVES.contains(&word) {
            return "JJ";
        }
        if known_verb(word) {
            return "VBP";
        }
        suffix_tag(word)
    }
}

impl Default for RuleBasedTagger {
    fn default() -> Self {
        Self::new()
    }
}

fn suffix_tag(word: &str) -> &'static str {
    let len = word.len();
    if len <= 2 {
        return "NN";
    }
    if word.ends_with("ly") {
        return "RB";
    }
    if word.ends_with("ing") && len > 4 {
        return "VBG";
    }
    if word.ends_with("ed") && len > 3 {
        return "VBD";
    }
    for suffix in ["ness", "ment", "tion", "sion", "ity", "ism", "ship", "hood"] {
        if word.ends_with(suffix) {
            return "NN";
        }
    }
    for suffix in ["ous", "ful", "ive", "able", "ible", "al", "ic", "less", "ish"] {
        if word.ends_with(suffix) {
            return "JJ";
        }
    }
    if word.ends_with("est") && len > 4 {
        return "JJS";
    }
    if word.ends_with('s') && !word.ends_with("ss") {
        let stem = &word[..len - 1];
        if known_verb(stem) {
            return "VBZ";
        }
        return "NNS";
    }
    "NN"
}

impl PosTagger for RuleBasedTagger {
    fn tag<'a>(&'a self, tokens: &[&str]) -> Vec<&'a str> {
        self.tags(tokens)
    }
}

impl RuleBasedTagger {
    pub fn tags(&self, tokens: &[&str]) -> Vec<&'static str> {
        let mut tags: Vec<&'static str> = Vec::with_capacity(tokens.len());

        for (i, token) in tokens.iter().enumerate() {
            let lexical = self.lexical_tag(token);
            let prev = if i > 0 { Some(tags[i - 1]) } else { None };
            let open_class = !self.closed.contains_key(*token);

            let tag = match prev {
                // "to go", "can go": base form after infinitive marker or modal
                Some("TO") | Some("MD") if open_class && matches!(lexical, "VBP" | "NN") => {
                    if known_verb(token) || lexical == "VBP" {
                        "VB"
                    } else {
                        lexical
                    }
                }
                // "i love", "they plan": present tense after a pronoun subject
                Some("PRP") if open_class && known_verb(token) => "VBP",
                // "the love", "my plan": noun after a determiner or possessive
                Some("DT") | Some("PRP$") | Some("JJ") if lexical == "VBP" => "NN",
                None if lexical == "VBP" => "VB",
                _ => lexical,
            };
            tags.push(tag);
        }
        tags
    }
}
