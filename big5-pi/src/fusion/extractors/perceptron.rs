//! Averaged perceptron part-of-speech tagger
//!
//! Greedy left-to-right decoding of the averaged perceptron trained on the
//! Penn Treebank. The trained model ships as three JSON files sharing the
//! [`ARTIFACT_STEM`] prefix:
//!
//! - `<stem>.weights.json`: feature string → tag → weight
//! - `<stem>.tagdict.json`: unambiguous word → tag, consulted before scoring
//! - `<stem>.classes.json`: the tag set
//!
//! A single JSON object with `weights`, `tagdict` and `classes` keys also
//! loads. Decoding reproduces the reference tagger exactly, including its
//! word normalization, feature templates and tie-break (highest score, then
//! lexicographically largest tag).

use super::tagger::PosTagger;
use super::topics::read_json;
use crate::error::FatalConfigError;
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use tracing::info;

/// File-name prefix of the three-file artifact
pub const ARTIFACT_STEM: &str = "averaged_perceptron_tagger_eng";

const START: [&str; 2] = ["-START-", "-START2-"];
const END: [&str; 2] = ["-END-", "-END2-"];

#[derive(Debug, Deserialize)]
struct TaggerArtifact {
    weights: HashMap<String, HashMap<String, f64>>,
    tagdict: HashMap<String, String>,
    classes: Vec<String>,
}

/// Trained averaged perceptron
pub struct AveragedPerceptronTagger {
    /// Sorted ascending so ties resolve to the last candidate
    classes: Vec<String>,
    weights: HashMap<String, Vec<(usize, f64)>>,
    tagdict: HashMap<String, usize>,
}

impl AveragedPerceptronTagger {
    /// Load from the artifact directory or a single combined JSON file
    pub fn load(path: &Path) -> Result<Self, FatalConfigError> {
        let artifact = if path.is_dir() {
            let file = |kind: &str| path.join(format!("{}.{}.json", ARTIFACT_STEM, kind));
            TaggerArtifact {
                weights: read_json(&file("weights"))?,
                tagdict: read_json(&file("tagdict"))?,
                classes: read_json(&file("classes"))?,
            }
        } else {
            read_json(path)?
        };
        let tagger = Self::from_artifact(artifact).map_err(|msg| FatalConfigError::invalid(path, msg))?;
        info!(
            path = %path.display(),
            classes = tagger.classes.len(),
            features = tagger.weights.len(),
            tagdict = tagger.tagdict.len(),
            "Loaded part-of-speech tagger"
        );
        Ok(tagger)
    }

    fn from_artifact(artifact: TaggerArtifact) -> Result<Self, String> {
        let classes: Vec<String> = artifact
            .classes
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if classes.is_empty() {
            return Err("tagger has no classes".to_string());
        }
        let index: HashMap<&str, usize> = classes
            .iter()
            .enumerate()
            .map(|(i, c)| (c.as_str(), i))
            .collect();

        let mut tagdict = HashMap::with_capacity(artifact.tagdict.len());
        for (word, tag) in artifact.tagdict {
            let Some(&idx) = index.get(tag.as_str()) else {
                return Err(format!("tagdict maps '{}' to unknown tag '{}'", word, tag));
            };
            tagdict.insert(word, idx);
        }

        // Labels outside the class list can never win, so they are dropped
        let weights = artifact
            .weights
            .into_iter()
            .filter_map(|(feature, per_label)| {
                let row: Vec<(usize, f64)> = per_label
                    .iter()
                    .filter(|(_, w)| **w != 0.0)
                    .filter_map(|(label, w)| index.get(label.as_str()).map(|&i| (i, *w)))
                    .collect();
                (!row.is_empty()).then_some((feature, row))
            })
            .collect();

        Ok(Self {
            classes,
            weights,
            tagdict,
        })
    }

    fn predict(&self, features: &[String]) -> usize {
        let mut scores = vec![0.0f64; self.classes.len()];
        for feature in features {
            if let Some(row) = self.weights.get(feature) {
                for &(label, weight) in row {
                    scores[label] += weight;
                }
            }
        }
        let mut best = 0;
        for (idx, score) in scores.iter().enumerate().skip(1) {
            if *score >= scores[best] {
                best = idx;
            }
        }
        best
    }
}

/// Word shape used for context features
fn normalize_word(word: &str) -> String {
    let mut chars = word.chars();
    let first = chars.next();
    if word.contains('-') && first != Some('-') {
        "!HYPHEN".to_string()
    } else if word.chars().count() == 4 && word.chars().all(|c| c.is_numeric()) {
        "!YEAR".to_string()
    } else if first.map(|c| c.is_numeric()).unwrap_or(false) {
        "!DIGITS".to_string()
    } else {
        word.to_lowercase()
    }
}

/// Last three characters
fn suffix(word: &str) -> &str {
    match word.char_indices().rev().nth(2) {
        Some((at, _)) => &word[at..],
        None => word,
    }
}

fn prefix1(word: &str) -> &str {
    match word.chars().next() {
        Some(c) => &word[..c.len_utf8()],
        None => "",
    }
}

/// Feature strings for the token at `i` (0-based, before context padding)
fn features(i: usize, word: &str, context: &[String], prev: &str, prev2: &str) -> Vec<String> {
    let i = i + START.len();
    vec![
        "bias".to_string(),
        format!("i suffix {}", suffix(word)),
        format!("i pref1 {}", prefix1(word)),
        format!("i-1 tag {}", prev),
        format!("i-2 tag {}", prev2),
        format!("i tag+i-2 tag {} {}", prev, prev2),
        format!("i word {}", context[i]),
        format!("i-1 tag+i word {} {}", prev, context[i]),
        format!("i-1 word {}", context[i - 1]),
        format!("i-1 suffix {}", suffix(&context[i - 1])),
        format!("i-2 word {}", context[i - 2]),
        format!("i+1 word {}", context[i + 1]),
        format!("i+1 suffix {}", suffix(&context[i + 1])),
        format!("i+2 word {}", context[i + 2]),
    ]
}

impl PosTagger for AveragedPerceptronTagger {
    fn tag<'a>(&'a self, tokens: &[&str]) -> Vec<&'a str> {
        let context: Vec<String> = START
            .iter()
            .map(|s| s.to_string())
            .chain(tokens.iter().map(|t| normalize_word(t)))
            .chain(END.iter().map(|s| s.to_string()))
            .collect();

        let mut tags: Vec<&'a str> = Vec::with_capacity(tokens.len());
        let (mut prev, mut prev2): (&'a str, &'a str) = (START[0], START[1]);
        for (i, word) in tokens.iter().enumerate() {
            let idx = match self.tagdict.get(*word) {
                Some(&idx) => idx,
                None => self.predict(&features(i, word, &context, prev, prev2)),
            };
            let tag = self.classes[idx].as_str();
            tags.push(tag);
            prev2 = prev;
            prev = tag;
        }
        tags
    }
}

impl std::fmt::Debug for AveragedPerceptronTagger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AveragedPerceptronTagger")
            .field("classes", &self.classes.len())
            .field("features", &self.weights.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn artifact() -> (Value, Value, Value) {
        let weights = json!({
            "bias": {"NN": 0.5},
            "i suffix ood": {"JJ": 2.0},
            "i-1 tag JJ": {"NN": 3.0},
            "i word run": {"VB": 3.0},
            "i word the": {"NN": 10.0},
            "i word !HYPHEN": {"JJ": 1.0},
            "i-1 word !YEAR": {"VB": 9.0}
        });
        let tagdict = json!({"the": "DT", "very": "RB"});
        let classes = json!(["DT", "JJ", "NN", "RB", "VB"]);
        (weights, tagdict, classes)
    }

    fn tagger() -> AveragedPerceptronTagger {
        let (weights, tagdict, classes) = artifact();
        let artifact = serde_json::from_value(json!({
            "weights": weights,
            "tagdict": tagdict,
            "classes": classes
        }))
        .unwrap();
        AveragedPerceptronTagger::from_artifact(artifact).unwrap()
    }

    fn tag(tagger: &AveragedPerceptronTagger, text: &str) -> Vec<String> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        tagger.tag(&tokens).into_iter().map(str::to_string).collect()
    }

    #[test]
    fn test_greedy_decoding_uses_previous_tag() {
        // good: JJ 2.0 beats NN 0.5; food: NN 0.5 + 3.0 after JJ beats JJ 2.0
        assert_eq!(tag(&tagger(), "the very good food"), vec!["DT", "RB", "JJ", "NN"]);
    }

    #[test]
    fn test_tagdict_wins_over_weights() {
        // "i word the" favors NN, but the tagdict entry is never scored
        assert_eq!(tag(&tagger(), "the run"), vec!["DT", "VB"]);
    }

    #[test]
    fn test_ties_resolve_to_largest_tag() {
        let artifact = serde_json::from_value(json!({
            "weights": {"bias": {"NN": 1.0, "VB": 1.0}},
            "tagdict": {},
            "classes": ["NN", "VB", "DT"]
        }))
        .unwrap();
        let tagger = AveragedPerceptronTagger::from_artifact(artifact).unwrap();
        assert_eq!(tag(&tagger, "x"), vec!["VB"]);

        // no evidence at all: every class scores zero
        let artifact = serde_json::from_value(json!({
            "weights": {}, "tagdict": {}, "classes": ["NN", "JJ"]
        }))
        .unwrap();
        let tagger = AveragedPerceptronTagger::from_artifact(artifact).unwrap();
        assert_eq!(tag(&tagger, "x y"), vec!["NN", "NN"]);
    }

    #[test]
    fn test_context_uses_word_shapes() {
        assert_eq!(tag(&tagger(), "well-known"), vec!["JJ"]);
        // "plan" sees the previous word as !YEAR
        assert_eq!(tag(&tagger(), "1999 plan"), vec!["NN", "VB"]);
        assert_eq!(tag(&tagger(), "1999s plan"), vec!["NN", "NN"]);
    }

    #[test]
    fn test_normalize_word() {
        assert_eq!(normalize_word("well-known"), "!HYPHEN");
        assert_eq!(normalize_word("-lrb-"), "-lrb-");
        assert_eq!(normalize_word("1999"), "!YEAR");
        assert_eq!(normalize_word("12345"), "!DIGITS");
        assert_eq!(normalize_word("3rd"), "!DIGITS");
        assert_eq!(normalize_word("Hello"), "hello");
    }

    #[test]
    fn test_feature_templates() {
        let context: Vec<String> = ["-START-", "-START2-", "the", "dog", "-END-", "-END2-"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let feats = features(0, "The", &context, "-START-", "-START2-");
        assert_eq!(
            feats,
            vec![
                "bias",
                "i suffix The",
                "i pref1 T",
                "i-1 tag -START-",
                "i-2 tag -START2-",
                "i tag+i-2 tag -START- -START2-",
                "i word the",
                "i-1 tag+i word -START- the",
                "i-1 word -START2-",
                "i-1 suffix T2-",
                "i-2 word -START-",
                "i+1 word dog",
                "i+1 suffix dog",
                "i+2 word -END-",
            ]
        );
    }

    #[test]
    fn test_suffix_and_prefix_are_char_based() {
        assert_eq!(suffix("café"), "afé");
        assert_eq!(suffix("go"), "go");
        assert_eq!(prefix1("élan"), "é");
        assert_eq!(prefix1(""), "");
    }

    #[test]
    fn test_load_three_file_directory() {
        let dir = tempfile::tempdir().unwrap();
        let (weights, tagdict, classes) = artifact();
        for (kind, value) in [("weights", weights), ("tagdict", tagdict), ("classes", classes)] {
            let path = dir.path().join(format!("{}.{}.json", ARTIFACT_STEM, kind));
            std::fs::write(path, value.to_string()).unwrap();
        }
        let tagger = AveragedPerceptronTagger::load(dir.path()).unwrap();
        assert_eq!(tag(&tagger, "the very good food"), vec!["DT", "RB", "JJ", "NN"]);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = AveragedPerceptronTagger::load(dir.path());
        assert!(matches!(result, Err(FatalConfigError::MissingArtifact(_))));
    }

    #[test]
    fn test_rejects_unknown_tagdict_tag() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tagger.json");
        let body = json!({"weights": {}, "tagdict": {"the": "DT"}, "classes": ["NN"]});
        std::fs::write(&path, body.to_string()).unwrap();
        assert!(matches!(
            AveragedPerceptronTagger::load(&path),
            Err(FatalConfigError::InvalidArtifact { .. })
        ));
    }

    /// Needs the trained artifact: `BIG5_POS_TAGGER=<dir> cargo test -- --ignored`
    #[test]
    #[ignore]
    fn test_trained_model_reference_tags() {
        let dir = std::env::var("BIG5_POS_TAGGER").expect("BIG5_POS_TAGGER not set");
        let tagger = AveragedPerceptronTagger::load(Path::new(&dir)).unwrap();
        assert_eq!(
            tag(&tagger, "they refuse to permit us to obtain the refuse permit"),
            vec!["PRP", "VBP", "TO", "VB", "PRP", "TO", "VB", "DT", "NN", "NN"]
        );
        assert_eq!(
            tag(&tagger, "and now for something completely different"),
            vec!["CC", "RB", "IN", "NN", "RB", "JJ"]
        );
    }
}
