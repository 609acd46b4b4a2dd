//! Valence lexicon for the sentiment scorer
//!
//! Loads VADER's `vader_lexicon.txt` (tab-separated: token, mean valence,
//! standard deviation, raw ratings), which ships next to the regressor in the
//! model directory. The compiled-in subset covers only the most frequent
//! sentiment-bearing words and is a degraded fallback for when that file is
//! missing; scores computed with it diverge from the full lexicon.

use crate::error::FatalConfigError;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// Compiled-in lexicon subset (token, mean valence on the -4..4 scale)
const BUILTIN_LEXICON: &[(&str, f64)] = &[
    ("afraid", -2.0),
    ("agree", 1.5),
    ("alone", -1.0),
    ("amazing", 2.8),
    ("angry", -2.3),
    ("annoyed", -1.6),
    ("annoying", -1.7),
    ("anxious", -1.0),
    ("appreciate", 1.7),
    ("awesome", 3.1),
    ("awful", -2.0),
    ("bad", -2.5),
    ("beautiful", 2.9),
    ("best", 3.2),
    ("better", 1.9),
    ("bored", -1.1),
    ("boring", -1.3),
    ("brave", 2.4),
    ("calm", 1.3),
    ("care", 2.2),
    ("careful", 0.6),
    ("cheerful", 2.5),
    ("confident", 2.2),
    ("confused", -1.3),
    ("crazy", -1.4),
    ("creative", 1.9),
    ("cry", -2.1),
    ("crying", -2.1),
    ("curious", 1.3),
    ("depressed", -2.3),
    ("difficult", -1.5),
    ("disagree", -1.6),
    ("disappointed", -1.9),
    ("easy", 1.9),
    ("energetic", 1.6),
    ("enjoy", 2.2),
    ("enjoyed", 2.3),
    ("excellent", 2.7),
    ("excited", 2.2),
    ("exciting", 2.2),
    ("fail", -2.5),
    ("failed", -2.3),
    ("fear", -2.2),
    ("fine", 0.8),
    ("free", 2.3),
    ("friendly", 2.2),
    ("fun", 2.3),
    ("glad", 2.0),
    ("good", 1.9),
    ("great", 3.1),
    ("guilty", -1.8),
    ("happy", 2.7),
    ("hard", -0.4),
    ("hate", -2.7),
    ("help", 1.7),
    ("helpful", 1.8),
    ("honest", 2.3),
    ("hope", 1.9),
    ("horrible", -2.5),
    ("hurt", -2.4),
    ("interesting", 1.7),
    ("kind", 2.4),
    ("laugh", 2.6),
    ("like", 2.0),
    ("lonely", -1.8),
    ("lose", -1.6),
    ("lost", -1.3),
    ("love", 3.2),
    ("loved", 2.9),
    ("lovely", 2.8),
    ("mad", -2.2),
    ("messy", -1.5),
    ("miss", -0.6),
    ("negative", -2.7),
    ("nervous", -1.1),
    ("nice", 1.8),
    ("no", -1.2),
    ("ok", 1.2),
    ("okay", 0.9),
    ("pain", -2.3),
    ("panic", -2.3),
    ("perfect", 2.7),
    ("positive", 2.6),
    ("pretty", 2.2),
    ("problem", -1.7),
    ("problems", -1.7),
    ("proud", 2.1),
    ("relaxed", 2.2),
    ("rude", -2.0),
    ("sad", -2.1),
    ("scared", -1.9),
    ("shy", -1.0),
    ("smile", 1.5),
    ("stress", -1.8),
    ("stressed", -1.4),
    ("stupid", -2.4),
    ("success", 2.7),
    ("support", 1.7),
    ("terrible", -2.1),
    ("thank", 1.5),
    ("thanks", 1.9),
    ("tired", -1.9),
    ("trust", 2.3),
    ("upset", -1.6),
    ("warm", 0.9),
    ("weird", -0.7),
    ("win", 2.8),
    ("wonderful", 2.7),
    ("worried", -1.2),
    ("worry", -1.9),
    ("worse", -2.1),
    ("worst", -3.1),
    ("wrong", -2.1),
    ("yes", 1.7),
];

/// Token → mean valence lookup
#[derive(Debug, Clone)]
pub struct SentimentLexicon {
    valence: HashMap<String, f64>,
}

impl SentimentLexicon {
    /// Compiled-in subset
    pub fn builtin() -> Self {
        Self {
            valence: BUILTIN_LEXICON
                .iter()
                .map(|(token, v)| (token.to_string(), *v))
                .collect(),
        }
    }

    /// Load a VADER lexicon file
    pub fn load(path: &Path) -> Result<Self, FatalConfigError> {
        if !path.exists() {
            return Err(FatalConfigError::MissingArtifact(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        let lexicon =
            Self::parse(&content).map_err(|msg| FatalConfigError::invalid(path, msg))?;
        info!(
            path = %path.display(),
            entries = lexicon.len(),
            "Loaded sentiment lexicon"
        );
        Ok(lexicon)
    }

    /// Parse tab-separated `token<TAB>mean[<TAB>...]` lines
    pub fn parse(content: &str) -> Result<Self, String> {
        let mut valence = HashMap::new();
        for (line_no, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let mut fields = line.split('\t');
            let token = fields.next().unwrap_or_default();
            let mean = fields
                .next()
                .ok_or_else(|| format!("line {}: missing valence column", line_no + 1))?
                .trim()
                .parse::<f64>()
                .map_err(|e| format!("line {}: {}", line_no + 1, e))?;
            valence.insert(token.to_lowercase(), mean);
        }
        if valence.is_empty() {
            return Err("lexicon is empty".to_string());
        }
        debug!(entries = valence.len(), "Parsed sentiment lexicon");
        Ok(Self { valence })
    }

    pub fn get(&self, token: &str) -> Option<f64> {
        self.valence.get(token).copied()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.valence.contains_key(token)
    }

    pub fn len(&self) -> usize {
        self.valence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.valence.is_empty()
    }
}

impl Default for SentimentLexicon {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_lookup() {
        let lex = SentimentLexicon::builtin();
        assert_eq!(lex.get("good"), Some(1.9));
        assert_eq!(lex.get("hate"), Some(-2.7));
        assert_eq!(lex.get("table"), None);
    }

    #[test]
    fn test_parse_vader_format() {
        let lex = SentimentLexicon::parse(
            "good\t1.9\t0.9434\t[2, 1, 1, 3, 2, 4, 2, 2, 1, 1]\nmeh\t-0.3\t0.5\t[0, 0]\n",
        )
        .unwrap();
        assert_eq!(lex.len(), 2);
        assert_eq!(lex.get("meh"), Some(-0.3));
    }

    #[test]
    fn test_parse_rejects_bad_valence() {
        assert!(SentimentLexicon::parse("good\tvery\n").is_err());
        assert!(SentimentLexicon::parse("good\n").is_err());
        assert!(SentimentLexicon::parse("\n\n").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = SentimentLexicon::load(&dir.path().join("nope.txt"));
        assert!(matches!(result, Err(FatalConfigError::MissingArtifact(_))));
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vader_lexicon.txt");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "splendid\t2.8\t0.6\t[3, 3]").unwrap();
        let lex = SentimentLexicon::load(&path).unwrap();
        assert_eq!(lex.get("splendid"), Some(2.8));
    }
}
