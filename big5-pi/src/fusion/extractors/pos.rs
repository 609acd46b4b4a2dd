//! Part-of-speech ratio profiler
//!
//! Counts the exact Penn tags `JJ`, `RB`, `NN` and `VB` (in that order) over
//! the whitespace tokens of normalized text and divides by the token count.
//! Inflected tags (`NNS`, `VBD`, `JJS`, ...) are not counted.

use super::tagger::{PosTagger, RuleBasedTagger};
use crate::fusion::POS_DIM;
use std::sync::Arc;

/// Tags counted, in feature order
pub const COUNTED_TAGS: [&str; POS_DIM] = ["JJ", "RB", "NN", "VB"];

/// Adjective / adverb / noun / verb ratios
#[derive(Clone)]
pub struct PosProfiler {
    tagger: Arc<dyn PosTagger>,
}

impl PosProfiler {
    pub fn new(tagger: Arc<dyn PosTagger>) -> Self {
        Self { tagger }
    }

    pub fn profile(&self, text: &str) -> [f32; POS_DIM] {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let tags = self.tagger.tag(&tokens);

        let mut counts = [0usize; POS_DIM];
        for tag in &tags {
            if let Some(slot) = COUNTED_TAGS.iter().position(|t| t == tag) {
                counts[slot] += 1;
            }
        }

        // Zero tokens: denominator 1 keeps the all-zero vector
        let denominator = tokens.len().max(1) as f32;
        counts.map(|c| c as f32 / denominator)
    }
}

impl Default for PosProfiler {
    fn default() -> Self {
        Self::new(Arc::new(RuleBasedTagger::new()))
    }
}

impl std::fmt::Debug for PosProfiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PosProfiler").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedTagger(&'static str);

    impl PosTagger for FixedTagger {
        fn tag<'a>(&'a self, tokens: &[&str]) -> Vec<&'a str> {
            vec![self.0; tokens.len()]
        }
    }

    #[test]
    fn test_empty_text_is_all_zero() {
        let profiler = PosProfiler::default();
        assert_eq!(profiler.profile(""), [0.0; POS_DIM]);
    }

    #[test]
    fn test_ratios_use_token_count() {
        // the/DT good/JJ plan/NN quickly/RB faded/VBD
        let profiler = PosProfiler::default();
        let ratios = profiler.profile("the good plan quickly faded");
        assert_eq!(ratios, [0.2, 0.2, 0.2, 0.0]);
    }

    #[test]
    fn test_only_exact_tags_counted() {
        let profiler = PosProfiler::new(Arc::new(FixedTagger("NNS")));
        assert_eq!(profiler.profile("cats dogs"), [0.0; POS_DIM]);

        let profiler = PosProfiler::new(Arc::new(FixedTagger("VB")));
        assert_eq!(profiler.profile("go go go"), [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_ratios_in_unit_range() {
        let profiler = PosProfiler::default();
        let ratios = profiler.profile("i really love to explore new creative ideas every day");
        assert!(ratios.iter().all(|r| (0.0..=1.0).contains(r)));
        assert!(ratios.iter().sum::<f32>() <= 1.0 + 1e-6);
    }
}
