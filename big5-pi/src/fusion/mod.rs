// Fusion Module - Extractors → Fuser
//
// Architecture: Tier 1 (Extractors) → Tier 2 (Fuser) → regressor input
// Four independent extractors feed one fixed-order feature vector.

pub mod extractors;
pub mod fuser;

pub use fuser::fuse;

/// Sentence embedding width
pub const EMBEDDING_DIM: usize = 768;
/// Sentiment scores: compound, positive, negative, neutral
pub const SENTIMENT_DIM: usize = 4;
/// Topic distribution width
pub const TOPIC_DIM: usize = 5;
/// Part-of-speech ratios: adjective, adverb, noun, verb
pub const POS_DIM: usize = 4;
/// Total fused feature vector width
pub const FEATURE_DIM: usize = EMBEDDING_DIM + SENTIMENT_DIM + TOPIC_DIM + POS_DIM;

/// Feature vector segment, in fused order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Embedding,
    Sentiment,
    Topics,
    PartOfSpeech,
}

impl Segment {
    pub const ALL: [Segment; 4] = [
        Segment::Embedding,
        Segment::Sentiment,
        Segment::Topics,
        Segment::PartOfSpeech,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Segment::Embedding => "embedding",
            Segment::Sentiment => "sentiment",
            Segment::Topics => "topic distribution",
            Segment::PartOfSpeech => "POS ratios",
        }
    }

    pub fn len(self) -> usize {
        match self {
            Segment::Embedding => EMBEDDING_DIM,
            Segment::Sentiment => SENTIMENT_DIM,
            Segment::Topics => TOPIC_DIM,
            Segment::PartOfSpeech => POS_DIM,
        }
    }

    /// Offset of this segment inside the fused vector
    pub fn offset(self) -> usize {
        Segment::ALL
            .iter()
            .take_while(|s| **s != self)
            .map(|s| s.len())
            .sum()
    }

    pub fn range(self) -> std::ops::Range<usize> {
        let start = self.offset();
        start..start + self.len()
    }
}

/// Fused regressor input (always [`FEATURE_DIM`] values)
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: Vec<f32>,
}

impl FeatureVector {
    /// Only the fuser builds feature vectors, so the width invariant holds
    pub(crate) fn from_fused(values: Vec<f32>) -> Self {
        debug_assert_eq!(values.len(), FEATURE_DIM);
        Self { values }
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn segment(&self, segment: Segment) -> &[f32] {
        &self.values[segment.range()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_width() {
        assert_eq!(FEATURE_DIM, 781);
    }

    #[test]
    fn test_segment_ranges_are_contiguous() {
        assert_eq!(Segment::Embedding.range(), 0..768);
        assert_eq!(Segment::Sentiment.range(), 768..772);
        assert_eq!(Segment::Topics.range(), 772..777);
        assert_eq!(Segment::PartOfSpeech.range(), 777..781);
    }
}
