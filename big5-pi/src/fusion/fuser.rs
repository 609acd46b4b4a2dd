// Tier 2 Fuser - Fixed-Order Concatenation
//
// embedding → sentiment → topics → POS. The order matches the regressor's
// training schema; a wrong segment width is a configuration error, never
// padded or truncated.

use super::{FeatureVector, Segment, FEATURE_DIM};
use crate::error::FatalConfigError;

/// Concatenate the four extractor outputs into one feature vector
pub fn fuse(
    embedding: &[f32],
    sentiment: &[f32],
    topics: &[f32],
    pos: &[f32],
) -> Result<FeatureVector, FatalConfigError> {
    let parts = [
        (Segment::Embedding, embedding),
        (Segment::Sentiment, sentiment),
        (Segment::Topics, topics),
        (Segment::PartOfSpeech, pos),
    ];

    let mut values = Vec::with_capacity(FEATURE_DIM);
    for (segment, part) in parts {
        if part.len() != segment.len() {
            return Err(FatalConfigError::SegmentLength {
                segment: segment.name(),
                expected: segment.len(),
                actual: part.len(),
            });
        }
        values.extend_from_slice(part);
    }

    Ok(FeatureVector::from_fused(values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fusion::{EMBEDDING_DIM, POS_DIM, SENTIMENT_DIM, TOPIC_DIM};

    fn segments() -> (Vec<f32>, Vec<f32>, Vec<f32>, Vec<f32>) {
        (
            vec![0.5; EMBEDDING_DIM],
            vec![0.1, 0.2, 0.3, 0.4],
            vec![0.2; TOPIC_DIM],
            vec![0.25; POS_DIM],
        )
    }

    #[test]
    fn test_fuse_well_formed() {
        let (e, s, t, p) = segments();
        let fv = fuse(&e, &s, &t, &p).unwrap();
        assert_eq!(fv.len(), 781);
        assert_eq!(fv.segment(Segment::Sentiment), &[0.1, 0.2, 0.3, 0.4]);
        assert_eq!(fv.as_slice()[EMBEDDING_DIM + SENTIMENT_DIM], 0.2);
        assert_eq!(fv.as_slice()[780], 0.25);
    }

    #[test]
    fn test_fuse_rejects_short_embedding() {
        let (_, s, t, p) = segments();
        let err = fuse(&vec![0.0; 384], &s, &t, &p).unwrap_err();
        match err {
            FatalConfigError::SegmentLength {
                segment,
                expected,
                actual,
            } => {
                assert_eq!(segment, "embedding");
                assert_eq!(expected, 768);
                assert_eq!(actual, 384);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_fuse_rejects_each_bad_segment() {
        let (e, s, t, p) = segments();
        assert!(fuse(&e, &s[..3], &t, &p).is_err());
        assert!(fuse(&e, &s, &[0.2; 6], &p).is_err());
        assert!(fuse(&e, &s, &t, &[]).is_err());
    }
}
