//! Single-comment pipeline

use crate::error::PredictionError;
use crate::fusion::extractors::FeatureExtractors;
use crate::fusion::{fuse, FeatureVector};
use crate::normalizer::normalize;
use crate::regressor::TraitRegressor;
use big5_common::traits::TRAIT_COUNT;
use std::sync::Arc;
use tracing::trace;

/// Normalizer, extractors, fuser and regressor for one comment
#[derive(Clone)]
pub struct CommentPipeline {
    extractors: FeatureExtractors,
    regressor: Arc<dyn TraitRegressor>,
}

impl CommentPipeline {
    pub fn new(extractors: FeatureExtractors, regressor: Arc<dyn TraitRegressor>) -> Self {
        Self {
            extractors,
            regressor,
        }
    }

    pub fn extractors(&self) -> &FeatureExtractors {
        &self.extractors
    }

    pub fn regressor_encoding(&self) -> &'static str {
        self.regressor.encoding()
    }

    /// Fused feature vector for a raw comment
    pub fn features(&self, raw: &str) -> Result<FeatureVector, PredictionError> {
        let normalized = normalize(raw);
        let extracted = self.extractors.extract(&normalized)?;
        let fused = fuse(
            &extracted.embedding,
            &extracted.sentiment,
            &extracted.topics,
            &extracted.pos,
        )?;
        trace!(chars = normalized.len(), "Fused comment features");
        Ok(fused)
    }

    /// Per-comment trait vector in [`big5_common::Trait::ALL`] order
    pub fn score_comment(&self, raw: &str) -> Result<[f64; TRAIT_COUNT], PredictionError> {
        let features = self.features(raw)?;
        let scores = self
            .regressor
            .predict(&features)
            .map_err(|e| PredictionError::Regressor(e.to_string()))?;
        if scores.iter().any(|s| !s.is_finite()) {
            return Err(PredictionError::Regressor(format!(
                "non-finite trait scores {:?}",
                scores
            )));
        }
        Ok(scores)
    }
}

impl std::fmt::Debug for CommentPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommentPipeline")
            .field("extractors", &self.extractors)
            .field("regressor", &self.regressor.encoding())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FatalConfigError;
    use crate::fusion::extractors::SemanticEmbedder;
    use crate::fusion::{Segment, EMBEDDING_DIM};

    struct WidthEmbedder(usize);

    impl SemanticEmbedder for WidthEmbedder {
        fn model_id(&self) -> &str {
            "width"
        }

        fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
            let mut v = vec![0.0; self.0];
            if let Some(first) = v.first_mut() {
                *first = text.len() as f32;
            }
            Ok(v)
        }
    }

    struct SumRegressor;

    impl TraitRegressor for SumRegressor {
        fn encoding(&self) -> &'static str {
            "sum"
        }

        fn predict(&self, features: &FeatureVector) -> anyhow::Result<[f64; TRAIT_COUNT]> {
            let first = features.as_slice()[0] as f64;
            Ok([first, first + 1.0, first + 2.0, first + 3.0, first + 4.0])
        }
    }

    struct NanRegressor;

    impl TraitRegressor for NanRegressor {
        fn encoding(&self) -> &'static str {
            "nan"
        }

        fn predict(&self, _features: &FeatureVector) -> anyhow::Result<[f64; TRAIT_COUNT]> {
            Ok([f64::NAN; TRAIT_COUNT])
        }
    }

    fn pipeline(width: usize, regressor: Arc<dyn TraitRegressor>) -> CommentPipeline {
        CommentPipeline::new(
            FeatureExtractors::with_embedder(Arc::new(WidthEmbedder(width))),
            regressor,
        )
    }

    #[test]
    fn test_comment_is_normalized_before_extraction() {
        let p = pipeline(EMBEDDING_DIM, Arc::new(SumRegressor));
        let features = p.features("  GOOD!!! http://x.y ").unwrap();
        // embedder saw "good"
        assert_eq!(features.as_slice()[0], 4.0);
        assert!(features.segment(Segment::Sentiment)[0] > 0.0);
    }

    #[test]
    fn test_score_comment() {
        let p = pipeline(EMBEDDING_DIM, Arc::new(SumRegressor));
        assert_eq!(p.score_comment("abc").unwrap(), [3.0, 4.0, 5.0, 6.0, 7.0]);
    }

    #[test]
    fn test_wrong_embedding_width_is_fatal() {
        let p = pipeline(384, Arc::new(SumRegressor));
        assert!(matches!(
            p.score_comment("good"),
            Err(PredictionError::Config(FatalConfigError::SegmentLength { .. }))
        ));
    }

    #[test]
    fn test_non_finite_scores_rejected() {
        let p = pipeline(EMBEDDING_DIM, Arc::new(NanRegressor));
        assert!(matches!(
            p.score_comment("good"),
            Err(PredictionError::Regressor(_))
        ));
    }
}
