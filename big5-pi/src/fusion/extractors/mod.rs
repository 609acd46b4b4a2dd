// Tier 1 Extractors - Independent Per-Comment Feature Sources
//
// 4 extractors: sentence embedding, sentiment, topic distribution, POS ratios.
// Each is pure given normalized text and holds no cross-comment state.

use crate::error::PredictionError;
use crate::fusion::{POS_DIM, SENTIMENT_DIM, TOPIC_DIM};
use std::sync::Arc;

pub mod embedding;
pub mod lexicon;
pub mod mpnet;
pub mod perceptron;
pub mod pos;
pub mod sentiment;
pub mod tagger;
pub mod topics;

pub use embedding::{EncoderArchitecture, SemanticEmbedder, TransformerEmbedder};
pub use lexicon::SentimentLexicon;
pub use perceptron::AveragedPerceptronTagger;
pub use pos::PosProfiler;
pub use sentiment::SentimentScorer;
pub use tagger::{PosTagger, RuleBasedTagger};
pub use topics::{CountVectorizer, LdaModel, TopicEstimator};

/// Raw outputs of the four extractors for one comment
#[derive(Debug, Clone)]
pub struct ExtractedFeatures {
    pub embedding: Vec<f32>,
    pub sentiment: [f32; SENTIMENT_DIM],
    pub topics: [f32; TOPIC_DIM],
    pub pos: [f32; POS_DIM],
}

/// The four extractors, loaded once and shared by every request
#[derive(Clone)]
pub struct FeatureExtractors {
    embedder: Arc<dyn SemanticEmbedder>,
    sentiment: SentimentScorer,
    topics: TopicEstimator,
    pos: PosProfiler,
}

impl FeatureExtractors {
    pub fn new(
        embedder: Arc<dyn SemanticEmbedder>,
        sentiment: SentimentScorer,
        topics: TopicEstimator,
        pos: PosProfiler,
    ) -> Self {
        Self {
            embedder,
            sentiment,
            topics,
            pos,
        }
    }

    /// Built-in sentiment lexicon, no topic artifacts, rule-based tagger
    pub fn with_embedder(embedder: Arc<dyn SemanticEmbedder>) -> Self {
        Self::new(
            embedder,
            SentimentScorer::default(),
            TopicEstimator::disabled(),
            PosProfiler::default(),
        )
    }

    pub fn embedder_id(&self) -> &str {
        self.embedder.model_id()
    }

    pub fn topics_available(&self) -> bool {
        self.topics.is_available()
    }

    /// Run every extractor on normalized text
    ///
    /// Only the embedder can fail; topic failures are already absorbed.
    pub fn extract(&self, normalized: &str) -> Result<ExtractedFeatures, PredictionError> {
        let embedding = self
            .embedder
            .embed(normalized)
            .map_err(|e| PredictionError::Embedding(e.to_string()))?;

        Ok(ExtractedFeatures {
            embedding,
            sentiment: self.sentiment.score(normalized),
            topics: self.topics.estimate(normalized),
            pos: self.pos.profile(normalized),
        })
    }
}

impl std::fmt::Debug for FeatureExtractors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureExtractors")
            .field("embedder", &self.embedder.model_id())
            .field("topics_available", &self.topics.is_available())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fusion::EMBEDDING_DIM;

    struct ConstantEmbedder;

    impl SemanticEmbedder for ConstantEmbedder {
        fn model_id(&self) -> &str {
            "constant"
        }

        fn embed(&self, _text: &str) -> anyhow::Result<Vec<f32>> {
            Ok(vec![0.1; EMBEDDING_DIM])
        }
    }

    struct BrokenEmbedder;

    impl SemanticEmbedder for BrokenEmbedder {
        fn model_id(&self) -> &str {
            "broken"
        }

        fn embed(&self, _text: &str) -> anyhow::Result<Vec<f32>> {
            anyhow::bail!("model not resident")
        }
    }

    #[test]
    fn test_extract_empty_text() {
        let extractors = FeatureExtractors::with_embedder(Arc::new(ConstantEmbedder));
        let features = extractors.extract("").unwrap();
        assert_eq!(features.embedding.len(), EMBEDDING_DIM);
        assert_eq!(features.sentiment, [0.0; SENTIMENT_DIM]);
        assert_eq!(features.topics, [0.0; TOPIC_DIM]);
        assert_eq!(features.pos, [0.0; POS_DIM]);
    }

    #[test]
    fn test_embedding_failure_is_prediction_error() {
        let extractors = FeatureExtractors::with_embedder(Arc::new(BrokenEmbedder));
        assert!(matches!(
            extractors.extract("good"),
            Err(PredictionError::Embedding(_))
        ));
    }
}
