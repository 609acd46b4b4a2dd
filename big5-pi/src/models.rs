//! Startup model loading
//!
//! Everything here runs once, before the listener is bound. Embedding model
//! and regressor failures abort startup; missing topic artifacts, sentiment
//! lexicon or tagger degrade to the documented defaults with a warning.

use crate::error::FatalConfigError;
use crate::fusion::extractors::{
    AveragedPerceptronTagger, CountVectorizer, FeatureExtractors, LdaModel, PosProfiler,
    RuleBasedTagger, SemanticEmbedder, SentimentLexicon, SentimentScorer, TopicEstimator,
    TransformerEmbedder,
};
use crate::regressor::{load_regressor, TraitRegressor};
use crate::workflow::{CommentPipeline, ProfilePredictor};
use big5_common::config::{ModelsConfig, PipelineConfig};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Load an optional artifact, logging instead of failing
fn optional_artifact<T>(
    path: Option<&Path>,
    what: &str,
    load: impl FnOnce(&Path) -> Result<T, FatalConfigError>,
) -> Option<T> {
    let Some(path) = path else {
        warn!("No {} configured", what);
        return None;
    };
    match load(path) {
        Ok(artifact) => Some(artifact),
        Err(e) => {
            warn!(error = %e, "Failed to load {}", what);
            None
        }
    }
}

/// Topic estimator from the optional vocabulary and topic-model artifacts
pub fn load_topic_estimator(models: &ModelsConfig) -> TopicEstimator {
    let vectorizer = optional_artifact(
        models.topic_vocabulary.as_deref(),
        "topic vocabulary",
        CountVectorizer::load,
    );
    let model = optional_artifact(models.topic_model.as_deref(), "topic model", LdaModel::load);
    let estimator = TopicEstimator::new(vectorizer, model);
    if !estimator.is_available() {
        warn!("Topic estimator running in zero-vector mode");
    }
    estimator
}

/// Sentiment scorer from the configured lexicon, or the built-in subset
pub fn load_sentiment_scorer(models: &ModelsConfig) -> SentimentScorer {
    let lexicon = optional_artifact(
        models.sentiment_lexicon.as_deref(),
        "sentiment lexicon",
        SentimentLexicon::load,
    )
    .unwrap_or_else(|| {
        warn!(
            words = SentimentLexicon::builtin().len(),
            "Sentiment scores use the built-in lexicon subset"
        );
        SentimentLexicon::builtin()
    });
    SentimentScorer::new(lexicon)
}

/// POS profiler over the trained perceptron, or the rule-based tagger
pub fn load_pos_profiler(models: &ModelsConfig) -> PosProfiler {
    match optional_artifact(
        models.pos_tagger.as_deref(),
        "part-of-speech tagger",
        AveragedPerceptronTagger::load,
    ) {
        Some(tagger) => PosProfiler::new(Arc::new(tagger)),
        None => {
            warn!("POS ratios use the rule-based tagger");
            PosProfiler::new(Arc::new(RuleBasedTagger::new()))
        }
    }
}

/// Assemble the predictor around an already-loaded embedder and regressor
pub fn build_predictor(
    models: &ModelsConfig,
    pipeline: &PipelineConfig,
    embedder: Arc<dyn SemanticEmbedder>,
    regressor: Arc<dyn TraitRegressor>,
) -> ProfilePredictor {
    let extractors = FeatureExtractors::new(
        embedder,
        load_sentiment_scorer(models),
        load_topic_estimator(models),
        load_pos_profiler(models),
    );
    ProfilePredictor::new(CommentPipeline::new(extractors, regressor), pipeline.parallel)
}

/// Load every model artifact (blocking)
pub fn load_predictor(
    models: &ModelsConfig,
    pipeline: &PipelineConfig,
) -> Result<ProfilePredictor, FatalConfigError> {
    let started = Instant::now();

    let regressor = load_regressor(&models.regressor, models.regressor_encoding)?;
    let embedder = TransformerEmbedder::load(
        &models.embedding_dir,
        models.max_sequence_length,
        models.normalize_embeddings,
    )?;

    let predictor = build_predictor(models, pipeline, Arc::new(embedder), Arc::new(regressor));
    info!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        parallel = pipeline.parallel,
        "All models loaded"
    );
    Ok(predictor)
}
