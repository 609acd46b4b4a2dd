//! Test Helper Utilities
//!
//! Stub embedder and regressors so pipeline and HTTP tests run without model
//! weights. The stub embedder writes the normalized text length into slot 0,
//! and the table regressor looks that length up.

#![allow(dead_code)]

use big5_pi::fusion::extractors::{FeatureExtractors, SemanticEmbedder};
use big5_pi::fusion::{FeatureVector, EMBEDDING_DIM};
use big5_pi::regressor::TraitRegressor;
use big5_pi::workflow::{CommentPipeline, ProfilePredictor};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// "good and positive" (17 chars once normalized)
pub const HIGH_COMMENT: &str = "Good and positive!";
pub const HIGH_VECTOR: [f64; 5] = [8.0, 7.0, 6.0, 9.0, 2.0];

/// "bad and negative" (16 chars once normalized)
pub const LOW_COMMENT: &str = "Bad and NEGATIVE...";
pub const LOW_VECTOR: [f64; 5] = [2.0, 3.0, 4.0, 1.0, 8.0];

/// Unlisted lengths score this
pub const DEFAULT_VECTOR: [f64; 5] = [5.0; 5];

pub struct LengthEmbedder;

impl SemanticEmbedder for LengthEmbedder {
    fn model_id(&self) -> &str {
        "length-stub"
    }

    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let mut v = vec![0.0; EMBEDDING_DIM];
        v[0] = text.len() as f32;
        Ok(v)
    }
}

/// Trait vector keyed on the normalized comment length
pub struct TableRegressor {
    table: HashMap<usize, [f64; 5]>,
}

impl TableRegressor {
    pub fn new() -> Self {
        Self {
            table: HashMap::from([(17, HIGH_VECTOR), (16, LOW_VECTOR)]),
        }
    }

    pub fn with_entry(mut self, len: usize, vector: [f64; 5]) -> Self {
        self.table.insert(len, vector);
        self
    }
}

impl TraitRegressor for TableRegressor {
    fn encoding(&self) -> &'static str {
        "table_stub"
    }

    fn predict(&self, features: &FeatureVector) -> anyhow::Result<[f64; 5]> {
        let len = features.as_slice()[0] as usize;
        Ok(self.table.get(&len).copied().unwrap_or(DEFAULT_VECTOR))
    }
}

pub struct FailingRegressor;

impl TraitRegressor for FailingRegressor {
    fn encoding(&self) -> &'static str {
        "failing_stub"
    }

    fn predict(&self, _features: &FeatureVector) -> anyhow::Result<[f64; 5]> {
        anyhow::bail!("regressor offline")
    }
}

/// Fails while `offline` is set, otherwise scores [`DEFAULT_VECTOR`]
#[derive(Default)]
pub struct FlakyRegressor {
    pub offline: AtomicBool,
}

impl FlakyRegressor {
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }
}

impl TraitRegressor for FlakyRegressor {
    fn encoding(&self) -> &'static str {
        "flaky_stub"
    }

    fn predict(&self, _features: &FeatureVector) -> anyhow::Result<[f64; 5]> {
        if self.offline.load(Ordering::SeqCst) {
            anyhow::bail!("regressor offline")
        }
        Ok(DEFAULT_VECTOR)
    }
}

pub fn predictor_with(
    extractors: FeatureExtractors,
    regressor: Arc<dyn TraitRegressor>,
    parallel: bool,
) -> ProfilePredictor {
    ProfilePredictor::new(CommentPipeline::new(extractors, regressor), parallel)
}

pub fn stub_predictor(regressor: Arc<dyn TraitRegressor>, parallel: bool) -> ProfilePredictor {
    predictor_with(
        FeatureExtractors::with_embedder(Arc::new(LengthEmbedder)),
        regressor,
        parallel,
    )
}

pub fn table_predictor(parallel: bool) -> ProfilePredictor {
    stub_predictor(Arc::new(TableRegressor::new()), parallel)
}
