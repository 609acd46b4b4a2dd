//! Trait regressor
//!
//! The regressor artifact comes in one of two encodings. The encoding is
//! picked once at load time (declared in config, or detected from the
//! artifact's top-level shape); the prediction path only ever sees
//! [`TraitRegressor::predict`].

use crate::error::FatalConfigError;
use crate::fusion::FeatureVector;
use anyhow::Result;
use big5_common::config::RegressorEncoding;
use big5_common::traits::TRAIT_COUNT;
use serde_json::Value;
use std::path::Path;
use tracing::info;

pub mod multi_output;
pub mod xgboost;

pub use multi_output::MultiOutputRegressor;
pub use xgboost::XgbBooster;

/// Fused feature vector → one score per trait, in [`big5_common::Trait::ALL`] order
pub trait TraitRegressor: Send + Sync {
    /// Artifact encoding name, for logging
    fn encoding(&self) -> &'static str;

    fn predict(&self, features: &FeatureVector) -> Result<[f64; TRAIT_COUNT]>;
}

/// Concrete artifact encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactEncoding {
    TreeEnsembleNative,
    GenericSerialized,
}

impl ArtifactEncoding {
    /// Inspect the artifact's top-level keys
    pub fn detect(root: &Value) -> Option<Self> {
        if root.get("learner").map(Value::is_object).unwrap_or(false) {
            Some(ArtifactEncoding::TreeEnsembleNative)
        } else if root.get("estimators").map(Value::is_array).unwrap_or(false) {
            Some(ArtifactEncoding::GenericSerialized)
        } else {
            None
        }
    }

    /// Declared encoding wins; `auto` falls back to detection
    pub fn resolve(declared: RegressorEncoding, root: &Value) -> Option<Self> {
        match declared {
            RegressorEncoding::TreeEnsembleNative => Some(ArtifactEncoding::TreeEnsembleNative),
            RegressorEncoding::GenericSerialized => Some(ArtifactEncoding::GenericSerialized),
            RegressorEncoding::Auto => Self::detect(root),
        }
    }
}

/// Loaded regressor, one variant per encoding
#[derive(Debug, Clone)]
pub enum LoadedRegressor {
    TreeEnsemble(XgbBooster),
    MultiOutput(MultiOutputRegressor),
}

impl LoadedRegressor {
    pub fn from_json(
        root: &Value,
        declared: RegressorEncoding,
    ) -> std::result::Result<Self, String> {
        let encoding = ArtifactEncoding::resolve(declared, root)
            .ok_or_else(|| "unrecognized regressor encoding".to_string())?;
        match encoding {
            ArtifactEncoding::TreeEnsembleNative => XgbBooster::from_json(root)
                .map(LoadedRegressor::TreeEnsemble)
                .map_err(|e| e.to_string()),
            ArtifactEncoding::GenericSerialized => MultiOutputRegressor::from_json(root)
                .map(LoadedRegressor::MultiOutput)
                .map_err(|e| e.to_string()),
        }
    }
}

impl TraitRegressor for LoadedRegressor {
    fn encoding(&self) -> &'static str {
        match self {
            LoadedRegressor::TreeEnsemble(m) => m.encoding(),
            LoadedRegressor::MultiOutput(m) => m.encoding(),
        }
    }

    fn predict(&self, features: &FeatureVector) -> Result<[f64; TRAIT_COUNT]> {
        match self {
            LoadedRegressor::TreeEnsemble(m) => m.predict(features),
            LoadedRegressor::MultiOutput(m) => m.predict(features),
        }
    }
}

/// Read and decode the regressor artifact
pub fn load_regressor(
    path: &Path,
    declared: RegressorEncoding,
) -> std::result::Result<LoadedRegressor, FatalConfigError> {
    if !path.exists() {
        return Err(FatalConfigError::MissingArtifact(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path)?;
    let root: Value =
        serde_json::from_str(&content).map_err(|e| FatalConfigError::invalid(path, e.to_string()))?;
    let regressor =
        LoadedRegressor::from_json(&root, declared).map_err(|msg| FatalConfigError::invalid(path, msg))?;

    info!(
        path = %path.display(),
        encoding = regressor.encoding(),
        "Trait regressor loaded"
    );
    Ok(regressor)
}
