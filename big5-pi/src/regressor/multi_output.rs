//! Generic serialized multi-output regressor
//!
//! One independent estimator per trait, exported to JSON by the model
//! preparation tooling:
//!
//! ```json
//! { "n_features_in": 781,
//!   "estimators": [ {"kind": "linear", "coef": [...], "intercept": 0.1},
//!                   {"kind": "constant", "value": 5.0},
//!                   {"kind": "xgboost", "booster": {"learner": {...}}}, ... ] }
//! ```
//!
//! `xgboost` estimators embed a single-target booster exactly as XGBoost
//! saves it, so a multi-output wrapper around five gradient-boosted
//! regressors exports without re-encoding its trees.

use super::xgboost::XgbBooster;
use super::TraitRegressor;
use crate::fusion::{FeatureVector, FEATURE_DIM};
use anyhow::{bail, Result};
use big5_common::traits::TRAIT_COUNT;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Estimator {
    Linear { coef: Vec<f64>, intercept: f64 },
    Constant { value: f64 },
    Xgboost {
        #[serde(deserialize_with = "single_output_booster")]
        booster: XgbBooster,
    },
}

fn single_output_booster<'de, D>(deserializer: D) -> std::result::Result<XgbBooster, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    XgbBooster::from_single_output_json(&raw).map_err(serde::de::Error::custom)
}

impl Estimator {
    fn predict(&self, x: &[f32]) -> f64 {
        match self {
            Estimator::Linear { coef, intercept } => {
                intercept
                    + coef
                        .iter()
                        .zip(x)
                        .map(|(c, v)| c * *v as f64)
                        .sum::<f64>()
            }
            Estimator::Constant { value } => *value,
            Estimator::Xgboost { booster } => booster.margins(x)[0],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MultiOutputRegressor {
    n_features_in: usize,
    estimators: Vec<Estimator>,
}

impl MultiOutputRegressor {
    pub fn from_json(root: &serde_json::Value) -> Result<Self> {
        let model = Self::deserialize(root)?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> Result<()> {
        if self.n_features_in != FEATURE_DIM {
            bail!(
                "model expects {} features, pipeline produces {}",
                self.n_features_in,
                FEATURE_DIM
            );
        }
        if self.estimators.len() != TRAIT_COUNT {
            bail!(
                "model has {} estimators, expected {}",
                self.estimators.len(),
                TRAIT_COUNT
            );
        }
        for (i, est) in self.estimators.iter().enumerate() {
            if let Estimator::Linear { coef, .. } = est {
                if coef.len() != FEATURE_DIM {
                    bail!("estimator {} has {} coefficients", i, coef.len());
                }
            }
        }
        Ok(())
    }
}

impl TraitRegressor for MultiOutputRegressor {
    fn encoding(&self) -> &'static str {
        "generic_serialized"
    }

    fn predict(&self, features: &FeatureVector) -> Result<[f64; TRAIT_COUNT]> {
        let x = features.as_slice();
        let mut out = [0.0; TRAIT_COUNT];
        for (slot, est) in out.iter_mut().zip(&self.estimators) {
            *slot = est.predict(x);
        }
        if out.iter().any(|v| !v.is_finite()) {
            bail!("non-finite prediction {:?}", out);
        }
        Ok(out)
    }
}
