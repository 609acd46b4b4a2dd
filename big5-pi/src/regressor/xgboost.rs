//! XGBoost JSON booster (tree-ensemble-native encoding)
//!
//! Supports `gbtree` boosters with numerical splits, both one-output-per-tree
//! ensembles (`tree_info` names the target) and vector-leaf multi-target
//! trees (`size_leaf_vector == num_target`). Only identity-link squared-error
//! objectives are accepted so raw margins are the predictions.
//!
//! A five-target booster is a [`TraitRegressor`] on its own; single-target
//! boosters are embedded per trait by the multi-output encoding.

use super::TraitRegressor;
use crate::fusion::{FeatureVector, FEATURE_DIM};
use anyhow::{bail, Result};
use big5_common::traits::TRAIT_COUNT;
use serde_json::Value;

const SUPPORTED_OBJECTIVES: &[&str] = &["reg:squarederror", "reg:linear"];

#[derive(Debug, Clone)]
struct Tree {
    left: Vec<i32>,
    right: Vec<i32>,
    split_index: Vec<usize>,
    split_condition: Vec<f32>,
    default_left: Vec<bool>,
    /// Leaf vectors, `leaf_size` values per node
    base_weights: Vec<f32>,
    leaf_size: usize,
    /// Output slot for scalar-leaf trees
    target: usize,
}

impl Tree {
    fn leaf(&self, features: &[f32]) -> usize {
        let mut nid = 0usize;
        while self.left[nid] != -1 {
            let x = features[self.split_index[nid]];
            let go_left = if x.is_nan() {
                self.default_left[nid]
            } else {
                x < self.split_condition[nid]
            };
            nid = if go_left {
                self.left[nid] as usize
            } else {
                self.right[nid] as usize
            };
        }
        nid
    }

    fn accumulate(&self, features: &[f32], out: &mut [f64]) {
        let nid = self.leaf(features);
        if self.leaf_size == 1 {
            out[self.target] += self.split_condition[nid] as f64;
        } else {
            let start = nid * self.leaf_size;
            for (slot, w) in out
                .iter_mut()
                .zip(&self.base_weights[start..start + self.leaf_size])
            {
                *slot += *w as f64;
            }
        }
    }
}

/// Decoded XGBoost booster
#[derive(Debug, Clone)]
pub struct XgbBooster {
    trees: Vec<Tree>,
    base_score: Vec<f64>,
}

/// XGBoost stores most params as strings ("781", "5E-1")
fn param_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn param_usize(value: &Value) -> Option<usize> {
    param_f64(value).and_then(|f| {
        if f >= 0.0 && f.fract() == 0.0 {
            Some(f as usize)
        } else {
            None
        }
    })
}

/// Scalar or bracketed list (`"[5E-1,5E-1]"`) base score
fn parse_base_score(value: &Value, num_target: usize) -> Result<Vec<f64>> {
    if let Some(f) = param_f64(value) {
        return Ok(vec![f; num_target]);
    }
    let Some(s) = value.as_str() else {
        bail!("base_score is not a number");
    };
    let inner = s.trim().trim_start_matches('[').trim_end_matches(']');
    let scores = inner
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()?;
    match scores.len() {
        1 => Ok(vec![scores[0]; num_target]),
        n if n == num_target => Ok(scores),
        n => bail!("base_score has {} values, expected {}", n, num_target),
    }
}

fn int_array(tree: &Value, key: &str) -> Result<Vec<i64>> {
    let Some(items) = tree.get(key).and_then(Value::as_array) else {
        bail!("tree is missing '{}'", key);
    };
    items
        .iter()
        .map(|v| match v {
            Value::Bool(b) => Some(*b as i64),
            other => other.as_i64(),
        })
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| anyhow::anyhow!("'{}' holds non-integer values", key))
}

fn float_array(tree: &Value, key: &str) -> Result<Vec<f32>> {
    let Some(items) = tree.get(key).and_then(Value::as_array) else {
        bail!("tree is missing '{}'", key);
    };
    items
        .iter()
        .map(|v| v.as_f64().map(|f| f as f32))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| anyhow::anyhow!("'{}' holds non-numeric values", key))
}

fn parse_tree(tree: &Value, target: usize, num_target: usize) -> Result<Tree> {
    let left = int_array(tree, "left_children")?;
    let right = int_array(tree, "right_children")?;
    let split_index = int_array(tree, "split_indices")?;
    let split_condition = float_array(tree, "split_conditions")?;
    let default_left = int_array(tree, "default_left")?;
    let base_weights = float_array(tree, "base_weights")?;

    let n = left.len();
    if n == 0 {
        bail!("tree has no nodes");
    }
    if [right.len(), split_index.len(), split_condition.len(), default_left.len()]
        .iter()
        .any(|&len| len != n)
    {
        bail!("tree node arrays have inconsistent lengths");
    }

    if let Some(split_type) = tree.get("split_type").and_then(Value::as_array) {
        if split_type.iter().any(|t| t.as_i64().unwrap_or(0) != 0) {
            bail!("categorical splits are not supported");
        }
    }
    if let Some(nodes) = tree.get("categories_nodes").and_then(Value::as_array) {
        if !nodes.is_empty() {
            bail!("categorical splits are not supported");
        }
    }

    let leaf_size = tree
        .get("tree_param")
        .and_then(|p| p.get("size_leaf_vector"))
        .and_then(param_usize)
        .unwrap_or(1)
        .max(1);
    if leaf_size != 1 && leaf_size != num_target {
        bail!(
            "leaf vector size {} does not match {} targets",
            leaf_size,
            num_target
        );
    }
    if leaf_size > 1 && base_weights.len() < n * leaf_size {
        bail!("vector-leaf tree has too few base weights");
    }
    if leaf_size == 1 && target >= num_target {
        bail!("tree target {} outside {} outputs", target, num_target);
    }

    for nid in 0..n {
        let (l, r) = (left[nid], right[nid]);
        if l == -1 {
            continue;
        }
        let in_range = |c: i64| c > nid as i64 && (c as usize) < n;
        if !in_range(l) || !in_range(r) {
            bail!("node {} has out-of-range children", nid);
        }
        if split_index[nid] < 0 || split_index[nid] as usize >= FEATURE_DIM {
            bail!("node {} splits on feature {}", nid, split_index[nid]);
        }
    }

    Ok(Tree {
        left: left.into_iter().map(|c| c as i32).collect(),
        right: right.into_iter().map(|c| c as i32).collect(),
        split_index: split_index.into_iter().map(|i| i.max(0) as usize).collect(),
        split_condition,
        default_left: default_left.into_iter().map(|d| d != 0).collect(),
        base_weights,
        leaf_size,
        target,
    })
}

impl XgbBooster {
    /// Booster predicting all five traits
    pub fn from_json(root: &Value) -> Result<Self> {
        Self::parse(root, TRAIT_COUNT)
    }

    /// Booster predicting a single trait
    pub fn from_single_output_json(root: &Value) -> Result<Self> {
        Self::parse(root, 1)
    }

    fn parse(root: &Value, expected_targets: usize) -> Result<Self> {
        let Some(learner) = root.get("learner") else {
            bail!("missing 'learner' object");
        };

        if let Some(name) = learner.pointer("/objective/name").and_then(Value::as_str) {
            if !SUPPORTED_OBJECTIVES.contains(&name) {
                bail!("unsupported objective '{}'", name);
            }
        }

        let params = learner
            .get("learner_model_param")
            .ok_or_else(|| anyhow::anyhow!("missing 'learner_model_param'"))?;
        let num_feature = params
            .get("num_feature")
            .and_then(param_usize)
            .ok_or_else(|| anyhow::anyhow!("missing num_feature"))?;
        let num_target = params
            .get("num_target")
            .and_then(param_usize)
            .unwrap_or(1)
            .max(1);
        if num_feature != FEATURE_DIM {
            bail!("model expects {} features, pipeline produces {}", num_feature, FEATURE_DIM);
        }
        if num_target != expected_targets {
            bail!("model has {} outputs, expected {}", num_target, expected_targets);
        }

        let booster = learner
            .get("gradient_booster")
            .ok_or_else(|| anyhow::anyhow!("missing 'gradient_booster'"))?;
        if let Some(name) = booster.get("name").and_then(Value::as_str) {
            if name != "gbtree" {
                bail!("unsupported booster '{}'", name);
            }
        }
        let model = booster
            .get("model")
            .ok_or_else(|| anyhow::anyhow!("missing booster model"))?;
        let trees_json = model
            .get("trees")
            .and_then(Value::as_array)
            .ok_or_else(|| anyhow::anyhow!("missing 'trees'"))?;
        let tree_info = model
            .get("tree_info")
            .and_then(Value::as_array)
            .map(|info| info.iter().map(param_usize).collect::<Option<Vec<_>>>())
            .unwrap_or_else(|| Some(vec![0; trees_json.len()]))
            .ok_or_else(|| anyhow::anyhow!("'tree_info' holds non-integer values"))?;
        if tree_info.len() != trees_json.len() {
            bail!(
                "tree_info has {} entries for {} trees",
                tree_info.len(),
                trees_json.len()
            );
        }

        let trees = trees_json
            .iter()
            .zip(&tree_info)
            .enumerate()
            .map(|(i, (tree, &target))| {
                parse_tree(tree, target, num_target).map_err(|e| anyhow::anyhow!("tree {}: {}", i, e))
            })
            .collect::<Result<Vec<_>>>()?;

        let base_score = match params.get("base_score") {
            Some(v) => parse_base_score(v, num_target)?,
            None => vec![0.5; num_target],
        };

        Ok(Self { trees, base_score })
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn num_targets(&self) -> usize {
        self.base_score.len()
    }

    /// Raw margins, one per target
    pub fn margins(&self, features: &[f32]) -> Vec<f64> {
        let mut out = self.base_score.clone();
        for tree in &self.trees {
            tree.accumulate(features, &mut out);
        }
        out
    }
}

impl TraitRegressor for XgbBooster {
    fn encoding(&self) -> &'static str {
        "tree_ensemble_native"
    }

    fn predict(&self, features: &FeatureVector) -> Result<[f64; TRAIT_COUNT]> {
        if features.len() != FEATURE_DIM {
            bail!("feature vector has {} values, expected {}", features.len(), FEATURE_DIM);
        }
        let margins = self.margins(features.as_slice());
        if margins.len() != TRAIT_COUNT {
            bail!("booster has {} outputs, expected {}", margins.len(), TRAIT_COUNT);
        }
        let mut out = [0.0; TRAIT_COUNT];
        out.copy_from_slice(&margins);
        Ok(out)
    }
}
