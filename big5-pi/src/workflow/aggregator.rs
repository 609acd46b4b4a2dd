//! Cross-comment aggregation
//!
//! Every comment runs through the [`CommentPipeline`] independently (fanned
//! out on the rayon pool when `parallel` is set); the batch waits for all of
//! them, then takes the element-wise arithmetic mean per trait. Any
//! per-comment failure fails the whole batch.

use super::CommentPipeline;
use crate::error::PredictionError;
use big5_common::traits::TRAIT_COUNT;
use big5_common::PersonalityProfile;
use rayon::prelude::*;
use std::time::Instant;
use tracing::{debug, info};

/// Element-wise mean of per-comment trait vectors (`None` for no vectors)
pub fn mean_scores(vectors: &[[f64; TRAIT_COUNT]]) -> Option<[f64; TRAIT_COUNT]> {
    if vectors.is_empty() {
        return None;
    }
    let mut sums = [0.0f64; TRAIT_COUNT];
    for v in vectors {
        for (sum, x) in sums.iter_mut().zip(v) {
            *sum += x;
        }
    }
    let n = vectors.len() as f64;
    Some(sums.map(|s| s / n))
}

/// Batch → personality profile
#[derive(Debug, Clone)]
pub struct ProfilePredictor {
    pipeline: CommentPipeline,
    parallel: bool,
}

impl ProfilePredictor {
    pub fn new(pipeline: CommentPipeline, parallel: bool) -> Self {
        Self { pipeline, parallel }
    }

    pub fn pipeline(&self) -> &CommentPipeline {
        &self.pipeline
    }

    /// One trait vector per comment, in input order
    pub fn per_comment_scores<S>(
        &self,
        comments: &[S],
    ) -> Result<Vec<[f64; TRAIT_COUNT]>, PredictionError>
    where
        S: AsRef<str> + Sync,
    {
        if self.parallel && comments.len() > 1 {
            comments
                .par_iter()
                .map(|c| self.pipeline.score_comment(c.as_ref()))
                .collect()
        } else {
            comments
                .iter()
                .map(|c| self.pipeline.score_comment(c.as_ref()))
                .collect()
        }
    }

    /// Predict the profile for one author's comments
    ///
    /// Rejects an empty batch instead of producing NaN means.
    pub fn predict_profile<S>(&self, comments: &[S]) -> Result<PersonalityProfile, PredictionError>
    where
        S: AsRef<str> + Sync,
    {
        if comments.is_empty() {
            return Err(PredictionError::EmptyBatch);
        }

        let started = Instant::now();
        let vectors = self.per_comment_scores(comments)?;
        let means = mean_scores(&vectors).ok_or(PredictionError::EmptyBatch)?;
        debug!(?means, "Aggregated trait means");

        let profile = PersonalityProfile::from_means(means);
        info!(
            comments = comments.len(),
            parallel = self.parallel,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Predicted personality profile"
        );
        Ok(profile)
    }
}
