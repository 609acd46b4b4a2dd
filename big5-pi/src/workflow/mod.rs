//! Per-comment workflow and cross-comment aggregation
//!
//! - [`CommentPipeline`]: normalize → extract → fuse → regress, for one comment
//! - [`ProfilePredictor`]: runs the pipeline over a batch and averages the
//!   per-comment trait vectors into a [`big5_common::PersonalityProfile`]
//!
//! Fallback to the neutral profile is NOT done here; that policy belongs to
//! the HTTP boundary.

pub mod aggregator;
pub mod comment_pipeline;

pub use aggregator::{mean_scores, ProfilePredictor};
pub use comment_pipeline::CommentPipeline;
