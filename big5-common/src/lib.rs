//! # Big5 Common Library
//!
//! Shared code for the Big Five personality services including:
//! - Canonical trait and profile types
//! - Bootstrap configuration loading
//! - Logging initialization
//! - Common error type

pub mod config;
pub mod error;
pub mod logging;
pub mod traits;

pub use error::{Error, Result};
pub use traits::{PersonalityProfile, Trait, TraitScore};
