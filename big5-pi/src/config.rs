//! Configuration resolution for big5-pi
//!
//! The summary API key is resolved with ENV → TOML priority.

use big5_common::config::SummaryConfig;
use tracing::{info, warn};

/// Environment variable holding the summary API key
pub const API_KEY_ENV_VAR: &str = "GEMINI_API_KEY";

/// Resolve the summary API key
///
/// **Priority:** ENV → TOML. `None` means summaries are rule-based only.
pub fn resolve_summary_api_key(summary: &SummaryConfig) -> Option<String> {
    let env_key = std::env::var(API_KEY_ENV_VAR)
        .ok()
        .filter(|k| is_valid_key(k));
    let toml_key = summary.api_key.clone().filter(|k| is_valid_key(k));

    if env_key.is_some() && toml_key.is_some() {
        warn!(
            "Summary API key found in environment and TOML. Using environment (highest priority)."
        );
    }

    if let Some(key) = env_key {
        info!("Summary API key loaded from environment variable");
        return Some(key);
    }

    if let Some(key) = toml_key {
        info!("Summary API key loaded from TOML config");
        return Some(key);
    }

    None
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn with_toml_key(key: Option<&str>) -> SummaryConfig {
        SummaryConfig {
            api_key: key.map(str::to_string),
            ..SummaryConfig::default()
        }
    }

    #[test]
    fn test_is_valid_key() {
        assert!(is_valid_key("abc"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("   "));
    }

    #[test]
    #[serial]
    fn test_env_takes_priority() {
        std::env::set_var(API_KEY_ENV_VAR, "env-key");
        let key = resolve_summary_api_key(&with_toml_key(Some("toml-key")));
        std::env::remove_var(API_KEY_ENV_VAR);
        assert_eq!(key.as_deref(), Some("env-key"));
    }

    #[test]
    #[serial]
    fn test_toml_used_when_env_absent() {
        std::env::remove_var(API_KEY_ENV_VAR);
        let key = resolve_summary_api_key(&with_toml_key(Some("toml-key")));
        assert_eq!(key.as_deref(), Some("toml-key"));
    }

    #[test]
    #[serial]
    fn test_blank_keys_ignored() {
        std::env::set_var(API_KEY_ENV_VAR, "  ");
        let key = resolve_summary_api_key(&with_toml_key(Some("")));
        std::env::remove_var(API_KEY_ENV_VAR);
        assert_eq!(key, None);
    }
}
