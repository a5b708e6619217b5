use std::env;

use crate::retry::RetryPolicy;

/// Runtime settings, read from the environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub db_url: String,
    pub retry: RetryPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_url: "sqlite:civic.sqlite3".to_string(),
            retry: RetryPolicy::Once,
        }
    }
}

impl AppConfig {
    /// `CIVIC_DB_URL` and `CIVIC_PERSIST_RETRY` (`0` disables the retry).
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let db_url = lookup("CIVIC_DB_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.db_url);
        let retry = match lookup("CIVIC_PERSIST_RETRY").as_deref().map(str::trim) {
            Some("0" | "false" | "off") => RetryPolicy::Never,
            _ => defaults.retry,
        };
        Self { db_url, retry }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[]));
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn env_overrides_defaults() {
        let config = AppConfig::from_lookup(lookup(&[
            ("CIVIC_DB_URL", "sqlite::memory:"),
            ("CIVIC_PERSIST_RETRY", "0"),
        ]));
        assert_eq!(config.db_url, "sqlite::memory:");
        assert_eq!(config.retry, RetryPolicy::Never);
    }

    #[test]
    fn blank_db_url_falls_back() {
        let config = AppConfig::from_lookup(lookup(&[("CIVIC_DB_URL", "  ")]));
        assert_eq!(config.db_url, "sqlite:civic.sqlite3");
    }
}
