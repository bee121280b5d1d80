//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the dataset and
//! the dashboard service. Request handling never reads environment variables.

use crate::constants::{
    DEFAULT_FIXTURE_PATH, DEFAULT_KEY_TERMS, DEFAULT_LAYOUT_SEED, DEFAULT_SNIPPET_LIMIT,
    DEFAULT_TOP_FEATURES,
};
use crate::{ExplainError, ExplainResult};
use hith_fixture::TargetPhrase;
use hith_types::Polarity;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    fixture_path: PathBuf,
    snippet_limit: usize,
    top_features: usize,
    layout_seed: u64,
    key_terms: Vec<TargetPhrase>,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns `ExplainError::InvalidInput` if `snippet_limit` or `top_features` is zero.
    pub fn new(
        fixture_path: PathBuf,
        snippet_limit: usize,
        top_features: usize,
        layout_seed: u64,
    ) -> ExplainResult<Self> {
        if snippet_limit == 0 {
            return Err(ExplainError::InvalidInput(
                "snippet limit must be greater than zero".into(),
            ));
        }
        if top_features == 0 {
            return Err(ExplainError::InvalidInput(
                "top features must be greater than zero".into(),
            ));
        }

        Ok(Self {
            fixture_path,
            snippet_limit,
            top_features,
            layout_seed,
            key_terms: default_key_terms(),
        })
    }

    /// Replace the impact-mode key-term lexicon.
    pub fn with_key_terms(mut self, key_terms: Vec<TargetPhrase>) -> ExplainResult<Self> {
        if key_terms.iter().any(|t| t.phrase.is_empty()) {
            return Err(ExplainError::InvalidInput("key terms cannot be empty".into()));
        }
        self.key_terms = key_terms;
        Ok(self)
    }

    pub fn fixture_path(&self) -> &Path {
        &self.fixture_path
    }

    pub fn snippet_limit(&self) -> usize {
        self.snippet_limit
    }

    pub fn top_features(&self) -> usize {
        self.top_features
    }

    pub fn layout_seed(&self) -> u64 {
        self.layout_seed
    }

    pub fn key_terms(&self) -> &[TargetPhrase] {
        &self.key_terms
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            fixture_path: PathBuf::from(DEFAULT_FIXTURE_PATH),
            snippet_limit: DEFAULT_SNIPPET_LIMIT,
            top_features: DEFAULT_TOP_FEATURES,
            layout_seed: DEFAULT_LAYOUT_SEED,
            key_terms: default_key_terms(),
        }
    }
}

fn default_key_terms() -> Vec<TargetPhrase> {
    DEFAULT_KEY_TERMS
        .iter()
        .map(|(phrase, polarity)| TargetPhrase {
            phrase: (*phrase).to_string(),
            polarity: *polarity,
        })
        .collect()
}

/// Parse an optional environment value, falling back to `default` when unset or blank.
///
/// `name` is only used in the error message.
pub fn setting_from_env_value<T>(name: &str, value: Option<String>, default: T) -> ExplainResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    match value {
        None => Ok(default),
        Some(v) => v
            .parse::<T>()
            .map_err(|e| ExplainError::InvalidInput(format!("{name}='{v}': {e}"))),
    }
}

/// Parse a key-term lexicon of the form `pneumonia:+,stable:positive,sepsis:-`.
///
/// Each entry is `phrase:polarity`, split on the last `:`. Phrases keep inner spaces but are
/// trimmed at the ends. Blank entries between commas are skipped.
pub fn key_terms_from_env_value(value: &str) -> ExplainResult<Vec<TargetPhrase>> {
    let invalid = |entry: &str, why: &str| {
        ExplainError::InvalidInput(format!("HITH_KEY_TERMS entry '{entry}': {why}"))
    };

    let mut terms = Vec::new();
    for entry in value.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (phrase, polarity) = entry
            .rsplit_once(':')
            .ok_or_else(|| invalid(entry, "expected phrase:polarity"))?;
        let phrase = phrase.trim();
        if phrase.is_empty() {
            return Err(invalid(entry, "phrase is empty"));
        }
        let polarity = Polarity::from_wire(polarity)
            .ok_or_else(|| invalid(entry, "polarity must be positive, negative or neutral"))?;
        terms.push(TargetPhrase {
            phrase: phrase.to_string(),
            polarity,
        });
    }

    if terms.is_empty() {
        return Err(ExplainError::InvalidInput(
            "HITH_KEY_TERMS contains no terms".into(),
        ));
    }
    Ok(terms)
}

/// Resolve a `CoreConfig` from raw environment values (as returned by `std::env::var(..).ok()`).
///
/// An unset or blank `key_terms` keeps the built-in lexicon.
pub fn config_from_env_values(
    fixture_path: Option<String>,
    snippet_limit: Option<String>,
    top_features: Option<String>,
    layout_seed: Option<String>,
    key_terms: Option<String>,
) -> ExplainResult<CoreConfig> {
    let fixture_path = fixture_path
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_FIXTURE_PATH.into());

    let cfg = CoreConfig::new(
        PathBuf::from(fixture_path),
        setting_from_env_value("HITH_SNIPPET_LIMIT", snippet_limit, DEFAULT_SNIPPET_LIMIT)?,
        setting_from_env_value("HITH_TOP_FEATURES", top_features, DEFAULT_TOP_FEATURES)?,
        setting_from_env_value("HITH_LAYOUT_SEED", layout_seed, DEFAULT_LAYOUT_SEED)?,
    )?;

    match key_terms.filter(|v| !v.trim().is_empty()) {
        None => Ok(cfg),
        Some(raw) => cfg.with_key_terms(key_terms_from_env_value(&raw)?),
    }
}
