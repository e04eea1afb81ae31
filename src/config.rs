use crate::domain::candidate::Tolerance;
use crate::error::{ReconError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;

/// Matching parameters consumed by the engine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatchConfig {
    /// Maximum calendar-day distance between candidate dates.
    pub date_tolerance_days: u32,
    /// Maximum absolute amount difference between candidates.
    pub amount_tolerance: Decimal,
    /// Minimum oracle confidence for a pairing to be committed.
    pub match_threshold: f64,
    /// Combined row cap across both ledgers, checked before any oracle call.
    pub max_total_rows: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            date_tolerance_days: 7,
            amount_tolerance: Decimal::ONE_HUNDRED,
            match_threshold: 0.85,
            max_total_rows: 1000,
        }
    }
}

impl MatchConfig {
    pub fn tolerance(&self) -> Tolerance {
        Tolerance {
            date_days: self.date_tolerance_days,
            amount: self.amount_tolerance,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.match_threshold) {
            return Err(ReconError::ConfigError(format!(
                "match_threshold must be within [0, 1], got {}",
                self.match_threshold
            )));
        }
        if self.amount_tolerance.is_sign_negative() {
            return Err(ReconError::ConfigError(format!(
                "amount_tolerance must not be negative, got {}",
                self.amount_tolerance
            )));
        }
        if self.max_total_rows == 0 {
            return Err(ReconError::ConfigError(
                "max_total_rows must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Settings for the HTTP oracle transport.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OracleConfig {
    /// OpenAI-compatible chat-completions URL.
    pub endpoint: String,
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            temperature: 0.0,
            timeout_secs: 120,
        }
    }
}

impl OracleConfig {
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.trim().is_empty() {
            return Err(ReconError::ConfigError("oracle endpoint is empty".to_string()));
        }
        if self.model.trim().is_empty() {
            return Err(ReconError::ConfigError("oracle model is empty".to_string()));
        }
        Ok(())
    }
}

/// Whole-file configuration: a `[matching]` and an `[oracle]` table.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub matching: MatchConfig,
    pub oracle: OracleConfig,
}

impl AppConfig {
    pub fn from_toml(input: &str) -> Result<Self> {
        let config: AppConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let input = std::fs::read_to_string(path)?;
        Self::from_toml(&input)
    }

    pub fn validate(&self) -> Result<()> {
        self.matching.validate()?;
        self.oracle.validate()
    }
}
