//! Configuration module

use std::env;
use std::path::PathBuf;

use anyhow::Context;
use validator::Validate;

use crate::normalizer::InputMode;

/// Application configuration
#[derive(Debug, Clone, Validate)]
pub struct Config {
    /// Bind address
    #[validate(length(min = 1))]
    pub host: String,

    /// Server port
    #[validate(range(min = 1))]
    pub port: u16,

    /// Serialized classifier
    pub model_path: PathBuf,

    /// Serialized scaler
    pub scaler_path: PathBuf,

    /// Ordered feature-name list; the mode's built-in schema when unset
    pub feature_schema_path: Option<PathBuf>,

    /// Friendly decoding rules; built-in rules when unset
    pub normalizer_rules_path: Option<PathBuf>,

    /// Accepted request shape
    pub input_mode: InputMode,

    /// Reject unrecognised fields; mode default when unset
    pub strict_fields: Option<bool>,

    /// Version reported by /model-info
    #[validate(length(min = 1))]
    pub model_version: String,

    /// Keep serving when artifacts fail to load (/predict answers 500)
    pub allow_degraded_start: bool,

    /// Emit JSON log lines
    pub json_logs: bool,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let input_mode = match get("INPUT_MODE") {
            Some(raw) => raw
                .parse::<InputMode>()
                .map_err(anyhow::Error::msg)
                .context("INPUT_MODE")?,
            None => InputMode::Friendly,
        };

        let port = match get("PORT") {
            Some(raw) => raw.trim().parse::<u16>().context("PORT")?,
            None => 5000,
        };

        let config = Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),

            port,

            model_path: get("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("artifacts/model.json")),

            scaler_path: get("SCALER_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("artifacts/scaler.json")),

            feature_schema_path: get("FEATURE_SCHEMA_PATH")
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),

            normalizer_rules_path: get("NORMALIZER_RULES_PATH")
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),

            input_mode,

            strict_fields: get("STRICT_FIELDS").and_then(|v| parse_flag(&v)),

            model_version: get("MODEL_VERSION").unwrap_or_else(|| "1.0.0".to_string()),

            allow_degraded_start: get("ALLOW_DEGRADED_START")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(false),

            json_logs: get("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),

            environment: get("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
        };

        config.validate().context("invalid configuration")?;
        Ok(config)
    }

    /// Effective strictness for the configured input mode
    pub fn strict(&self) -> bool {
        self.strict_fields
            .unwrap_or_else(|| self.input_mode.strict_by_default())
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
