//! Runtime configuration: tunables from an optional YAML file plus secrets.
//!
//! Tunables ([`DashboardConfig`]) default to the production endpoints and
//! cache lifetimes, so the YAML file only needs the keys being overridden:
//!
//! ```yaml
//! gemini_model: gemini-1.5-flash
//! smtp_port: 465
//! news_ttl_secs: 3600
//! ```
//!
//! Secrets ([`Secrets`]) never come from the YAML file. They are resolved by
//! the CLI from flags or environment variables.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{info, instrument};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub news_base_url: String,
    pub gemini_base_url: String,
    pub gemini_model: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub page_size: usize,
    pub news_ttl_secs: u64,
    pub summary_ttl_secs: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            news_base_url: "https://newsapi.org".to_string(),
            gemini_base_url: "https://generativelanguage.googleapis.com".to_string(),
            gemini_model: "gemini-1.5-flash".to_string(),
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 465,
            page_size: 10,
            news_ttl_secs: 3600,
            summary_ttl_secs: 86_400,
        }
    }
}

impl DashboardConfig {
    /// Load tunables from `path`, or fall back to defaults when no path is given.
    #[instrument(level = "info")]
    pub async fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = tokio::fs::read_to_string(path).await.map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        let config = Self::from_yaml(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })?;
        info!(path, "Loaded configuration");
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        // An empty document means "all defaults"
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    pub fn news_ttl(&self) -> Duration {
        Duration::from_secs(self.news_ttl_secs)
    }

    pub fn summary_ttl(&self) -> Duration {
        Duration::from_secs(self.summary_ttl_secs)
    }
}

/// API keys and email credentials.
#[derive(Clone, Default)]
pub struct Secrets {
    pub news_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub email_sender: Option<String>,
    pub email_password: Option<String>,
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |v: &Option<String>| v.as_deref().map(|_| "<redacted>");
        f.debug_struct("Secrets")
            .field("news_api_key", &redact(&self.news_api_key))
            .field("gemini_api_key", &redact(&self.gemini_api_key))
            .field("email_sender", &self.email_sender)
            .field("email_password", &redact(&self.email_password))
            .finish()
    }
}

impl Secrets {
    /// Warnings to show the reader about missing configuration.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.gemini_api_key.as_deref().is_none_or(str::is_empty) {
            warnings.push("GEMINI_API_KEY not found. Summaries are disabled for this session.".to_string());
        }
        warnings
    }
}
