//! Client configuration, read from `STOCKVIEW_*` environment variables.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;
use stockview_inventory::ReportFormat;
use stockview_observability::LogFormat;

pub const ENV_API_URL: &str = "STOCKVIEW_API_URL";
pub const ENV_AUTH_TOKEN: &str = "STOCKVIEW_AUTH_TOKEN";
pub const ENV_TIMEOUT_SECS: &str = "STOCKVIEW_TIMEOUT_SECS";
pub const ENV_CURRENCY_SYMBOL: &str = "STOCKVIEW_CURRENCY_SYMBOL";
pub const ENV_DATE_FORMAT: &str = "STOCKVIEW_DATE_FORMAT";
pub const ENV_TIMESTAMP_FORMAT: &str = "STOCKVIEW_TIMESTAMP_FORMAT";
pub const ENV_REPORT_DIR: &str = "STOCKVIEW_REPORT_DIR";
pub const ENV_LOG_FORMAT: &str = "STOCKVIEW_LOG_FORMAT";

const DEFAULT_API_URL: &str = "http://localhost:5000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Everything the client needs to talk to the service and render output.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: Url,
    pub auth_token: Option<String>,
    pub timeout: Duration,
    pub report_format: ReportFormat,
    pub report_dir: PathBuf,
    pub log_format: LogFormat,
}

impl ClientConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let raw_url = get(ENV_API_URL).unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url = Url::parse(raw_url.trim())
            .map_err(|e| ConfigError::invalid(ENV_API_URL, e.to_string()))?;
        if !matches!(api_url.scheme(), "http" | "https") {
            return Err(ConfigError::invalid(
                ENV_API_URL,
                format!("unsupported scheme '{}'", api_url.scheme()),
            ));
        }

        let timeout = match get(ENV_TIMEOUT_SECS) {
            Some(raw) => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::invalid(ENV_TIMEOUT_SECS, format!("'{raw}' is not a number of seconds")))?;
                if secs == 0 {
                    return Err(ConfigError::invalid(ENV_TIMEOUT_SECS, "must be at least 1"));
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let defaults = ReportFormat::default();
        let report_format = ReportFormat {
            currency_symbol: get(ENV_CURRENCY_SYMBOL).unwrap_or(defaults.currency_symbol),
            date_format: get(ENV_DATE_FORMAT).unwrap_or(defaults.date_format),
            timestamp_format: get(ENV_TIMESTAMP_FORMAT).unwrap_or(defaults.timestamp_format),
        };

        let report_dir = get(ENV_REPORT_DIR)
            .map(PathBuf::from)
            .or_else(dirs::document_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        let log_format = match get(ENV_LOG_FORMAT) {
            Some(raw) => raw
                .parse::<LogFormat>()
                .map_err(|reason| ConfigError::invalid(ENV_LOG_FORMAT, reason))?,
            None => LogFormat::default(),
        };

        Ok(Self {
            api_url,
            auth_token: get(ENV_AUTH_TOKEN),
            timeout,
            report_format,
            report_dir,
            log_format,
        })
    }
}
