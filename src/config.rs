use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Application-level constants
pub const APP_NAME: &str = "Health Trail";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "mistral";
pub const DEFAULT_SUMMARY_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 10;

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "health_trail_lib=info,warn"
}

/// Get the application data directory
/// ~/HealthTrail/ on all platforms; current directory if no home is known.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("HealthTrail")
}

/// Default directory for rendered reports
pub fn reports_dir() -> PathBuf {
    app_data_dir().join("reports")
}

/// Runtime settings, resolved once at startup and passed into services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineSettings {
    pub ollama_url: String,
    pub ollama_model: String,
    pub summary_timeout_secs: u64,
    /// `None` disables the external range lookup step.
    pub range_lookup_url: Option<String>,
    pub range_lookup_timeout_secs: u64,
    pub reports_dir: PathBuf,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            ollama_model: DEFAULT_OLLAMA_MODEL.to_string(),
            summary_timeout_secs: DEFAULT_SUMMARY_TIMEOUT_SECS,
            range_lookup_url: None,
            range_lookup_timeout_secs: DEFAULT_LOOKUP_TIMEOUT_SECS,
            reports_dir: reports_dir(),
        }
    }
}

impl PipelineSettings {
    /// Read `HEALTH_TRAIL_*` environment variables over the defaults.
    pub fn from_env() -> Self {
        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source.
    pub fn from_source<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| var(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            ollama_url: non_empty("HEALTH_TRAIL_OLLAMA_URL").unwrap_or(defaults.ollama_url),
            ollama_model: non_empty("HEALTH_TRAIL_OLLAMA_MODEL").unwrap_or(defaults.ollama_model),
            summary_timeout_secs: parse_secs(
                "HEALTH_TRAIL_SUMMARY_TIMEOUT_SECS",
                non_empty("HEALTH_TRAIL_SUMMARY_TIMEOUT_SECS"),
                defaults.summary_timeout_secs,
            ),
            range_lookup_url: non_empty("HEALTH_TRAIL_RANGE_LOOKUP_URL"),
            range_lookup_timeout_secs: parse_secs(
                "HEALTH_TRAIL_RANGE_LOOKUP_TIMEOUT_SECS",
                non_empty("HEALTH_TRAIL_RANGE_LOOKUP_TIMEOUT_SECS"),
                defaults.range_lookup_timeout_secs,
            ),
            reports_dir: non_empty("HEALTH_TRAIL_REPORTS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.reports_dir),
        }
    }
}

fn parse_secs(key: &str, raw: Option<String>, default: u64) -> u64 {
    match raw {
        None => default,
        Some(raw) => match raw.parse::<u64>() {
            Ok(secs) if secs > 0 => secs,
            _ => {
                tracing::warn!(key, value = %raw, default, "Invalid timeout, using default");
                default
            }
        },
    }
}
