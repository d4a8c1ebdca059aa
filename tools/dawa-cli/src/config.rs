//! CLI configuration.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// File names searched for, in order, from the working directory upwards.
pub const CONFIG_FILE_NAMES: [&str; 3] = ["dawa.toml", ".dawa.toml", "dawa.json"];

/// Overrides `api.base_url`.
pub const ENV_API_BASE_URL: &str = "DAWA_API_BASE_URL";
/// Overrides the log filter (`tracing_subscriber::EnvFilter` syntax).
pub const ENV_LOG: &str = "DAWA_LOG";

/// CLI configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub checkout: CheckoutConfig,
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        if is_json(path) {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
        }
    }

    /// Save config to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = if is_json(path) {
            serde_json::to_string_pretty(self)?
        } else {
            toml::to_string_pretty(self)?
        };

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Apply environment overrides. `lookup` is `std::env::var` outside tests.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_API_BASE_URL).filter(|v| !v.trim().is_empty()) {
            self.api.base_url = url.trim().to_string();
        }
        if let Some(filter) = lookup(ENV_LOG).filter(|v| !v.trim().is_empty()) {
            self.logging.filter = Some(filter.trim().to_string());
        }
    }

    /// Problems that would make commands fail.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if url::Url::parse(&self.api.base_url).is_err() {
            errors.push(format!("api.base_url '{}' is not a valid URL", self.api.base_url));
        }
        if self.api.timeout_ms == 0 {
            errors.push("api.timeout_ms must be greater than zero".to_string());
        }
        if self.checkout.order_timeout_ms == Some(0) {
            errors.push("checkout.order_timeout_ms must be greater than zero".to_string());
        }
        errors
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().map(|e| e == "json").unwrap_or(false)
}

/// Storefront API settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Retries for idempotent requests.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_max_retries() -> u32 {
    2
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            max_retries: default_max_retries(),
        }
    }
}

/// Where the cart and the session are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Defaults to `~/.local/share/dawa`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

/// Log level for the subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    #[default]
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Output format for logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format.
    #[default]
    Human,
    /// JSON lines, for log aggregation.
    Json,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub level: LogLevel,

    #[serde(default)]
    pub format: LogFormat,

    /// Full filter directive; wins over `level` when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutConfig {
    /// Give up waiting for the order call after this long.
    #[serde(default = "default_order_timeout_ms")]
    pub order_timeout_ms: Option<u64>,
}

fn default_order_timeout_ms() -> Option<u64> {
    Some(30_000)
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            order_timeout_ms: default_order_timeout_ms(),
        }
    }
}

/// Generate a default dawa.toml config file.
pub fn generate_default_config(base_url: &str) -> String {
    format!(
        r#"# Dawa storefront configuration

[api]
base_url = "{base_url}"
timeout_ms = 10000
max_retries = 2

[storage]
# dir = "~/.local/share/dawa"

[logging]
level = "warn"
format = "human"

[checkout]
order_timeout_ms = 30000
"#
    )
}
