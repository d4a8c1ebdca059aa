//! Tracing subscriber setup.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};

/// Build the filter: an explicit directive wins, then `--verbose`, then the
/// configured level. Noisy HTTP internals are capped at `warn`.
pub fn build_filter(config: &LoggingConfig, verbose: bool) -> Result<EnvFilter> {
    if let Some(directive) = &config.filter {
        return EnvFilter::try_new(directive)
            .map_err(|e| anyhow!("Invalid log filter '{}': {}", directive, e));
    }
    let level = if verbose { "debug" } else { config.level.as_str() };
    Ok(EnvFilter::new(format!("{level},hyper=warn,reqwest=warn,rustls=warn")))
}

/// Install the global subscriber. Logs go to stderr so they never mix with
/// command output.
pub fn init(config: &LoggingConfig, verbose: bool) -> Result<()> {
    let filter = build_filter(config, verbose)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    let result = match config.format {
        LogFormat::Human => builder.compact().try_init(),
        LogFormat::Json => builder.json().with_current_span(true).try_init(),
    };
    result.map_err(|e| anyhow!("Failed to initialise logging: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;

    #[test]
    fn test_filter_from_level() {
        let config = LoggingConfig {
            level: LogLevel::Info,
            ..LoggingConfig::default()
        };
        let filter = build_filter(&config, false).unwrap();
        assert!(filter.to_string().contains("info"));
    }

    #[test]
    fn test_verbose_raises_level() {
        let filter = build_filter(&LoggingConfig::default(), true).unwrap();
        assert!(filter.to_string().contains("debug"));
    }

    #[test]
    fn test_explicit_filter_wins() {
        let config = LoggingConfig {
            filter: Some("dawa_data=trace".into()),
            ..LoggingConfig::default()
        };
        assert_eq!(build_filter(&config, true).unwrap().to_string(), "dawa_data=trace");
    }

    #[test]
    fn test_invalid_filter_is_an_error() {
        let config = LoggingConfig {
            filter: Some("dawa_data=notalevel".into()),
            ..LoggingConfig::default()
        };
        assert!(build_filter(&config, false).is_err());
    }
}
