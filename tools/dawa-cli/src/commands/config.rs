//! Configuration management commands.

use std::fs;

use anyhow::{bail, Result};

use super::{ConfigArgs, ConfigCommand};
use crate::config::{generate_default_config, CliConfig, LogFormat};
use crate::context::Context;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Init { base_url, force } => init_config(&base_url, force, ctx),
        ConfigCommand::Validate => validate_config(ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(defaults)"),
    }

    ctx.output.info("");
    ctx.output.info("[api]");
    ctx.output.kv("base_url", &ctx.config.api.base_url);
    ctx.output.kv("timeout_ms", &ctx.config.api.timeout_ms.to_string());
    ctx.output.kv("max_retries", &ctx.config.api.max_retries.to_string());

    ctx.output.info("");
    ctx.output.info("[storage]");
    ctx.output.kv("dir", &ctx.data_dir().display().to_string());

    ctx.output.info("");
    ctx.output.info("[logging]");
    ctx.output.kv("level", ctx.config.logging.level.as_str());
    let format = match ctx.config.logging.format {
        LogFormat::Human => "human",
        LogFormat::Json => "json",
    };
    ctx.output.kv("format", format);
    if let Some(filter) = &ctx.config.logging.filter {
        ctx.output.kv("filter", filter);
    }

    ctx.output.info("");
    ctx.output.info("[checkout]");
    match ctx.config.checkout.order_timeout_ms {
        Some(ms) => ctx.output.kv("order_timeout_ms", &ms.to_string()),
        None => ctx.output.kv("order_timeout_ms", "none"),
    }

    Ok(())
}

fn init_config(base_url: &str, force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join("dawa.toml");

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }
    if url::Url::parse(base_url).is_err() {
        bail!("'{}' is not a valid URL", base_url);
    }

    fs::write(&config_path, generate_default_config(base_url))?;
    ctx.output
        .success(&format!("Created {}", config_path.display()));
    Ok(())
}

/// Advisory findings that do not stop commands from working.
fn config_warnings(config: &CliConfig) -> Vec<String> {
    let mut warnings = Vec::new();
    if let Ok(url) = url::Url::parse(&config.api.base_url) {
        let local = matches!(url.host_str(), Some("localhost" | "127.0.0.1" | "::1"));
        if url.scheme() == "http" && !local {
            warnings.push("api.base_url uses plain HTTP for a remote host".to_string());
        }
    }
    if config.api.max_retries > 5 {
        warnings.push(format!(
            "api.max_retries = {} will make failures slow to surface",
            config.api.max_retries
        ));
    }
    if config.checkout.order_timeout_ms.is_none() {
        warnings.push("checkout.order_timeout_ms is unset; placing an order may wait indefinitely".to_string());
    }
    warnings
}

fn validate_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Validating configuration");

    let errors = ctx.config.validate();
    let warnings = config_warnings(&ctx.config);

    if errors.is_empty() && warnings.is_empty() {
        ctx.output.success("Configuration is valid");
        return Ok(());
    }

    for warning in &warnings {
        ctx.output.warn(warning);
    }
    for error in &errors {
        ctx.output.error(error);
    }

    if !errors.is_empty() {
        bail!("Configuration has {} error(s)", errors.len());
    }

    ctx.output.success("Configuration is valid (with warnings)");
    Ok(())
}
