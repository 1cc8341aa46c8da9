use crate::config_path::{init_target, resolve_config};
use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use fpkit_core::config::{Config, WarnLevel};
use std::path::Path;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show the effective configuration and where it came from
    Show,

    /// Validate the config for common mistakes
    Validate,

    /// Write a config file with default values (never overwrites)
    Init,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(explicit: Option<&Path>, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Show => show(explicit, json),
        ConfigSubcommand::Validate => validate(explicit, json),
        ConfigSubcommand::Init => init(explicit),
    }
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn show(explicit: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let source = resolve_config(explicit);
    let config = super::load_config(explicit)?;

    if json {
        let value = serde_json::json!({
            "source": source.as_ref().map(|p| p.display().to_string()),
            "config": config,
        });
        print_json(&value)?;
        return Ok(());
    }

    match &source {
        Some(p) => println!("Source:            {}", p.display()),
        None => println!("Source:            (built-in defaults)"),
    }
    let retry = &config.runner.retry;
    println!(
        "Failure policy:    {}",
        config.runner.failure_policy.as_str()
    );
    println!(
        "Retry:             {} max, {}ms base, {}ms cap",
        retry.max_retries, retry.base_delay_ms, retry.max_delay_ms
    );
    println!("Projection factor: {}", config.report.projection_factor);
    Ok(())
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

fn validate(explicit: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let config = super::load_config(explicit)?;
    let warnings = config.validate();

    if json {
        let value = serde_json::json!({
            "warnings": warnings,
        });
        print_json(&value)?;
    } else if warnings.is_empty() {
        println!("Config is valid. No warnings.");
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    if warnings.iter().any(|w| w.level == WarnLevel::Error) {
        anyhow::bail!("config validation found errors");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// init
// ---------------------------------------------------------------------------

fn init(explicit: Option<&Path>) -> anyhow::Result<()> {
    let target = init_target(explicit);
    let data = Config::default()
        .to_yaml()
        .context("failed to render default config")?;
    let written = fpkit_core::io::write_if_missing(&target, data.as_bytes())
        .with_context(|| format!("failed to write {}", target.display()))?;
    if written {
        println!("Wrote {}", target.display());
    } else {
        println!("{} already exists; left unchanged.", target.display());
    }
    Ok(())
}
