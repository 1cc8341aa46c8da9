pub mod config;
pub mod report;
pub mod schedule;

use anyhow::Context;
use fpkit_core::config::Config;
use std::path::Path;

/// Resolve and load the config, falling back to defaults when none exists.
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<Config> {
    let path = crate::config_path::resolve_config(explicit);
    if let Some(p) = &path {
        tracing::debug!(path = %p.display(), "loading config");
    }
    Config::load_or_default(path.as_deref()).context("failed to load config")
}
