use fpkit_core::config::CONFIG_FILE;
use std::path::{Path, PathBuf};

/// Locate the config file to use.
///
/// Priority:
/// 1. `--config` flag / `FPKIT_CONFIG` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for `fpkit.yaml`
/// 3. None: built-in defaults apply
pub fn resolve_config(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = explicit {
        return Some(p.to_path_buf());
    }
    let cwd = std::env::current_dir().ok()?;
    find_upward(&cwd)
}

/// Where `config init` should write when nothing was given explicitly.
pub fn init_target(explicit: Option<&Path>) -> PathBuf {
    match explicit {
        Some(p) => p.to_path_buf(),
        None => PathBuf::from(CONFIG_FILE),
    }
}

fn find_upward(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILE))
        .find(|candidate| candidate.is_file())
}
