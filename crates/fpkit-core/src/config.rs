use crate::error::{FpkitError, Result};
use crate::report::{check_factor, DEFAULT_PROJECTION_FACTOR};
use crate::scheduler::{FailurePolicy, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const CONFIG_FILE: &str = "fpkit.yaml";

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// RetryConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default)]
    pub max_retries: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

fn default_base_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    5000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_retries,
            Duration::from_millis(self.base_delay_ms),
            Duration::from_millis(self.max_delay_ms),
        )
    }
}

// ---------------------------------------------------------------------------
// RunnerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunnerConfig {
    #[serde(default)]
    pub failure_policy: FailurePolicy,
    #[serde(default)]
    pub retry: RetryConfig,
}

// ---------------------------------------------------------------------------
// ReportConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_projection_factor")]
    pub projection_factor: f64,
}

fn default_projection_factor() -> f64 {
    DEFAULT_PROJECTION_FACTOR
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            projection_factor: default_projection_factor(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub runner: RunnerConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(FpkitError::ConfigNotFound(path.to_path_buf()));
        }
        let data = std::fs::read_to_string(path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    /// Load `path` if given, otherwise fall back to the built-in defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let data = self.to_yaml()?;
        crate::io::atomic_write(path, data.as_bytes())
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if let Err(e) = check_factor(self.report.projection_factor) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!("report.projection_factor: {e}"),
            });
        }

        let retry = &self.runner.retry;
        if retry.max_retries > 10 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "runner.retry.max_retries={} (>10 is unusual)",
                    retry.max_retries
                ),
            });
        }
        if retry.base_delay_ms > retry.max_delay_ms {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "runner.retry.base_delay_ms={} exceeds max_delay_ms={}; every back-off will be capped",
                    retry.base_delay_ms, retry.max_delay_ms
                ),
            });
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn empty_file_uses_defaults() {
        let cfg: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.runner.failure_policy, FailurePolicy::Halt);
        assert_eq!(cfg.runner.retry.max_retries, 0);
        assert_eq!(cfg.report.projection_factor, 1.10);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let yaml = "runner:\n  failure_policy: continue\n  retry:\n    max_retries: 3\n";
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.runner.failure_policy, FailurePolicy::Continue);
        assert_eq!(cfg.runner.retry.max_retries, 3);
        assert_eq!(cfg.runner.retry.base_delay_ms, 500);
        assert_eq!(
            cfg.runner.retry.policy().backoff(1),
            Some(Duration::from_millis(1000))
        );
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let mut cfg = Config::default();
        cfg.report.projection_factor = 1.25;
        cfg.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.report.projection_factor, 1.25);
    }

    #[test]
    fn missing_file_is_config_not_found() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, FpkitError::ConfigNotFound(_)));
        assert_eq!(Config::load_or_default(None).unwrap(), Config::default());
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "runner: [not, a, map]\n").unwrap();
        assert!(matches!(Config::load(&path), Err(FpkitError::Yaml(_))));
    }

    #[test]
    fn validate_default_has_no_warnings() {
        assert!(Config::default().validate().is_empty());
    }

    #[test]
    fn validate_flags_bad_factor_as_error() {
        let mut cfg = Config::default();
        cfg.report.projection_factor = 0.0;
        let warnings = cfg.validate();
        assert!(warnings
            .iter()
            .any(|w| w.level == WarnLevel::Error && w.message.contains("projection_factor")));
    }

    #[test]
    fn validate_flags_retry_oddities() {
        let mut cfg = Config::default();
        cfg.runner.retry.max_retries = 15;
        cfg.runner.retry.base_delay_ms = 10_000;
        let warnings = cfg.validate();
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("max_retries=15") && w.message.contains(">10 is unusual")));
        assert!(warnings.iter().any(|w| w.message.contains("capped")));
        assert!(warnings.iter().all(|w| w.level == WarnLevel::Warning));
    }
}
