use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FpkitError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("action #{position}{} failed: {reason}", label_suffix(.label))]
    ActionFailed {
        position: usize,
        label: Option<String>,
        reason: String,
    },

    #[error("queue is already draining")]
    AlreadyRunning,

    #[error("config file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn label_suffix(label: &Option<String>) -> String {
    label
        .as_deref()
        .map(|l| format!(" ({l})"))
        .unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, FpkitError>;
