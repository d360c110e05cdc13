use std::path::PathBuf;
use thiserror::Error;

/// Every fault the program can report. The `Display` text is the exact line
/// written to stderr.
#[derive(Error, Debug)]
pub(crate) enum SyncError {
    #[error("Launch parameters error{}", detail(.0))]
    LaunchParameters(Option<String>),

    #[error("Launch parameters error: Invalid path specified {}", .0.display())]
    InvalidPath(PathBuf),

    #[error("The specified album does not exist. {reason}")]
    AlbumNotFound { album: String, reason: String },

    #[error("Error: {0}")]
    Store(String),

    #[error("Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("{0}")]
    Init(String),
}

fn detail(usage: &Option<String>) -> String {
    usage.as_ref().map(|m| format!(": {}", m)).unwrap_or_default()
}

impl SyncError {
    pub(crate) fn usage(usage: &str) -> Self {
        SyncError::LaunchParameters(Some(usage.to_owned()))
    }
}
