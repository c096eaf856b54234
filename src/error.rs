// Error types shared across the playback flow
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("permission denied for {0}")]
    PermissionDenied(String),
    #[error("selection cancelled")]
    SelectionCancelled,
    #[error("failed to prepare source: {0}")]
    SourcePrepare(String),
    #[error("playback failed: {0}")]
    SourcePlayback(String),
    #[error("unsupported content reference: {0}")]
    UnsupportedSource(String),
    #[error("audio output error: {0}")]
    Output(String),
}

impl MediaError {
    /// Wrap an engine-internal error chain as a prepare failure
    pub fn prepare(err: anyhow::Error) -> Self {
        MediaError::SourcePrepare(format!("{:#}", err))
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write settings file {path:?}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
}
