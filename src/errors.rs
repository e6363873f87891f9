use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("config {path} line {line}: {message}")]
    ConfigParse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("config {path} is missing required key '{key}'")]
    ConfigMissingKey { path: PathBuf, key: &'static str },

    #[error("failed to read request file {path}: {source}")]
    RequestRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("request file {path} line {line}: {message}")]
    RequestParse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("request file {path}: securityPicIndex {index} outside pool 1..={pool_size}")]
    RequestOutOfRange {
        path: PathBuf,
        index: u32,
        pool_size: u32,
    },

    #[error("index store {path} is corrupt: {message}")]
    StoreCorrupt { path: PathBuf, message: String },

    #[error("failed to read index store {path}: {source}")]
    StoreRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write index store {path}: {source}")]
    StoreWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("prompt I/O failed: {0}")]
    Prompt(#[source] io::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl AppError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            AppError::ConfigRead { .. }
            | AppError::ConfigParse { .. }
            | AppError::ConfigMissingKey { .. }
            | AppError::RequestRead { .. }
            | AppError::RequestParse { .. }
            | AppError::RequestOutOfRange { .. } => ExitCode::from(2),
            AppError::StoreCorrupt { .. } => ExitCode::from(3),
            AppError::StoreRead { .. } | AppError::StoreWrite { .. } => ExitCode::from(4),
            _ => ExitCode::from(1),
        }
    }

    pub fn human_message(&self) -> String {
        self.to_string()
    }
}

pub type AppResult<T> = Result<T, AppError>;
