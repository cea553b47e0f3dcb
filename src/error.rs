use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DowsingError {
    /// setup.py parses but never calls a recognized installer entry point.
    #[error("no recognized installer call found in {0}")]
    NoInstallerCall(String),
    /// `build-system.build-backend` names a backend the dispatcher has no
    /// reader for.
    #[error("unsupported build backend {backend:?} declared in {path}")]
    UnsupportedBackend { backend: String, path: String },
    /// setup.cfg, pyproject.toml, or setup.py failed to parse.
    #[error("failed to parse {path}: {message}")]
    ParseFailure { path: String, message: String },
    /// A required file could not be read.
    #[error("failed to read {path}: {source}")]
    IoFailure {
        path: String,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, DowsingError>;
