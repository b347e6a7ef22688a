// src/error.rs

use std::io;
use std::path::PathBuf;

/// Errors surfaced to callers of the public API.
///
/// Only archive acquisition aborts a load; everything that goes wrong for a
/// single file or language is degraded and logged instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to clone {url}: {source}")]
    RepoClone {
        url: String,
        #[source]
        source: git2::Error,
    },

    #[error("failed to create a directory for the clone: {0}")]
    CloneDirectory(#[source] io::Error),

    #[error("invalid sample programs repo at {}: {reason}", path.display())]
    InvalidRepo { path: PathBuf, reason: String },

    #[error("no language named {0:?}")]
    LanguageNotFound(String),

    #[error("no project named {0:?}")]
    ProjectNotFound(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Failure to read one of the YAML files that sit next to the programs.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed YAML in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}
