//! Errors raised while reading, writing or applying a patch file.

use std::path::PathBuf;
use thiserror::Error;

use flowgraph_core::RouteError;

/// Everything that can go wrong between a patch file on disk and a router.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The patch file could not be read.
    #[error("cannot read patch '{path}': {source}")]
    ReadFile {
        /// Patch path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The patch file could not be written.
    #[error("cannot write patch '{path}': {source}")]
    WriteFile {
        /// Patch path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The directory that should hold a saved patch could not be created.
    #[error("cannot create patch directory '{path}': {source}")]
    CreateDir {
        /// Directory path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The patch text is not a well-formed patch.
    #[error("malformed patch: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// The patch could not be encoded as TOML.
    #[error("cannot encode patch: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// The patch parsed but names something the router can never match.
    #[error("invalid patch: {0}")]
    Validation(#[from] crate::validation::ValidationError),

    /// The router refused a table or always-on entry.
    #[error("routing failed: {0}")]
    Route(#[from] RouteError),
}

impl ConfigError {
    /// Wraps a read failure for the patch at `path`.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Wraps a write failure for the patch at `path`.
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::WriteFile {
            path: path.into(),
            source,
        }
    }

    /// Wraps a failure to create the directory `path`.
    pub fn create_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::CreateDir {
            path: path.into(),
            source,
        }
    }
}
