use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors raised while configuring or emitting a bootstrap artifact.
///
/// Every variant is fatal for the emission in progress; nothing is retried and
/// no artifact is left behind.
#[derive(Debug, Error)]
pub enum WriterError {
    /// `emit` was called before a required setter.
    #[error("missing configuration: `{field}` must be set before emitting")]
    MissingConfiguration { field: &'static str },

    /// A path was resolved before the root directory was configured.
    #[error("root directory is not set")]
    RootNotSet,

    /// A file canonicalizes to a location outside the project root.
    #[error("{} is outside of the root directory {}", path.display(), root.display())]
    PathOutsideRoot { path: PathBuf, root: PathBuf },

    /// Canonicalization or write failure, with the offending path.
    #[error("filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Generated source is text; paths must be representable as UTF-8.
    #[error("path is not valid UTF-8: {}", path.display())]
    NonUtf8Path { path: PathBuf },

    #[error("'{name}' is not a valid fully-qualified class name")]
    InvalidFailureHandler { name: String },

    #[error("invalid manifest {}: {message}", path.display())]
    Manifest { path: PathBuf, message: String },
}

impl WriterError {
    pub(crate) fn filesystem(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = WriterError> = std::result::Result<T, E>;
