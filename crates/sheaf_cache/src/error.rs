//! Error types for source discovery and cache operations.

use std::path::PathBuf;

/// Errors raised while gathering sources, checking staleness, or touching
/// the artifact store.
///
/// None of these are swallowed. A source that cannot be stat'ed must not be
/// mistaken for an unchanged one, since compiling an incomplete bundle would
/// poison the cache.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// A source file (or watched dependency) could not be stat'ed.
    #[error("missing source file {path}: {source}")]
    MissingSource {
        /// The path that could not be stat'ed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A source directory could not be listed.
    #[error("failed to read source directory {path}: {source}")]
    DirectoryRead {
        /// The directory being scanned.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A cached artifact exists but could not be read back.
    #[error("failed to read cache artifact {path}: {source}")]
    Read {
        /// The artifact path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A compiled artifact could not be persisted.
    #[error("failed to write cache artifact {path}: {source}")]
    Write {
        /// The artifact (or cache directory) path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}
