//! Error types for the compiler adapter.

use std::path::PathBuf;

/// Errors produced while compiling a bundle.
///
/// A failed compile means "no artifact": callers must not cache anything and
/// must leave an existing artifact in place.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// The bundle has no sources.
    #[error("no source files to compile")]
    EmptySourceList,

    /// A source file could not be read.
    #[error("missing source file {path}: {source}")]
    MissingSource {
        /// The unreadable source path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The external compiler rejected the input.
    #[error("{compiler} failed: {reason}")]
    Backend {
        /// Name of the compiler that failed.
        compiler: String,
        /// The compiler's error message.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_source_list_display() {
        assert_eq!(
            CompileError::EmptySourceList.to_string(),
            "no source files to compile"
        );
    }

    #[test]
    fn missing_source_display() {
        let err = CompileError::MissingSource {
            path: PathBuf::from("less/site.less"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("missing source file less/site.less"));
        assert!(msg.contains("gone"));
    }

    #[test]
    fn backend_display() {
        let err = CompileError::Backend {
            compiler: "lightningcss".to_string(),
            reason: "Unexpected end of input".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "lightningcss failed: Unexpected end of input"
        );
    }
}
