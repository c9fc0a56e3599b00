//! Modification-time based staleness checks.
//!
//! Invalidation is coarse: if anything upstream of the artifact changed, the
//! whole bundle is rebuilt. There is no per-file incremental compilation.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::Serialize;

use crate::error::CacheError;
use crate::source_set::SourceList;

/// The outcome of a staleness check, with the first reason found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "path", rename_all = "snake_case")]
pub enum Staleness {
    /// No artifact exists yet.
    MissingArtifact,
    /// A source file is strictly newer than the artifact.
    SourceChanged(PathBuf),
    /// A watched dependency (driver, compiler) is newer than the artifact.
    WatchedChanged(PathBuf),
    /// The artifact is up to date.
    Fresh,
}

impl Staleness {
    /// Returns `true` if the artifact must be rebuilt.
    pub fn is_stale(&self) -> bool {
        !matches!(self, Staleness::Fresh)
    }
}

/// Decides whether the artifact at `artifact` must be rebuilt.
///
/// Checks, in order and stopping at the first hit:
///
/// 1. the artifact does not exist;
/// 2. a source is strictly newer than the artifact;
/// 3. a watched path is newer than the artifact.
///
/// A source or watched path that cannot be stat'ed is an error rather than a
/// "not stale" answer.
pub fn evaluate(
    artifact: &Path,
    sources: &SourceList,
    watched: &[PathBuf],
) -> Result<Staleness, CacheError> {
    let artifact_mtime = match std::fs::metadata(artifact).and_then(|m| m.modified()) {
        Ok(mtime) => mtime,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(Staleness::MissingArtifact)
        }
        Err(e) => {
            return Err(CacheError::Read {
                path: artifact.to_path_buf(),
                source: e,
            })
        }
    };

    for src in sources {
        if modified(src)? > artifact_mtime {
            return Ok(Staleness::SourceChanged(src.clone()));
        }
    }

    for dep in watched {
        if modified(dep)? > artifact_mtime {
            return Ok(Staleness::WatchedChanged(dep.clone()));
        }
    }

    Ok(Staleness::Fresh)
}

/// Returns `true` if the artifact at `artifact` must be rebuilt.
///
/// Shorthand for [`evaluate`] when the reason is not needed.
pub fn needs_recompile(
    artifact: &Path,
    sources: &SourceList,
    watched: &[PathBuf],
) -> Result<bool, CacheError> {
    evaluate(artifact, sources, watched).map(|s| s.is_stale())
}

fn modified(path: &Path) -> Result<SystemTime, CacheError> {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|e| CacheError::MissingSource {
            path: path.to_path_buf(),
            source: e,
        })
}
