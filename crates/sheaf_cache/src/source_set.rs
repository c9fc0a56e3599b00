//! Ordered source file lists.
//!
//! Insertion order is significant: it is the concatenation order handed to
//! the compiler, and it feeds the bundle fingerprint.

use std::path::{Path, PathBuf};

use crate::error::CacheError;

/// File extensions picked up by [`SourceList::add_dir`].
pub const ALLOWED_EXTENSIONS: &[&str] = &["css", "less"];

/// Name prefix of editor/OS backup files skipped by [`SourceList::add_dir`].
pub const BACKUP_PREFIX: &str = "._";

/// An ordered sequence of stylesheet source paths.
///
/// Duplicates are permitted; they are compiled twice and change the
/// fingerprint like any other entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceList {
    paths: Vec<PathBuf>,
}

impl SourceList {
    /// Creates an empty source list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a single source path.
    pub fn add(&mut self, path: impl Into<PathBuf>) {
        self.paths.push(path.into());
    }

    /// Appends every stylesheet directly inside `dir`.
    ///
    /// Not recursive. Entries that are not regular files, whose name starts
    /// with [`BACKUP_PREFIX`], or whose extension is not in
    /// [`ALLOWED_EXTENSIONS`] are skipped. The remainder are appended in the
    /// order the directory listing yields them.
    pub fn add_dir(&mut self, dir: &Path) -> Result<(), CacheError> {
        let read_err = |source| CacheError::DirectoryRead {
            path: dir.to_path_buf(),
            source,
        };

        for entry in std::fs::read_dir(dir).map_err(read_err)? {
            let entry = entry.map_err(read_err)?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if is_stylesheet(&path) {
                self.add(path);
            }
        }
        Ok(())
    }

    /// Returns the paths in insertion order.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Iterates over the paths in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, PathBuf> {
        self.paths.iter()
    }

    /// Returns the number of entries, duplicates included.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Returns `true` if no sources have been added.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl From<Vec<PathBuf>> for SourceList {
    fn from(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }
}

impl<'a> IntoIterator for &'a SourceList {
    type Item = &'a PathBuf;
    type IntoIter = std::slice::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.iter()
    }
}

/// Returns `true` if a directory entry should be picked up by `add_dir`.
///
/// Compares raw name bytes, so names that are not valid UTF-8 are still
/// filtered on their prefix and extension rather than dropped.
fn is_stylesheet(path: &Path) -> bool {
    let Some(name) = path.file_name() else {
        return false;
    };
    if name.as_encoded_bytes().starts_with(BACKUP_PREFIX.as_bytes()) {
        return false;
    }
    path.extension().is_some_and(|ext| {
        ALLOWED_EXTENSIONS
            .iter()
            .any(|allowed| ext.as_encoded_bytes() == allowed.as_bytes())
    })
}
