//! On-disk artifact store keyed by fingerprint.
//!
//! Each bundle's compiled output lives at `<cache_dir>/<fingerprint>.css`.
//! Writes go to a temporary file in the same directory which is then renamed
//! over the artifact, so a concurrent reader sees either the old file or the
//! new one and never a partial write. Two writers racing on the same
//! fingerprint both produce the same bytes; the last rename wins.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::CacheError;
use crate::fingerprint::Fingerprint;

/// A compiled artifact read back from the store.
#[derive(Debug, Clone)]
pub struct CachedArtifact {
    /// The compiled stylesheet bytes.
    pub bytes: Vec<u8>,
    /// The artifact's modification time.
    pub modified: SystemTime,
}

/// Reads and writes compiled artifacts in a single cache directory.
#[derive(Debug, Clone)]
pub struct CacheStore {
    cache_dir: PathBuf,
}

impl CacheStore {
    /// Creates a store rooted at `cache_dir`. The directory is created on
    /// first write.
    pub fn new(cache_dir: &Path) -> Self {
        Self {
            cache_dir: cache_dir.to_path_buf(),
        }
    }

    /// Returns the cache directory.
    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Returns the artifact path for `fingerprint`.
    pub fn artifact_path(&self, fingerprint: &Fingerprint) -> PathBuf {
        self.cache_dir.join(fingerprint.artifact_file_name())
    }

    /// Persists `content` as the artifact for `fingerprint`.
    ///
    /// Returns the artifact path. On failure the previous artifact, if any,
    /// is left untouched.
    pub fn write(&self, fingerprint: &Fingerprint, content: &[u8]) -> Result<PathBuf, CacheError> {
        let dir_err = |source| CacheError::Write {
            path: self.cache_dir.clone(),
            source,
        };
        std::fs::create_dir_all(&self.cache_dir).map_err(dir_err)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&self.cache_dir).map_err(dir_err)?;
        let path = self.artifact_path(fingerprint);
        tmp.write_all(content)
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|source| CacheError::Write {
                path: tmp.path().to_path_buf(),
                source,
            })?;
        tmp.persist(&path).map_err(|e| CacheError::Write {
            path: path.clone(),
            source: e.error,
        })?;

        tracing::debug!(
            fingerprint = %fingerprint.hash().short(),
            bytes = content.len(),
            path = %path.display(),
            "wrote cache artifact"
        );
        Ok(path)
    }

    /// Reads the artifact for `fingerprint` together with its modification time.
    pub fn read(&self, fingerprint: &Fingerprint) -> Result<CachedArtifact, CacheError> {
        let path = self.artifact_path(fingerprint);
        let read_err = |source| CacheError::Read {
            path: path.clone(),
            source,
        };
        let bytes = std::fs::read(&path).map_err(read_err)?;
        let modified = std::fs::metadata(&path)
            .and_then(|m| m.modified())
            .map_err(read_err)?;
        Ok(CachedArtifact { bytes, modified })
    }

    /// Returns the artifact's modification time, or `None` if it does not exist.
    pub fn modified(&self, fingerprint: &Fingerprint) -> Option<SystemTime> {
        std::fs::metadata(self.artifact_path(fingerprint))
            .and_then(|m| m.modified())
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_set::SourceList;

    fn fingerprint(name: &str) -> Fingerprint {
        let mut sources = SourceList::new();
        sources.add(name);
        Fingerprint::compute(&sources, true)
    }

    #[test]
    fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        let fp = fingerprint("main.less");

        let path = store.write(&fp, b"a{color:red}").unwrap();
        assert_eq!(path, dir.path().join(fp.artifact_file_name()));

        let artifact = store.read(&fp).unwrap();
        assert_eq!(artifact.bytes, b"a{color:red}");
        assert_eq!(store.modified(&fp), Some(artifact.modified));
    }

    #[test]
    fn write_creates_cache_dir() {
        let dir = tempfile::tempdir().unwrap();
        let cache_dir = dir.path().join("nested").join("css-cache");
        let store = CacheStore::new(&cache_dir);
        store.write(&fingerprint("a.less"), b"x").unwrap();
        assert!(cache_dir.is_dir());
    }

    #[test]
    fn overwrite_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        let fp = fingerprint("main.less");
        store.write(&fp, b"old").unwrap();
        store.write(&fp, b"new").unwrap();
        assert_eq!(store.read(&fp).unwrap().bytes, b"new");
    }

    #[test]
    fn write_leaves_no_temporary_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        store.write(&fingerprint("a.less"), b"a").unwrap();
        store.write(&fingerprint("b.less"), b"b").unwrap();
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names.iter().all(|n| n.ends_with(".css")));
    }

    #[test]
    fn concurrent_writers_never_expose_partial_artifact() {
        use std::sync::atomic::{AtomicBool, Ordering};

        const SIZE: usize = 1 << 20;
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        let fp = fingerprint("main.less");
        store.write(&fp, &vec![b'0'; SIZE]).unwrap();

        let done = AtomicBool::new(false);
        std::thread::scope(|s| {
            let reader = s.spawn(|| {
                let mut reads = 0;
                while !done.load(Ordering::SeqCst) || reads == 0 {
                    let bytes = store.read(&fp).unwrap().bytes;
                    assert_eq!(bytes.len(), SIZE);
                    assert!(bytes.iter().all(|b| *b == bytes[0]));
                    reads += 1;
                }
            });

            let writers: Vec<_> = (b'a'..=b'f')
                .map(|fill| {
                    let store = &store;
                    let fp = &fp;
                    s.spawn(move || {
                        for _ in 0..4 {
                            store.write(fp, &vec![fill; SIZE]).unwrap();
                        }
                    })
                })
                .collect();
            for writer in writers {
                writer.join().unwrap();
            }
            done.store(true, Ordering::SeqCst);
            reader.join().unwrap();
        });

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, [fp.artifact_file_name()]);

        let last = store.read(&fp).unwrap().bytes;
        assert_eq!(last.len(), SIZE);
        assert!((b'a'..=b'f').contains(&last[0]));
        assert!(last.iter().all(|b| *b == last[0]));
    }

    #[test]
    fn read_missing_artifact_errors() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        let err = store.read(&fingerprint("main.less")).unwrap_err();
        assert!(matches!(err, CacheError::Read { .. }));
        assert!(store.modified(&fingerprint("main.less")).is_none());
    }

    #[test]
    fn write_into_file_path_errors() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "x").unwrap();
        let store = CacheStore::new(&blocker);
        let err = store.write(&fingerprint("main.less"), b"x").unwrap_err();
        assert!(matches!(err, CacheError::Write { .. }));
    }
}
