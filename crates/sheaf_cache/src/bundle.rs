//! Stylesheet bundles and their fluent builder.

use std::path::{Path, PathBuf};

use crate::error::CacheError;
use crate::fingerprint::Fingerprint;
use crate::source_set::SourceList;
use crate::staleness::{self, Staleness};
use crate::store::CacheStore;

/// An immutable compile request: what to compile and where to cache it.
///
/// Built once per request through [`BundleBuilder`] and never mutated
/// afterwards, so the fingerprint computed from it stays valid for the
/// lifetime of the value.
#[derive(Debug, Clone)]
pub struct Bundle {
    sources: SourceList,
    debug: bool,
    cache_dir: Option<PathBuf>,
    watched: Vec<PathBuf>,
}

impl Bundle {
    /// Starts building a bundle with debug info on and caching disabled.
    pub fn builder() -> BundleBuilder {
        BundleBuilder::default()
    }

    /// The ordered source list.
    pub fn sources(&self) -> &SourceList {
        &self.sources
    }

    /// Whether debug info is enabled. Only affects the fingerprint.
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// The cache directory, or `None` when caching is disabled.
    pub fn cache_dir(&self) -> Option<&Path> {
        self.cache_dir.as_deref()
    }

    /// Extra files whose modification invalidates the cached artifact, such
    /// as the driver program or the compiler binary.
    pub fn watched(&self) -> &[PathBuf] {
        &self.watched
    }

    /// Computes this bundle's fingerprint.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::compute(&self.sources, self.debug)
    }

    /// Returns the artifact store, or `None` when caching is disabled.
    pub fn store(&self) -> Option<CacheStore> {
        self.cache_dir.as_deref().map(CacheStore::new)
    }

    /// Returns the artifact path, or `None` when caching is disabled.
    pub fn artifact_path(&self) -> Option<PathBuf> {
        self.store()
            .map(|store| store.artifact_path(&self.fingerprint()))
    }

    /// Evaluates whether the cached artifact is stale.
    ///
    /// With caching disabled there is no artifact, so the answer is always
    /// [`Staleness::MissingArtifact`].
    pub fn staleness(&self) -> Result<Staleness, CacheError> {
        match self.artifact_path() {
            Some(artifact) => staleness::evaluate(&artifact, &self.sources, &self.watched),
            None => Ok(Staleness::MissingArtifact),
        }
    }
}

/// Fluent builder for [`Bundle`].
///
/// ```
/// use sheaf_cache::Bundle;
///
/// let bundle = Bundle::builder()
///     .add("main.less")
///     .cache_dir("/tmp/css-cache")
///     .hide_debug_info()
///     .build();
/// assert_eq!(bundle.sources().len(), 1);
/// assert!(!bundle.debug());
/// ```
#[derive(Debug, Clone)]
pub struct BundleBuilder {
    sources: SourceList,
    debug: bool,
    cache_dir: Option<PathBuf>,
    watched: Vec<PathBuf>,
}

impl Default for BundleBuilder {
    fn default() -> Self {
        Self {
            sources: SourceList::new(),
            debug: true,
            cache_dir: None,
            watched: Vec::new(),
        }
    }
}

impl BundleBuilder {
    /// Appends a source file. Files are concatenated in the order added.
    pub fn add(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.add(path);
        self
    }

    /// Appends the stylesheets found directly inside `dir`.
    ///
    /// See [`SourceList::add_dir`] for the filtering rules.
    pub fn add_dir(mut self, dir: impl AsRef<Path>) -> Result<Self, CacheError> {
        self.sources.add_dir(dir.as_ref())?;
        Ok(self)
    }

    /// Sets the cache directory. An empty path disables caching, in which
    /// case every request pays the full compile cost.
    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        self.cache_dir = if dir.as_os_str().is_empty() {
            None
        } else {
            Some(dir)
        };
        self
    }

    /// Turns off debug info.
    pub fn hide_debug_info(mut self) -> Self {
        self.debug = false;
        self
    }

    /// Adds a file whose modification invalidates the cached artifact.
    pub fn watch(mut self, path: impl Into<PathBuf>) -> Self {
        self.watched.push(path.into());
        self
    }

    /// Finishes the bundle.
    pub fn build(self) -> Bundle {
        Bundle {
            sources: self.sources,
            debug: self.debug,
            cache_dir: self.cache_dir,
            watched: self.watched,
        }
    }
}
