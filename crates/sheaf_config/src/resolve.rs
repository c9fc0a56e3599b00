//! Bundle resolution: merging global and per-bundle settings into a [`Bundle`].

use crate::error::ConfigError;
use crate::types::{BundleConfig, SheafConfig};
use sheaf_cache::Bundle;
use std::path::{Path, PathBuf};

/// Resolves a named bundle into a ready-to-compile [`Bundle`].
///
/// Relative paths are taken relative to `base_dir` (normally the directory
/// holding `sheaf.toml`). Explicit `files` come first, then each of `dirs`
/// is scanned in order. A per-bundle `cache_dir` replaces the global one,
/// and `extra_watched` is appended to the bundle's own `watch` list.
///
/// The source list is rebuilt from disk on every call, so files added to a
/// watched directory are picked up by the next request.
pub fn resolve_bundle(
    config: &SheafConfig,
    name: &str,
    base_dir: &Path,
    extra_watched: &[PathBuf],
) -> Result<Bundle, ConfigError> {
    let bundle = config
        .bundles
        .get(name)
        .ok_or_else(|| ConfigError::UnknownBundle(name.to_string()))?;

    let mut builder = Bundle::builder();
    for file in &bundle.files {
        builder = builder.add(base_dir.join(file));
    }
    for dir in &bundle.dirs {
        builder = builder.add_dir(base_dir.join(dir))?;
    }

    // Bundle override wins, even when it is "" (caching off for this bundle).
    let cache_dir = bundle.cache_dir.as_ref().or(config.cache.dir.as_ref());
    if let Some(dir) = cache_dir.filter(|d| !d.is_empty()) {
        builder = builder.cache_dir(base_dir.join(dir));
    }

    if !bundle.debug {
        builder = builder.hide_debug_info();
    }
    for path in &bundle.watch {
        builder = builder.watch(base_dir.join(path));
    }
    for path in extra_watched {
        builder = builder.watch(path.clone());
    }

    Ok(builder.build())
}

/// Finds the bundle served at `route`.
pub fn bundle_for_route<'a>(
    config: &'a SheafConfig,
    route: &str,
) -> Option<(&'a str, &'a BundleConfig)> {
    config
        .bundles
        .iter()
        .find(|(_, bundle)| bundle.route == route)
        .map(|(name, bundle)| (name.as_str(), bundle))
}
