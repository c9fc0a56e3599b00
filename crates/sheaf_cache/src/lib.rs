//! Source sets, fingerprints, staleness checks and the on-disk artifact store.
//!
//! A [`Bundle`] is an ordered list of stylesheet sources plus the settings that
//! decide where (and whether) its compiled output is cached. The bundle's
//! [`Fingerprint`] names the artifact; [`staleness::evaluate`] compares
//! modification times to decide whether the artifact must be rebuilt; and
//! [`CacheStore`] reads and atomically replaces artifacts.
//!
//! There is no eviction. Every distinct fingerprint leaves one file behind in
//! the cache directory for as long as that directory exists.

#![warn(missing_docs)]

pub mod bundle;
pub mod error;
pub mod fingerprint;
pub mod source_set;
pub mod staleness;
pub mod store;

pub use bundle::{Bundle, BundleBuilder};
pub use error::CacheError;
pub use fingerprint::Fingerprint;
pub use source_set::SourceList;
pub use staleness::{needs_recompile, Staleness};
pub use store::{CacheStore, CachedArtifact};
