//! Bundle fingerprints used to name cache artifacts.

use std::fmt;

use serde::Serialize;
use sheaf_common::ContentHash;

use crate::source_set::SourceList;

/// Terminates every source path in the hashed input. No path can contain it.
const PATH_TERMINATOR: u8 = 0;

/// A deterministic identifier for an ordered source list and debug flag.
///
/// Reordering, adding or removing a source, or flipping the debug flag all
/// yield a different fingerprint. Nothing time-dependent goes in, so two
/// requests for the same bundle always land on the same artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Fingerprint(ContentHash);

impl Fingerprint {
    /// Computes the fingerprint of `sources` with the given debug flag.
    ///
    /// Hashes the raw bytes of each path followed by a NUL, then `-` and `1`
    /// when debug info is on.
    pub fn compute(sources: &SourceList, debug: bool) -> Self {
        let mut input = Vec::new();
        for path in sources {
            input.extend_from_slice(path.as_os_str().as_encoded_bytes());
            input.push(PATH_TERMINATOR);
        }
        input.push(b'-');
        if debug {
            input.push(b'1');
        }
        Self(ContentHash::from_bytes(&input))
    }

    /// Returns the underlying content hash.
    pub fn hash(&self) -> ContentHash {
        self.0
    }

    /// Returns the artifact file name, `<fingerprint>.css`.
    pub fn artifact_file_name(&self) -> String {
        format!("{}.css", self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
