//! Shared foundational types used across the sheaf crates.
//!
//! Currently this is the content hash used both to name cache artifacts and
//! to derive HTTP entity tags.

#![warn(missing_docs)]

pub mod hash;

pub use hash::ContentHash;
