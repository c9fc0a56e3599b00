//! Parsing and validation of `sheaf.toml` configuration files.
//!
//! This crate reads the configuration file into a strongly-typed
//! [`SheafConfig`] and resolves each named bundle into a
//! [`Bundle`](sheaf_cache::Bundle) ready to compile.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{find_config, load_config, load_config_from_str, CONFIG_FILE_NAME};
pub use resolve::{bundle_for_route, resolve_bundle};
pub use types::*;
