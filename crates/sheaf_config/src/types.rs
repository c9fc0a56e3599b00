//! Configuration types deserialized from `sheaf.toml`.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

/// Default listen address for `sheaf serve`.
pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

/// The top-level configuration parsed from `sheaf.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct SheafConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Global cache settings, shared by every bundle unless overridden.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Compiler backend settings.
    #[serde(default)]
    pub compiler: CompilerConfig,
    /// Named stylesheet bundles (e.g., "main", "admin").
    #[serde(default)]
    pub bundles: BTreeMap<String, BundleConfig>,
}

/// Settings for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Upper bound on a single compile, in milliseconds. No limit if absent.
    #[serde(default)]
    pub compile_timeout_ms: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            compile_timeout_ms: None,
        }
    }
}

fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

/// Global cache settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheConfig {
    /// Directory holding compiled artifacts. Absent or empty disables caching.
    #[serde(default)]
    pub dir: Option<String>,
}

/// Which compiler turns a concatenated bundle into CSS.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompilerBackend {
    /// An external `lessc`-compatible program fed on stdin.
    #[default]
    Lessc,
    /// In-process `lightningcss`. Plain CSS only.
    Lightningcss,
}

/// Compiler backend settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompilerConfig {
    /// Backend to compile with.
    #[serde(default)]
    pub backend: CompilerBackend,
    /// Program run by the `lessc` backend. Defaults to `lessc` on `PATH`.
    #[serde(default)]
    pub command: Option<String>,
    /// Arguments for `command`. Defaults to `["-"]` (read stdin).
    #[serde(default)]
    pub args: Option<Vec<String>>,
    /// Strip whitespace from compiled output. Only the `lightningcss`
    /// backend honours it; pass the flag in `args` for an external compiler.
    #[serde(default)]
    pub minify: bool,
}

/// One bundle: an ordered source set served at a single route.
#[derive(Debug, Clone, Deserialize)]
pub struct BundleConfig {
    /// Request path the bundle is served at (e.g., "/css/main.css").
    #[serde(default)]
    pub route: String,
    /// Source files, added first and in the order listed.
    #[serde(default, deserialize_with = "deserialize_string_or_vec")]
    pub files: Vec<String>,
    /// Directories scanned for `.css`/`.less` files, after `files`.
    #[serde(default, deserialize_with = "deserialize_string_or_vec")]
    pub dirs: Vec<String>,
    /// Debug flag. Only affects the bundle fingerprint.
    #[serde(default = "default_debug")]
    pub debug: bool,
    /// Per-bundle cache directory, overriding `[cache].dir`. An empty string
    /// disables caching for this bundle alone.
    #[serde(default)]
    pub cache_dir: Option<String>,
    /// Extra files whose modification invalidates this bundle's artifact.
    #[serde(default, deserialize_with = "deserialize_string_or_vec")]
    pub watch: Vec<String>,
}

fn default_debug() -> bool {
    true
}

/// Deserializes a field that can be either a single string or a list of strings.
///
/// Allows `files = "main.less"` as shorthand for `files = ["main.less"]`.
fn deserialize_string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(vec![v.to_string()])
        }

        fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut vec = Vec::new();
            while let Some(val) = seq.next_element::<String>()? {
                vec.push(val);
            }
            Ok(vec)
        }
    }

    deserializer.deserialize_any(StringOrVec)
}
