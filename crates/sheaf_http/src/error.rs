//! Error types for serving bundles.

use std::time::Duration;

use hyper::StatusCode;
use sheaf_cache::CacheError;
use sheaf_compile::CompileError;
use sheaf_config::ConfigError;

/// Everything that can stop a bundle from being served.
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    /// The bundle could not be resolved from configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A staleness check or cache read failed.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// The bundle failed to compile.
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// Evaluating the request took longer than the configured limit.
    #[error("compile did not finish within {0:?}")]
    Timeout(Duration),

    /// The worker thread evaluating the request panicked or was cancelled.
    #[error("compile task failed: {0}")]
    Join(String),
}

impl ServeError {
    /// The HTTP status reported to the client.
    pub fn status(&self) -> StatusCode {
        match self {
            ServeError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// A short description safe to show to clients; no paths or compiler output.
    pub fn public_message(&self) -> &'static str {
        match self {
            ServeError::Config(_) => "stylesheet bundle is misconfigured",
            ServeError::Cache(CacheError::MissingSource { .. }) => "stylesheet source is missing",
            ServeError::Cache(_) => "stylesheet cache is unavailable",
            ServeError::Compile(CompileError::Backend { .. }) => "stylesheet compilation failed",
            ServeError::Compile(_) => "stylesheet source is missing",
            ServeError::Timeout(_) => "stylesheet compilation timed out",
            ServeError::Join(_) => "stylesheet compilation failed",
        }
    }
}
