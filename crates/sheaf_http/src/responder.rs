//! The per-request compile-or-serve state machine.
//!
//! ```text
//! no cache dir ──────────────► compile ──► 200 (or error)
//! cache dir ─► stale? ─ yes ─► compile ─► write ─► 200 + validators (or error)
//!                     └ no ──► validators match? ─ yes ─► 304
//!                                                 └ no ──► 200 + validators
//! ```

use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{HeaderValue, CONTENT_LENGTH, CONTENT_TYPE, ETAG, LAST_MODIFIED};
use hyper::{Response, StatusCode};
use sheaf_cache::{staleness, Bundle, CacheStore, Fingerprint};
use sheaf_compile::{compile_sources, StylesheetCompiler};

use crate::conditional::{ValidationContext, Validators};
use crate::error::ServeError;

/// `Content-Type` of every response, including errors and 304s.
pub const CONTENT_TYPE_CSS: &str = "text/css";

/// The terminal state of one request.
#[derive(Debug)]
pub enum Outcome {
    /// The bundle was compiled for this request. Validators are present when
    /// the result was also written to the cache.
    Compiled {
        /// Compiled stylesheet.
        body: String,
        /// Validators of the artifact just written, if any.
        validators: Option<Validators>,
    },
    /// The cached artifact was fresh and is sent in full.
    Cached {
        /// Artifact bytes.
        body: Vec<u8>,
        /// Validators of the artifact.
        validators: Validators,
    },
    /// The client's copy is current.
    NotModified {
        /// Validators of the artifact.
        validators: Validators,
    },
    /// Nothing could be served.
    Failed(ServeError),
}

impl Outcome {
    /// The HTTP status this outcome maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            Outcome::Compiled { .. } | Outcome::Cached { .. } => StatusCode::OK,
            Outcome::NotModified { .. } => StatusCode::NOT_MODIFIED,
            Outcome::Failed(e) => e.status(),
        }
    }

    /// Builds the HTTP response. With `head_only` the body is dropped but
    /// headers are kept, including the `Content-Length` a `GET` would carry.
    pub fn into_response(self, head_only: bool) -> Response<Full<Bytes>> {
        let status = self.status();
        let (body, validators) = match self {
            Outcome::Compiled { body, validators } => (Bytes::from(body), validators),
            Outcome::Cached { body, validators } => (Bytes::from(body), Some(validators)),
            Outcome::NotModified { validators } => (Bytes::new(), Some(validators)),
            Outcome::Failed(e) => (Bytes::from(format!("/* {} */\n", e.public_message())), None),
        };

        let length = body.len();
        let body = if head_only { Bytes::new() } else { body };
        let mut response = Response::new(Full::new(body));
        *response.status_mut() = status;

        let headers = response.headers_mut();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_CSS));
        if status != StatusCode::NOT_MODIFIED {
            headers.insert(CONTENT_LENGTH, HeaderValue::from(length));
        }
        if let Some(v) = validators {
            if let Ok(etag) = HeaderValue::from_str(&v.etag) {
                headers.insert(ETAG, etag);
            }
            if let Ok(date) = HeaderValue::from_str(&v.last_modified_header()) {
                headers.insert(LAST_MODIFIED, date);
            }
        }
        response
    }
}

/// Evaluates one request against one bundle.
///
/// Holds no state between requests; the filesystem is the only thing shared
/// between evaluations.
pub struct Responder<'a> {
    bundle: &'a Bundle,
    compiler: &'a dyn StylesheetCompiler,
}

impl<'a> Responder<'a> {
    /// Creates a responder for `bundle`, compiling with `compiler` when needed.
    pub fn new(bundle: &'a Bundle, compiler: &'a dyn StylesheetCompiler) -> Self {
        Self { bundle, compiler }
    }

    /// Runs the state machine for a request carrying `ctx`.
    pub fn respond(&self, ctx: &ValidationContext) -> Outcome {
        let Some(store) = self.bundle.store() else {
            return match compile_sources(self.compiler, self.bundle.sources()) {
                Ok(body) => Outcome::Compiled {
                    body,
                    validators: None,
                },
                Err(e) => Outcome::Failed(e.into()),
            };
        };

        let fingerprint = self.bundle.fingerprint();
        let artifact = store.artifact_path(&fingerprint);
        let state = match staleness::evaluate(
            &artifact,
            self.bundle.sources(),
            self.bundle.watched(),
        ) {
            Ok(state) => state,
            Err(e) => {
                tracing::error!(error = %e, "staleness check failed");
                return Outcome::Failed(e.into());
            }
        };

        if state.is_stale() {
            tracing::info!(
                fingerprint = %fingerprint.hash().short(),
                reason = ?state,
                "recompiling bundle"
            );
            return self.recompile(&store, &fingerprint);
        }

        let cached = match store.read(&fingerprint) {
            Ok(cached) => cached,
            Err(e) => {
                tracing::error!(error = %e, "cache read failed");
                return Outcome::Failed(e.into());
            }
        };
        let validators = Validators::for_artifact(&cached.bytes, cached.modified);

        if ctx.matches(&validators) {
            tracing::debug!(fingerprint = %fingerprint.hash().short(), "not modified");
            Outcome::NotModified { validators }
        } else {
            Outcome::Cached {
                body: cached.bytes,
                validators,
            }
        }
    }

    /// Compiles and persists the bundle. A failed compile leaves the
    /// existing artifact alone.
    fn recompile(&self, store: &CacheStore, fingerprint: &Fingerprint) -> Outcome {
        let body = match compile_sources(self.compiler, self.bundle.sources()) {
            Ok(body) => body,
            Err(e) => return Outcome::Failed(e.into()),
        };

        // The compiled output is still correct if persisting it fails, so
        // serve it without validators and retry the write next request.
        let validators = match store.write(fingerprint, body.as_bytes()) {
            Ok(_) => store
                .modified(fingerprint)
                .map(|mtime| Validators::for_artifact(body.as_bytes(), mtime)),
            Err(e) => {
                tracing::error!(error = %e, "failed to persist compiled bundle");
                None
            }
        };

        Outcome::Compiled { body, validators }
    }
}
