//! HTTP/1.1 server mapping request paths to configured bundles.

use std::convert::Infallible;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{HeaderValue, ALLOW};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use sheaf_compile::StylesheetCompiler;
use sheaf_config::{bundle_for_route, resolve_bundle, SheafConfig};
use tokio::net::TcpListener;

use crate::conditional::ValidationContext;
use crate::error::ServeError;
use crate::responder::{Outcome, Responder};

/// Shared, read-only server state.
///
/// Holds configuration only. Bundles are resolved afresh for every request
/// and nothing compiled is kept in memory.
pub struct ServerState {
    config: SheafConfig,
    base_dir: PathBuf,
    watched: Vec<PathBuf>,
    compiler: Arc<dyn StylesheetCompiler>,
    compile_timeout: Option<Duration>,
}

impl ServerState {
    /// Creates server state. Relative paths in `config` resolve against
    /// `base_dir`; the compile timeout comes from `[server]`.
    pub fn new(
        config: SheafConfig,
        base_dir: PathBuf,
        compiler: Arc<dyn StylesheetCompiler>,
    ) -> Self {
        let compile_timeout = config.server.compile_timeout_ms.map(Duration::from_millis);
        Self {
            config,
            base_dir,
            watched: Vec::new(),
            compiler,
            compile_timeout,
        }
    }

    /// Sets paths watched by every bundle, such as the running executable
    /// and the configuration file.
    pub fn with_watched(mut self, watched: Vec<PathBuf>) -> Self {
        self.watched = watched;
        self
    }

    /// Overrides the compile timeout.
    pub fn with_compile_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.compile_timeout = timeout;
        self
    }

    /// Returns the loaded configuration.
    pub fn config(&self) -> &SheafConfig {
        &self.config
    }

    /// Resolves bundle `name` and runs the responder. Blocking.
    pub fn respond(&self, name: &str, ctx: &ValidationContext) -> Outcome {
        match resolve_bundle(&self.config, name, &self.base_dir, &self.watched) {
            Ok(bundle) => Responder::new(&bundle, self.compiler.as_ref()).respond(ctx),
            Err(e) => {
                tracing::error!(bundle = name, error = %e, "failed to resolve bundle");
                Outcome::Failed(e.into())
            }
        }
    }
}

/// Handles a single request.
///
/// Only `GET` and `HEAD` are accepted. The responder runs on the blocking
/// pool since it does synchronous file I/O and compilation.
pub async fn handle<B>(state: Arc<ServerState>, req: Request<B>) -> Response<Full<Bytes>> {
    let head_only = req.method() == Method::HEAD;
    if req.method() != Method::GET && !head_only {
        let mut response = status_only(StatusCode::METHOD_NOT_ALLOWED);
        response
            .headers_mut()
            .insert(ALLOW, HeaderValue::from_static("GET, HEAD"));
        return response;
    }

    let Some((name, _)) = bundle_for_route(&state.config, req.uri().path()) else {
        return status_only(StatusCode::NOT_FOUND);
    };
    let name = name.to_string();
    let ctx = ValidationContext::from_headers(req.headers());

    let worker = Arc::clone(&state);
    let task = tokio::task::spawn_blocking(move || worker.respond(&name, &ctx));
    let joined = match state.compile_timeout {
        Some(limit) => match tokio::time::timeout(limit, task).await {
            Ok(joined) => joined,
            Err(_) => {
                tracing::warn!(path = req.uri().path(), ?limit, "compile timed out");
                return Outcome::Failed(ServeError::Timeout(limit)).into_response(head_only);
            }
        },
        None => task.await,
    };

    let outcome = joined.unwrap_or_else(|e| Outcome::Failed(ServeError::Join(e.to_string())));
    tracing::debug!(path = req.uri().path(), status = %outcome.status(), "served");
    outcome.into_response(head_only)
}

/// Accepts connections on `listener` until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    state: Arc<ServerState>,
    shutdown: impl Future<Output = ()>,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, bundles = state.config.bundles.len(), "listening");
    }
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = accepted?;
                let state = Arc::clone(&state);
                tokio::task::spawn(async move {
                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { Ok::<_, Infallible>(handle(state, req).await) }
                    });
                    if let Err(err) = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await
                    {
                        tracing::warn!(%peer, error = %err, "connection error");
                    }
                });
            }
            () = &mut shutdown => {
                tracing::info!("shutting down");
                return Ok(());
            }
        }
    }
}

fn status_only(status: StatusCode) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = status;
    response
}
