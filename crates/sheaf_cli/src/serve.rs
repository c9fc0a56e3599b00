//! `sheaf serve`: HTTP server for every configured bundle.

use std::sync::Arc;

use sheaf_http::ServerState;
use tokio::net::TcpListener;

use crate::pipeline::load_project;
use crate::{GlobalArgs, ServeArgs};

/// Runs the `sheaf serve` command until Ctrl-C.
pub fn run(args: &ServeArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project = load_project(global)?;
    let bind = args
        .bind
        .clone()
        .unwrap_or_else(|| project.config.server.bind.clone());

    let compiler = project.compiler();
    let watched = project.watched_paths();
    let state = Arc::new(
        ServerState::new(project.config, project.base_dir, compiler).with_watched(watched),
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async move {
        let listener = TcpListener::bind(&bind).await?;
        if !global.quiet {
            eprintln!("   Serving on http://{}", listener.local_addr()?);
        }
        sheaf_http::serve(listener, state, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
            }
        })
        .await
    })?;

    Ok(0)
}
