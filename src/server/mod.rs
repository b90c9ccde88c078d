//! HTTP server providing an Ollama-style chat API.
//!
//! - [`api`]: Request/response types and route handlers
//! - [`streaming`]: SSE streaming for word-by-word responses
//! - [`error`]: Handler error type and its JSON rendering

pub mod api;
pub mod error;
pub mod streaming;

use std::future::Future;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use api::{build_router, AppState};

/// Serve the API on an already-bound listener until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(state);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.await;
            info!("HTTP server shutting down");
        })
        .await?;

    Ok(())
}
