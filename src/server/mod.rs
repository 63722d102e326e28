//! HTTP surface: an info page, and one relay route per feed address.
//!
//! ```text
//! GET /                           -> 200, info page
//! GET /favicon.ico                -> 404
//! GET /example.com/feed.xml?...   -> 200 relayed feed | 400 | 502 | 500
//! ```

mod error;
mod handlers;
mod query;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::relay::Relay;

pub use error::ApiError;
pub use query::{
    default_from_time, parse_from_time, parse_items_cap, RelayQuery, FROM_TIME_FORMAT,
};

/// Shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<Relay>,
    /// Used when the query carries no `items_cap`
    pub default_items_cap: usize,
    pub max_items_cap: usize,
    /// Used when the query carries no `from_time`
    pub from_days_ago: u32,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/favicon.ico", get(handlers::favicon))
        .route("/*target", get(handlers::relay_feed))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds `addr` and serves until Ctrl-C.
pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "Listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
