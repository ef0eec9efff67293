//! The axum server shell (SPEC_FULL.md §4.J): router + tower middleware
//! stack + graceful shutdown. Grounded on `control::startup`'s
//! `ServiceBuilder` layering, upgraded to `oidc-discovery-server`'s modern
//! `axum::serve`/`State`/`tokio::signal` bootstrap.

use std::sync::Arc;

use tower::limit::ConcurrencyLimitLayer;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::context::AppState;
use crate::cors::cors_layer;

/// The maximum number of requests served concurrently, matching the
/// teacher's `ConcurrencyLimitLayer::new(64)` constant.
const MAX_CONCURRENT_REQUESTS: usize = 64;

pub async fn serve(listener: tokio::net::TcpListener, state: Arc<AppState>) -> anyhow::Result<()> {
    let cors = cors_layer(&state.settings.cors);
    let app = crate::routes::app(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(ConcurrencyLimitLayer::new(MAX_CONCURRENT_REQUESTS))
            .layer(cors),
    );

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install CTRL+C signal handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received, stopping server");
}
