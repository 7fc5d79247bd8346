//! HTTP front of the CSV relay.
//!
//! Routes:
//! - `POST /api/save-csv` (alias `/save`): append one item row
//! - `GET /api/load-csv` (alias `/load`): return the CSV text
//! - `GET /api/capabilities`: what the remote file can record

pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::{
    Router,
    routing::{any, get},
};
use tokio::net::TcpListener;
use tokio::signal::{self, ctrl_c};

use routes::{capabilities_handler, load_handler, save_handler};
use state::State;

pub fn router(state: Arc<State>) -> Router {
    Router::new()
        .route("/api/save-csv", any(save_handler))
        .route("/save", any(save_handler))
        .route("/api/load-csv", get(load_handler))
        .route("/load", get(load_handler))
        .route("/api/capabilities", get(capabilities_handler))
        .with_state(state)
}

/// Bind and serve until Ctrl+C or SIGTERM.
pub async fn serve(state: Arc<State>) -> std::io::Result<()> {
    let address = format!("0.0.0.0:{}", state.port);
    log::info!("Binding to {}", address);

    let listener = TcpListener::bind(&address).await?;
    log::info!("Relay running on {}", address);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Relay shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            log::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        log::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                log::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                log::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
