//! Server startup and shutdown.
//!
//! `run_server` performs the startup sequence in order:
//! - REST registration (base path and CORS mapping)
//! - Repository and application state creation
//! - Router creation
//! - Server binding and graceful shutdown

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::Student;
use crate::repository::{InMemoryRepository, Repository};
use crate::rest;
use crate::routes;
use crate::state::AppState;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Build the application state from the configuration.
///
/// This is where the REST settings are registered. It runs once, before the
/// listener is bound, and the result is never modified afterwards.
pub fn build_state(config: &Config) -> AppResult<Arc<AppState>> {
    let settings = rest::configure(&config.rest, &config.cors)?;
    let students: Arc<dyn Repository<Student>> = Arc::new(InMemoryRepository::<Student>::new());

    Ok(Arc::new(AppState {
        students,
        settings: Arc::new(settings),
    }))
}

/// Run the web server with the given configuration.
///
/// # Errors
///
/// This function will return an error if:
/// - The REST settings are invalid
/// - Server binding fails
/// - Server runtime error occurs
pub async fn run_server(config: Config) -> AppResult<()> {
    info!("Starting student-management server...");

    let state = build_state(&config)?;
    let base_path = state.settings.base_path().to_string();

    let app = routes::create_router(state);

    let addr = config.server.addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to bind to address {}: {}", addr, e)))?;

    info!("Server listening on {}", addr);
    info!("Resources exposed under {}", base_path);

    axum::serve(listener, app)
        .with_graceful_shutdown(create_shutdown_signal())
        .await
        .map_err(|e| AppError::Internal(format!("Server error: {}", e)))?;

    info!("Server shutdown complete");
    Ok(())
}

/// Create a future that resolves when a shutdown signal is received.
///
/// On Unix-like systems, this listens for both Ctrl+C (SIGINT) and SIGTERM.
/// On other platforms, it only listens for Ctrl+C.
///
/// # Panics
///
/// Panics if signal handler installation fails, since graceful shutdown is
/// impossible without it.
async fn create_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(unix)]
    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    #[cfg(not(unix))]
    ctrl_c.await;
}
