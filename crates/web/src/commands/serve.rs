//! Serve command - Starts the HTTP server.

use std::net::SocketAddr;

use common::{AppError, AppResult};

use crate::cli::args::ServeArgs;
use crate::config::WebConfig;
use crate::routes::create_router;
use crate::state::AppState;

/// Execute the serve command
pub async fn execute(args: ServeArgs, mut config: WebConfig) -> AppResult<()> {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    tracing::info!("Starting server...");
    let services = accounts::connect(&config.database, config.jwt.clone()).await?;

    let addr = config.server_addr();
    let state = AppState::from_services(services, config)?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("Server running on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    Ok(())
}
