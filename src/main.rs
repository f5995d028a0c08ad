use axum::{Router, routing::get};
use tokio::net::TcpListener;

use anyhow::anyhow;

use kaiwa::{ServerConfig, routes, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = ServerConfig::from_env().map_err(|e| anyhow!(e.to_string()))?;
    let address = config.address();
    println!("Starting server on {address}");

    // Create application state
    let app_state = AppState::new(config).map_err(|e| anyhow!(e.to_string()))?;

    // Combine all routes: health check + audio relay + websocket, behind the
    // development CORS policy
    let app = Router::new()
        .route("/", get(kaiwa::handlers::api::health_check))
        .merge(routes::api::create_api_router())
        .merge(routes::ws::create_ws_router())
        .layer(routes::cors_layer())
        .with_state(app_state);

    // Create listener
    let listener = TcpListener::bind(&address).await?;

    println!("Server listening on {address}");

    // Start server
    axum::serve(listener, app).await?;

    Ok(())
}
