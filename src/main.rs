//! Interval Bell - A state-managed HTTP server that runs an interval workout timer
//!
//! This is the main entry point for the interval-bell application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use interval_bell::{
    api::create_router,
    config::Config,
    services::audio_cue_task,
    state::AppState,
    tasks::{console_renderer_task, tick_driver_task},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "interval_bell={},tower_http=info",
            config.log_level()
        ))
        .init();

    info!("Starting interval-bell server v0.1.0");
    let settings = config.workout_settings();
    info!(
        "Configuration: host={}, port={}, warmup={}s, training={}s, rest={}s, intervals={}",
        config.host,
        config.port,
        settings.warmup_seconds,
        settings.training_seconds,
        settings.rest_seconds,
        settings.interval_count
    );

    // Create application state
    let state = Arc::new(AppState::new(config.port, config.host.clone(), settings));

    // Start the background tasks: tick driver, console renderer, audio sink
    tokio::spawn(tick_driver_task(Arc::clone(&state)));
    tokio::spawn(console_renderer_task(Arc::clone(&state)));
    tokio::spawn(audio_cue_task(Arc::clone(&state)));

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /start    - Start or resume the workout");
    info!("  POST /pause    - Pause the workout");
    info!("  POST /reset    - Reset to the ready state");
    info!("  GET  /settings - Read workout settings");
    info!("  PUT  /settings - Update workout settings");
    info!("  GET  /status   - Check current phase and timer");
    info!("  GET  /health   - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
