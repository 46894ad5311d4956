//! Signal handling for graceful shutdown

use futures::stream::StreamExt;
use signal_hook_tokio::Signals;
use tracing::info;

const SHUTDOWN_SIGNALS: &[i32] = &[
    signal_hook::consts::SIGTERM,
    signal_hook::consts::SIGINT,
];

/// Resolve when a shutdown signal (SIGTERM, SIGINT) arrives
pub async fn shutdown_signal() {
    let mut signals =
        Signals::new(SHUTDOWN_SIGNALS).expect("Failed to create signal handler");

    if let Some(signal) = signals.next().await {
        info!("Received signal: {}", signal);
    }
}
