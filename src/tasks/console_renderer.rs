//! Console renderer background task

use std::sync::Arc;
use tracing::{debug, info};

use crate::render::render_line;
use crate::state::AppState;

/// Background task that renders every workout snapshot to the log.
///
/// The scheduler publishes a snapshot after each state change; this task is
/// a pure sink and contains no decision logic.
pub async fn console_renderer_task(state: Arc<AppState>) {
    info!("Starting console renderer task");

    let mut snapshots = state.subscribe_snapshots();

    while snapshots.changed().await.is_ok() {
        let snapshot = snapshots.borrow_and_update().clone();
        info!("{}", render_line(&snapshot.workout, &snapshot.settings));
    }

    debug!("Snapshot channel closed, stopping console renderer task");
}
