//! Tick driver background task

use std::{sync::Arc, time::Duration};
use tokio::time::interval;
use tracing::{debug, info};

use crate::state::AppState;

/// Background task that fires the scheduler's one-second tick while armed.
///
/// The scheduler arms and disarms the driver through a watch channel; each
/// arming carries a generation. Only one countdown loop runs at a time, and
/// a loop exits as soon as its generation is superseded or `tick` tells it
/// to stand down, so a cancelled run can never keep ticking.
pub async fn tick_driver_task(state: Arc<AppState>) {
    info!("Starting tick driver task");

    let mut driver_rx = state.subscribe_driver();

    loop {
        // Wait until a run arms the driver.
        let command = *driver_rx.borrow_and_update();
        if !command.armed {
            if driver_rx.changed().await.is_err() {
                debug!("Driver channel closed, stopping tick driver task");
                return;
            }
            continue;
        }

        let generation = command.generation;
        debug!("Tick driver armed (generation {})", generation);

        let mut ticker = interval(Duration::from_secs(1));
        // The first interval tick resolves immediately; consume it so the
        // first countdown tick lands a full second after arming.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if !state.tick(generation) {
                        debug!("Tick driver standing down (generation {})", generation);
                        break;
                    }
                }
                changed = driver_rx.changed() => {
                    match changed {
                        Ok(()) => {
                            let next = *driver_rx.borrow_and_update();
                            if !next.armed || next.generation != generation {
                                debug!(
                                    "Tick driver superseded (generation {} -> {})",
                                    generation, next.generation
                                );
                                break;
                            }
                        }
                        Err(_) => {
                            debug!("Driver channel closed, stopping tick driver task");
                            return;
                        }
                    }
                }
            }
        }
    }
}
