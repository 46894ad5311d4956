//! Audio cue playback

use std::{sync::Arc, time::Duration};
use tokio::{process::Command, sync::broadcast, time::sleep};
use tracing::{debug, info};

use crate::state::{AppState, AudioCue};

/// Desktop theme sounds used for the cues
const COUNTDOWN_SOUND: &str = "/usr/share/sounds/freedesktop/stereo/bell.oga";
const COMPLETION_SOUND: &str = "/usr/share/sounds/freedesktop/stereo/complete.oga";

/// Delay between the pulses of the completion sequence
const COMPLETION_PULSE_GAP: Duration = Duration::from_millis(300);

/// Background task that plays the audio cues emitted by the scheduler.
///
/// Playback failures never reach the scheduler; a machine without a sound
/// backend works out in silence.
pub async fn audio_cue_task(state: Arc<AppState>) {
    info!("Starting audio cue task");

    let mut cues = state.subscribe_cues();

    loop {
        match cues.recv().await {
            Ok(AudioCue::Countdown) => play_countdown_cue().await,
            Ok(AudioCue::Completion) => play_completion_cue().await,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                debug!("Audio cue receiver lagged, {} cues skipped", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => {
                debug!("Cue channel closed, stopping audio cue task");
                return;
            }
        }
    }
}

/// Play the single short countdown tone
pub async fn play_countdown_cue() {
    if let Err(e) = play_sound(COUNTDOWN_SOUND).await {
        debug!("Countdown cue playback failed: {}", e);
    }
}

/// Play the three-pulse completion sequence
pub async fn play_completion_cue() {
    for pulse in 0..3 {
        if pulse > 0 {
            sleep(COMPLETION_PULSE_GAP).await;
        }
        if let Err(e) = play_sound(COMPLETION_SOUND).await {
            debug!("Completion cue playback failed: {}", e);
            return;
        }
    }
}

/// Play a sound file with paplay
async fn play_sound(path: &str) -> Result<(), String> {
    let output = Command::new("paplay")
        .arg(path)
        .output()
        .await
        .map_err(|e| format!("Failed to execute paplay: {}", e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("paplay failed: {}", stderr));
    }

    Ok(())
}
