//! Main application state management

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Mutex,
    },
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, watch};
use tracing::{debug, error, info, warn};

use super::{advance, Phase, WorkoutState};
use crate::config::WorkoutSettings;

/// Audio cues emitted by the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCue {
    /// Single short tone, fired at 3, 2 and 1 seconds remaining
    Countdown,
    /// Three-pulse tone sequence marking the end of the workout
    Completion,
}

/// Arming command published to the tick driver.
///
/// The generation identifies one armed epoch. Every disarm bumps it, so a
/// driver loop that was superseded can never tick the current run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverCommand {
    pub armed: bool,
    pub generation: u64,
}

/// Snapshot published to renderer subscribers after every state change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkoutSnapshot {
    pub workout: WorkoutState,
    pub settings: WorkoutSettings,
}

/// Main application state that owns the workout state machine and its driver
#[derive(Debug)]
pub struct AppState {
    /// Editable settings store (the configuration inputs)
    settings: Mutex<WorkoutSettings>,
    /// Settings snapshot frozen at the start of the current run
    run_settings: Mutex<WorkoutSettings>,
    /// The single mutable workout state, owned exclusively by this scheduler
    workout: Mutex<WorkoutState>,
    /// Current driver epoch; ticks carrying an older value are rejected
    generation: AtomicU64,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    last_action: Mutex<Option<String>>,
    last_action_time: Mutex<Option<DateTime<Utc>>>,
    /// Channel for renderer notifications
    snapshot_tx: watch::Sender<WorkoutSnapshot>,
    /// Channel for audio cues
    cue_tx: broadcast::Sender<AudioCue>,
    /// Channel that arms and disarms the tick driver
    driver_tx: watch::Sender<DriverCommand>,
    /// Keep the receivers alive to prevent channel closure
    _snapshot_rx: watch::Receiver<WorkoutSnapshot>,
    _driver_rx: watch::Receiver<DriverCommand>,
}

impl AppState {
    /// Create a new AppState in the ready phase with the given settings
    pub fn new(port: u16, host: String, settings: WorkoutSettings) -> Self {
        let (snapshot_tx, snapshot_rx) = watch::channel(WorkoutSnapshot {
            workout: WorkoutState::ready(),
            settings,
        });
        let (cue_tx, _) = broadcast::channel(16);
        let (driver_tx, driver_rx) = watch::channel(DriverCommand {
            armed: false,
            generation: 0,
        });

        Self {
            settings: Mutex::new(settings),
            run_settings: Mutex::new(settings),
            workout: Mutex::new(WorkoutState::ready()),
            generation: AtomicU64::new(0),
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
            snapshot_tx,
            cue_tx,
            driver_tx,
            _snapshot_rx: snapshot_rx,
            _driver_rx: driver_rx,
        }
    }

    // ── Subscriptions ────────────────────────────────────────────────

    /// Subscribe to renderer snapshots
    pub fn subscribe_snapshots(&self) -> watch::Receiver<WorkoutSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Subscribe to audio cues
    pub fn subscribe_cues(&self) -> broadcast::Receiver<AudioCue> {
        self.cue_tx.subscribe()
    }

    /// Subscribe to driver arming commands
    pub fn subscribe_driver(&self) -> watch::Receiver<DriverCommand> {
        self.driver_tx.subscribe()
    }

    /// Get the most recent driver command
    pub fn driver_command(&self) -> DriverCommand {
        *self.driver_tx.subscribe().borrow()
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Get current workout state
    pub fn get_workout_state(&self) -> Result<WorkoutState, String> {
        self.workout
            .lock()
            .map(|workout| workout.clone())
            .map_err(|e| format!("Failed to lock workout state: {}", e))
    }

    /// Get the current settings store
    pub fn get_settings(&self) -> Result<WorkoutSettings, String> {
        self.settings
            .lock()
            .map(|settings| *settings)
            .map_err(|e| format!("Failed to lock settings: {}", e))
    }

    /// Get the settings snapshot of the current run
    pub fn get_run_settings(&self) -> Result<WorkoutSettings, String> {
        self.run_settings
            .lock()
            .map(|settings| *settings)
            .map_err(|e| format!("Failed to lock run settings: {}", e))
    }

    /// Configuration inputs are locked while a workout is running
    pub fn inputs_locked(&self) -> Result<bool, String> {
        self.get_workout_state().map(|workout| workout.running)
    }

    /// Settings shown to the user: the live store in Ready, the frozen
    /// snapshot once a run has begun
    pub fn display_settings(&self, workout: &WorkoutState) -> Result<WorkoutSettings, String> {
        if workout.phase == Phase::Ready {
            self.get_settings()
        } else {
            self.get_run_settings()
        }
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a fresh workout, or resume a paused one.
    ///
    /// A no-op while already running unpaused. A fresh start snapshots the
    /// settings store for the whole run and computes the entry phase from it.
    pub fn start(&self) -> Result<WorkoutState, String> {
        let mut workout = self
            .workout
            .lock()
            .map_err(|e| format!("Failed to lock workout state: {}", e))?;

        if workout.running && !workout.paused {
            debug!("Start requested while already running, ignoring");
            return Ok(workout.clone());
        }

        if workout.paused {
            workout.paused = false;
            info!(
                "Resuming workout in {} with {}s remaining",
                workout.phase.label(),
                workout.remaining_seconds
            );
        } else {
            let snapshot = self.get_settings()?;
            *self
                .run_settings
                .lock()
                .map_err(|e| format!("Failed to lock run settings: {}", e))? = snapshot;
            *workout = WorkoutState::fresh_start(&snapshot);
            info!(
                "Starting workout: warmup={}s, training={}s, rest={}s, intervals={}",
                snapshot.warmup_seconds,
                snapshot.training_seconds,
                snapshot.rest_seconds,
                snapshot.interval_count
            );
        }

        let state = workout.clone();
        drop(workout);

        let generation = self.arm_driver();
        debug!("Driver armed (generation {})", generation);

        self.record_action("start");
        self.publish_snapshot(&state)?;
        Ok(state)
    }

    /// Pause the running workout, leaving phase and remaining time untouched.
    ///
    /// A no-op while not running or already paused.
    pub fn pause(&self) -> Result<WorkoutState, String> {
        let mut workout = self
            .workout
            .lock()
            .map_err(|e| format!("Failed to lock workout state: {}", e))?;

        if !workout.running {
            debug!("Pause requested while not running, ignoring");
            return Ok(workout.clone());
        }
        if workout.paused {
            debug!("Pause requested while already paused, ignoring");
            return Ok(workout.clone());
        }

        workout.paused = true;
        let state = workout.clone();
        drop(workout);

        self.disarm_driver();
        info!(
            "Workout paused in {} with {}s remaining",
            state.phase.label(),
            state.remaining_seconds
        );

        self.record_action("pause");
        self.publish_snapshot(&state)?;
        Ok(state)
    }

    /// Reset to the initial ready state, cancelling any run in progress
    pub fn reset(&self) -> Result<WorkoutState, String> {
        self.disarm_driver();

        let mut workout = self
            .workout
            .lock()
            .map_err(|e| format!("Failed to lock workout state: {}", e))?;
        *workout = WorkoutState::ready();
        let state = workout.clone();
        drop(workout);

        info!("Workout reset");
        self.record_action("reset");
        self.publish_snapshot(&state)?;
        Ok(state)
    }

    /// Replace the settings store.
    ///
    /// Returns `Ok(None)` while inputs are locked (a workout is running).
    pub fn try_update_settings(
        &self,
        new_settings: WorkoutSettings,
    ) -> Result<Option<WorkoutSettings>, String> {
        let workout = self.get_workout_state()?;
        if workout.running {
            debug!("Settings update rejected while workout is running");
            return Ok(None);
        }

        let applied = new_settings.normalized();
        *self
            .settings
            .lock()
            .map_err(|e| format!("Failed to lock settings: {}", e))? = applied;

        info!(
            "Settings updated: warmup={}s, training={}s, rest={}s, intervals={}",
            applied.warmup_seconds,
            applied.training_seconds,
            applied.rest_seconds,
            applied.interval_count
        );
        self.record_action("settings");
        self.publish_snapshot(&workout)?;
        Ok(Some(applied))
    }

    /// Advance the countdown by one second.
    ///
    /// Called by the tick driver once per second while armed. Returns false
    /// when the driver must stand down: the generation was superseded, the
    /// workout is no longer counting down, or this tick completed it.
    pub fn tick(&self, generation: u64) -> bool {
        let mut workout = match self.workout.lock() {
            Ok(guard) => guard,
            Err(e) => {
                error!("Failed to lock workout state in tick: {}", e);
                return false;
            }
        };

        if generation != self.generation.load(Ordering::SeqCst) {
            debug!("Rejecting tick from superseded driver (generation {})", generation);
            return false;
        }
        if !workout.is_active() {
            return false;
        }

        workout.remaining_seconds = workout.remaining_seconds.saturating_sub(1);

        let mut cues = Vec::new();
        if (1..=3).contains(&workout.remaining_seconds) {
            cues.push(AudioCue::Countdown);
        }

        if workout.remaining_seconds == 0 {
            let settings = match self.run_settings.lock() {
                Ok(guard) => *guard,
                Err(e) => {
                    error!("Failed to lock run settings in tick: {}", e);
                    return false;
                }
            };

            let change = advance(workout.phase, workout.current_interval, &settings);
            workout.phase = change.phase;
            workout.current_interval = change.current_interval;
            workout.remaining_seconds = change.remaining_seconds;

            if change.terminal {
                workout.running = false;
                workout.paused = false;
                info!("Workout complete after {} intervals", workout.current_interval);
                cues.push(AudioCue::Completion);
            } else {
                debug!(
                    "Entering {} for {}s (interval {}/{})",
                    workout.phase.label(),
                    workout.remaining_seconds,
                    workout.current_interval,
                    settings.interval_count
                );
            }
        }

        let state = workout.clone();
        drop(workout);

        let still_armed = state.is_active();
        if !still_armed {
            self.disarm_driver();
        }

        for cue in cues {
            // No receivers is fine; the audio sink is optional.
            let _ = self.cue_tx.send(cue);
        }
        if let Err(e) = self.publish_snapshot(&state) {
            warn!("Failed to publish tick snapshot: {}", e);
        }

        still_armed
    }

    // ── Internals ────────────────────────────────────────────────────

    /// Arm the tick driver under a fresh generation
    fn arm_driver(&self) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Err(e) = self.driver_tx.send(DriverCommand {
            armed: true,
            generation,
        }) {
            warn!("Failed to send driver arm command: {}", e);
        }
        generation
    }

    /// Disarm the tick driver, invalidating any in-flight generation
    fn disarm_driver(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Err(e) = self.driver_tx.send(DriverCommand {
            armed: false,
            generation,
        }) {
            warn!("Failed to send driver disarm command: {}", e);
        }
    }

    /// Record the last performed action for status reporting
    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Notify renderer subscribers of the current state
    fn publish_snapshot(&self, workout: &WorkoutState) -> Result<(), String> {
        let settings = self.display_settings(workout)?;
        if let Err(e) = self.snapshot_tx.send(WorkoutSnapshot {
            workout: workout.clone(),
            settings,
        }) {
            warn!("Failed to send workout snapshot: {}", e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(settings: WorkoutSettings) -> AppState {
        AppState::new(0, "127.0.0.1".to_string(), settings.normalized())
    }

    fn settings(warmup: u64, training: u64, rest: u64, intervals: u32) -> WorkoutSettings {
        WorkoutSettings {
            warmup_seconds: warmup,
            training_seconds: training,
            rest_seconds: rest,
            interval_count: intervals,
        }
    }

    /// Drive the scheduler through `n` seconds with the armed generation
    fn drive(state: &AppState, n: u64) {
        let generation = state.driver_command().generation;
        for _ in 0..n {
            state.tick(generation);
        }
    }

    #[test]
    fn full_workout_with_warmup_and_two_intervals() {
        let state = app(settings(5, 10, 5, 2));
        state.start().unwrap();

        let workout = state.get_workout_state().unwrap();
        assert_eq!(workout.phase, Phase::Warmup);
        assert_eq!(workout.current_interval, 0);
        assert_eq!(workout.remaining_seconds, 5);

        drive(&state, 5);
        let workout = state.get_workout_state().unwrap();
        assert_eq!(workout.phase, Phase::Training);
        assert_eq!(workout.current_interval, 1);
        assert_eq!(workout.remaining_seconds, 10);

        drive(&state, 10);
        let workout = state.get_workout_state().unwrap();
        assert_eq!(workout.phase, Phase::Rest);
        assert_eq!(workout.current_interval, 1);
        assert_eq!(workout.remaining_seconds, 5);

        drive(&state, 5);
        let workout = state.get_workout_state().unwrap();
        assert_eq!(workout.phase, Phase::Training);
        assert_eq!(workout.current_interval, 2);
        assert_eq!(workout.remaining_seconds, 10);

        drive(&state, 10);
        let workout = state.get_workout_state().unwrap();
        assert_eq!(workout.phase, Phase::Complete);
        assert_eq!(workout.current_interval, 2);
        assert_eq!(workout.remaining_seconds, 0);
        assert!(!workout.running);
        assert!(!state.driver_command().armed);
    }

    #[test]
    fn single_interval_without_warmup_or_rest() {
        let state = app(settings(0, 3, 0, 1));
        state.start().unwrap();

        let workout = state.get_workout_state().unwrap();
        assert_eq!(workout.phase, Phase::Training);
        assert_eq!(workout.current_interval, 1);
        assert_eq!(workout.remaining_seconds, 3);

        let generation = state.driver_command().generation;
        state.tick(generation);
        state.tick(generation);
        assert_eq!(state.get_workout_state().unwrap().phase, Phase::Training);

        // Final second: Rest is never observed with a single interval.
        assert!(!state.tick(generation));
        let workout = state.get_workout_state().unwrap();
        assert_eq!(workout.phase, Phase::Complete);
        assert_eq!(workout.current_interval, 1);
        assert_eq!(workout.remaining_seconds, 0);
        assert!(!workout.running);
    }

    #[test]
    fn training_phase_count_matches_interval_count() {
        let state = app(settings(0, 2, 1, 3));
        state.start().unwrap();
        let generation = state.driver_command().generation;

        let mut training_entries = 1; // fresh start entered Training already
        let mut previous_phase = Phase::Training;
        for _ in 0..64 {
            if !state.tick(generation) {
                break;
            }
            let workout = state.get_workout_state().unwrap();
            if workout.phase == Phase::Training && previous_phase != Phase::Training {
                training_entries += 1;
            }
            previous_phase = workout.phase;
        }

        assert_eq!(training_entries, 3);
        assert_eq!(state.get_workout_state().unwrap().phase, Phase::Complete);
    }

    #[test]
    fn start_is_a_noop_while_running_unpaused() {
        let state = app(settings(5, 10, 5, 2));
        state.start().unwrap();
        drive(&state, 2);

        let before = state.get_workout_state().unwrap();
        let generation = state.driver_command().generation;
        state.start().unwrap();

        assert_eq!(state.get_workout_state().unwrap(), before);
        assert_eq!(state.driver_command().generation, generation);
    }

    #[test]
    fn pause_preserves_state_and_resume_continues() {
        let state = app(settings(0, 10, 5, 2));
        state.start().unwrap();
        drive(&state, 4);

        state.pause().unwrap();
        let paused = state.get_workout_state().unwrap();
        assert!(paused.running);
        assert!(paused.paused);
        assert_eq!(paused.remaining_seconds, 6);
        assert!(!state.driver_command().armed);

        // Idempotent: a second pause changes nothing.
        state.pause().unwrap();
        assert_eq!(state.get_workout_state().unwrap(), paused);

        state.start().unwrap();
        let resumed = state.get_workout_state().unwrap();
        assert!(resumed.running);
        assert!(!resumed.paused);
        assert_eq!(resumed.phase, paused.phase);
        assert_eq!(resumed.remaining_seconds, 6);
        assert!(state.driver_command().armed);
    }

    #[test]
    fn pause_while_not_running_is_a_noop() {
        let state = app(settings(0, 10, 0, 1));
        state.pause().unwrap();
        assert_eq!(state.get_workout_state().unwrap(), WorkoutState::ready());
    }

    #[test]
    fn reset_returns_the_exact_ready_state_from_any_point() {
        let state = app(settings(5, 10, 5, 2));
        state.start().unwrap();
        drive(&state, 7);
        state.pause().unwrap();
        state.start().unwrap();
        drive(&state, 3);

        state.reset().unwrap();
        assert_eq!(state.get_workout_state().unwrap(), WorkoutState::ready());
        assert!(!state.driver_command().armed);
    }

    #[test]
    fn countdown_cues_fire_at_three_two_one_and_completion_once() {
        let state = app(settings(0, 5, 0, 1));
        let mut cues = state.subscribe_cues();
        state.start().unwrap();
        drive(&state, 5);

        let mut received = Vec::new();
        while let Ok(cue) = cues.try_recv() {
            received.push(cue);
        }
        assert_eq!(
            received,
            vec![
                AudioCue::Countdown,
                AudioCue::Countdown,
                AudioCue::Countdown,
                AudioCue::Completion,
            ]
        );
    }

    #[test]
    fn short_phases_only_cue_for_the_seconds_that_remain() {
        let state = app(settings(2, 10, 0, 1));
        let mut cues = state.subscribe_cues();
        state.start().unwrap();
        drive(&state, 2); // warmup of 2s: cue at 1 only

        let mut countdowns = 0;
        while let Ok(cue) = cues.try_recv() {
            assert_eq!(cue, AudioCue::Countdown);
            countdowns += 1;
        }
        assert_eq!(countdowns, 1);
    }

    #[test]
    fn stale_generation_ticks_are_rejected() {
        let state = app(settings(0, 10, 0, 1));
        state.start().unwrap();
        let stale = state.driver_command().generation;
        drive(&state, 2);

        state.pause().unwrap();
        let before = state.get_workout_state().unwrap();
        assert!(!state.tick(stale));
        assert_eq!(state.get_workout_state().unwrap(), before);

        // Resuming arms a fresh generation; the stale one stays dead.
        state.start().unwrap();
        assert!(!state.tick(stale));
        assert_eq!(state.get_workout_state().unwrap().remaining_seconds, 8);
    }

    #[test]
    fn settings_are_locked_while_running_and_while_paused() {
        let state = app(settings(0, 10, 0, 1));
        state.start().unwrap();
        assert_eq!(
            state.try_update_settings(settings(1, 2, 3, 4)).unwrap(),
            None
        );

        state.pause().unwrap();
        assert_eq!(
            state.try_update_settings(settings(1, 2, 3, 4)).unwrap(),
            None
        );

        state.reset().unwrap();
        let applied = state
            .try_update_settings(settings(1, 2, 3, 4))
            .unwrap()
            .expect("unlocked after reset");
        assert_eq!(applied, settings(1, 2, 3, 4));
    }

    #[test]
    fn settings_unlock_when_the_workout_completes() {
        let state = app(settings(0, 1, 0, 1));
        state.start().unwrap();
        drive(&state, 1);
        assert_eq!(state.get_workout_state().unwrap().phase, Phase::Complete);

        assert!(state
            .try_update_settings(settings(0, 5, 0, 2))
            .unwrap()
            .is_some());
    }

    #[test]
    fn run_uses_the_settings_snapshot_taken_at_start() {
        let state = app(settings(0, 10, 0, 2));
        state.start().unwrap();
        drive(&state, 2);
        state.pause().unwrap();

        // The store itself refuses updates mid-run, so poke it directly to
        // prove tick reads the snapshot rather than the store.
        *state.settings.lock().unwrap() = settings(0, 99, 99, 9);
        state.start().unwrap();
        drive(&state, 8);

        let workout = state.get_workout_state().unwrap();
        assert_eq!(workout.phase, Phase::Rest);
        assert_eq!(workout.remaining_seconds, 0);
    }
}
