//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::WorkoutSettings;
use crate::render;
use crate::state::WorkoutState;

/// Serializable view of the workout state with its rendered display text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutView {
    pub running: bool,
    pub paused: bool,
    pub phase: String,
    pub current_interval: u32,
    pub interval_count: u32,
    pub remaining_seconds: u64,
    pub clock: String,
    pub interval_counter: String,
}

impl WorkoutView {
    /// Build the view for a workout state against its display settings
    pub fn new(workout: &WorkoutState, settings: &WorkoutSettings) -> Self {
        Self {
            running: workout.running,
            paused: workout.paused,
            phase: workout.phase.label().to_string(),
            current_interval: workout.current_interval,
            interval_count: settings.interval_count,
            remaining_seconds: workout.remaining_seconds,
            clock: render::format_clock(workout.remaining_seconds),
            interval_counter: render::interval_counter(workout, settings),
        }
    }
}

/// API response structure for scheduler command endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub workout: WorkoutView,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: String, message: String, workout: WorkoutView) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            workout,
        }
    }

    /// Create an ok response
    pub fn ok(message: String, workout: WorkoutView) -> Self {
        Self::new("ok".to_string(), message, workout)
    }
}

/// Enhanced status response with settings and server metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub workout: WorkoutView,
    pub settings: WorkoutSettings,
    pub inputs_locked: bool,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Settings response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsResponse {
    pub settings: WorkoutSettings,
    pub inputs_locked: bool,
    pub timestamp: DateTime<Utc>,
}

impl SettingsResponse {
    /// Create a settings response stamped with the current time
    pub fn new(settings: WorkoutSettings, inputs_locked: bool) -> Self {
        Self {
            settings,
            inputs_locked,
            timestamp: Utc::now(),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: "0.1.0".to_string(),
        }
    }
}
