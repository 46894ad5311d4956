//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use tracing::{error, info};

use crate::{
    config::{SettingsUpdate, WorkoutSettings},
    state::{AppState, WorkoutState},
};
use super::responses::{
    ApiResponse, HealthResponse, SettingsResponse, StatusResponse, WorkoutView,
};

/// Build the serializable view for a workout state
fn workout_view(state: &AppState, workout: &WorkoutState) -> Result<WorkoutView, String> {
    let settings = state.display_settings(workout)?;
    Ok(WorkoutView::new(workout, &settings))
}

/// Handle POST /start - Start or resume the workout
pub async fn start_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match state.start().and_then(|workout| workout_view(&state, &workout)) {
        Ok(view) => {
            info!("Start endpoint called - workout in {} phase", view.phase);
            Ok(Json(ApiResponse::ok("Workout running".to_string(), view)))
        }
        Err(e) => {
            error!("Failed to start workout: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /pause - Pause the running workout
pub async fn pause_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match state.pause().and_then(|workout| workout_view(&state, &workout)) {
        Ok(view) => {
            let message = if view.paused {
                "Workout paused"
            } else {
                "No workout running, pause ignored"
            };
            info!("Pause endpoint called - {}", message);
            Ok(Json(ApiResponse::ok(message.to_string(), view)))
        }
        Err(e) => {
            error!("Failed to pause workout: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /reset - Reset the workout to the ready state
pub async fn reset_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match state.reset().and_then(|workout| workout_view(&state, &workout)) {
        Ok(view) => {
            info!("Reset endpoint called - workout back in ready state");
            Ok(Json(ApiResponse::ok("Workout reset".to_string(), view)))
        }
        Err(e) => {
            error!("Failed to reset workout: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /settings - Return the current workout settings
pub async fn get_settings_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SettingsResponse>, StatusCode> {
    let settings = match state.get_settings() {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to get settings: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };
    let inputs_locked = match state.inputs_locked() {
        Ok(locked) => locked,
        Err(e) => {
            error!("Failed to check input lock: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    Ok(Json(SettingsResponse::new(settings, inputs_locked)))
}

/// Handle PUT /settings - Replace the workout settings.
///
/// Absent or non-numeric fields fall back to their documented defaults.
/// Rejected with 409 while a workout is running.
pub async fn update_settings_handler(
    State(state): State<Arc<AppState>>,
    Json(update): Json<SettingsUpdate>,
) -> Result<Json<SettingsResponse>, StatusCode> {
    let requested = WorkoutSettings::from_update(&update);

    match state.try_update_settings(requested) {
        Ok(Some(applied)) => {
            info!("Settings endpoint called - settings updated");
            Ok(Json(SettingsResponse::new(applied, false)))
        }
        Ok(None) => {
            info!("Settings endpoint called - rejected, inputs locked");
            Err(StatusCode::CONFLICT)
        }
        Err(e) => {
            error!("Failed to update settings: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /status - Return the full workout status
pub async fn status_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, StatusCode> {
    let workout = match state.get_workout_state() {
        Ok(w) => w,
        Err(e) => {
            error!("Failed to get workout state: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let settings = match state.display_settings(&workout) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to get display settings: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        workout: WorkoutView::new(&workout, &settings),
        settings,
        inputs_locked: workout.running,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
