//! State management module
//!
//! This module contains all state-related structures and their management logic.

pub mod phase;
pub mod app_state;
pub mod workout_state;

// Re-export main types
pub use phase::{advance, Phase, PhaseChange};
pub use app_state::{AppState, AudioCue, DriverCommand, WorkoutSnapshot};
pub use workout_state::WorkoutState;
