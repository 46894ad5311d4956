//! Workout state structure and management

use serde::{Deserialize, Serialize};

use super::Phase;
use crate::config::WorkoutSettings;

/// Workout state for tracking the countdown through its phases
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutState {
    pub running: bool,
    pub paused: bool,
    pub phase: Phase,
    /// Training interval in progress; 0 until the first training phase begins
    pub current_interval: u32,
    pub remaining_seconds: u64,
}

impl WorkoutState {
    /// Create the initial ready state
    pub fn ready() -> Self {
        Self {
            running: false,
            paused: false,
            phase: Phase::Ready,
            current_interval: 0,
            remaining_seconds: 0,
        }
    }

    /// Create the state a fresh run starts in.
    ///
    /// Enters Warmup when one is configured, otherwise goes straight into
    /// the first training interval.
    pub fn fresh_start(settings: &WorkoutSettings) -> Self {
        let warming_up = settings.warmup_seconds > 0;
        Self {
            running: true,
            paused: false,
            phase: if warming_up { Phase::Warmup } else { Phase::Training },
            current_interval: if warming_up { 0 } else { 1 },
            remaining_seconds: if warming_up {
                settings.warmup_seconds
            } else {
                settings.training_seconds
            },
        }
    }

    /// Check if the workout is counting down (running and not paused)
    pub fn is_active(&self) -> bool {
        self.running && !self.paused
    }
}

impl Default for WorkoutState {
    fn default() -> Self {
        Self::ready()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ready_state_is_fully_zeroed() {
        let state = WorkoutState::ready();
        assert!(!state.running);
        assert!(!state.paused);
        assert_eq!(state.phase, Phase::Ready);
        assert_eq!(state.current_interval, 0);
        assert_eq!(state.remaining_seconds, 0);
        assert!(!state.is_active());
    }

    #[test]
    fn fresh_start_with_warmup_enters_warmup() {
        let settings = WorkoutSettings {
            warmup_seconds: 5,
            training_seconds: 10,
            rest_seconds: 5,
            interval_count: 2,
        };
        let state = WorkoutState::fresh_start(&settings);
        assert!(state.is_active());
        assert_eq!(state.phase, Phase::Warmup);
        assert_eq!(state.current_interval, 0);
        assert_eq!(state.remaining_seconds, 5);
    }

    #[test]
    fn fresh_start_without_warmup_enters_first_training_interval() {
        let settings = WorkoutSettings {
            warmup_seconds: 0,
            training_seconds: 30,
            rest_seconds: 10,
            interval_count: 4,
        };
        let state = WorkoutState::fresh_start(&settings);
        assert!(state.is_active());
        assert_eq!(state.phase, Phase::Training);
        assert_eq!(state.current_interval, 1);
        assert_eq!(state.remaining_seconds, 30);
    }
}
