//! Workout phases and the phase transition table

use serde::{Deserialize, Serialize};

use crate::config::WorkoutSettings;

/// The mutually exclusive phases of a workout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Ready,
    Warmup,
    Training,
    Rest,
    Complete,
}

impl Phase {
    /// Display label for the phase
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Ready => "Ready",
            Phase::Warmup => "Warmup",
            Phase::Training => "Training",
            Phase::Rest => "Rest",
            Phase::Complete => "Complete!",
        }
    }
}

impl Default for Phase {
    fn default() -> Self {
        Phase::Ready
    }
}

/// Result of advancing out of an expired phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseChange {
    pub phase: Phase,
    pub current_interval: u32,
    pub remaining_seconds: u64,
    /// True when the workout is over and the driver must stand down
    pub terminal: bool,
}

/// Compute the phase that follows an expired one.
///
/// Pure function of the current phase, the training interval in progress,
/// and the run settings. `Ready` and `Complete` have no successor; callers
/// never tick in those phases, so they map to a terminal no-op.
pub fn advance(phase: Phase, current_interval: u32, settings: &WorkoutSettings) -> PhaseChange {
    match phase {
        Phase::Warmup => PhaseChange {
            phase: Phase::Training,
            current_interval: 1,
            remaining_seconds: settings.training_seconds,
            terminal: false,
        },
        Phase::Training if current_interval < settings.interval_count => PhaseChange {
            phase: Phase::Rest,
            current_interval,
            remaining_seconds: settings.rest_seconds,
            terminal: false,
        },
        Phase::Training => PhaseChange {
            phase: Phase::Complete,
            current_interval,
            remaining_seconds: 0,
            terminal: true,
        },
        Phase::Rest => PhaseChange {
            phase: Phase::Training,
            current_interval: current_interval + 1,
            remaining_seconds: settings.training_seconds,
            terminal: false,
        },
        Phase::Ready | Phase::Complete => PhaseChange {
            phase,
            current_interval,
            remaining_seconds: 0,
            terminal: true,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(warmup: u64, training: u64, rest: u64, intervals: u32) -> WorkoutSettings {
        WorkoutSettings {
            warmup_seconds: warmup,
            training_seconds: training,
            rest_seconds: rest,
            interval_count: intervals,
        }
    }

    #[test]
    fn warmup_advances_to_first_training() {
        let change = advance(Phase::Warmup, 0, &settings(5, 10, 5, 2));
        assert_eq!(change.phase, Phase::Training);
        assert_eq!(change.current_interval, 1);
        assert_eq!(change.remaining_seconds, 10);
        assert!(!change.terminal);
    }

    #[test]
    fn training_advances_to_rest_while_intervals_remain() {
        let change = advance(Phase::Training, 1, &settings(0, 10, 5, 3));
        assert_eq!(change.phase, Phase::Rest);
        assert_eq!(change.current_interval, 1);
        assert_eq!(change.remaining_seconds, 5);
        assert!(!change.terminal);
    }

    #[test]
    fn last_training_interval_completes_the_workout() {
        let change = advance(Phase::Training, 3, &settings(0, 10, 5, 3));
        assert_eq!(change.phase, Phase::Complete);
        assert_eq!(change.current_interval, 3);
        assert_eq!(change.remaining_seconds, 0);
        assert!(change.terminal);
    }

    #[test]
    fn single_interval_skips_rest_entirely() {
        let change = advance(Phase::Training, 1, &settings(0, 3, 0, 1));
        assert_eq!(change.phase, Phase::Complete);
        assert!(change.terminal);
    }

    #[test]
    fn rest_advances_to_next_training_interval() {
        let change = advance(Phase::Rest, 1, &settings(0, 10, 5, 3));
        assert_eq!(change.phase, Phase::Training);
        assert_eq!(change.current_interval, 2);
        assert_eq!(change.remaining_seconds, 10);
        assert!(!change.terminal);
    }

    #[test]
    fn phase_labels() {
        assert_eq!(Phase::Ready.label(), "Ready");
        assert_eq!(Phase::Warmup.label(), "Warmup");
        assert_eq!(Phase::Training.label(), "Training");
        assert_eq!(Phase::Rest.label(), "Rest");
        assert_eq!(Phase::Complete.label(), "Complete!");
    }
}
