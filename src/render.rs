//! Text rendering of the workout state

use crate::config::WorkoutSettings;
use crate::state::WorkoutState;

/// Format a second count as a zero-padded MM:SS clock.
///
/// Minutes are unbounded; 3600s renders as "60:00".
pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Format the interval counter, e.g. "Interval: 2/4"
pub fn interval_counter(workout: &WorkoutState, settings: &WorkoutSettings) -> String {
    format!(
        "Interval: {}/{}",
        workout.current_interval, settings.interval_count
    )
}

/// Render the full one-line display: clock, phase label, interval counter
pub fn render_line(workout: &WorkoutState, settings: &WorkoutSettings) -> String {
    format!(
        "{} {} {}",
        format_clock(workout.remaining_seconds),
        workout.phase.label(),
        interval_counter(workout, settings)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Phase;

    #[test]
    fn clock_is_zero_padded() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(5), "00:05");
        assert_eq!(format_clock(65), "01:05");
        assert_eq!(format_clock(600), "10:00");
    }

    #[test]
    fn clock_minutes_are_unbounded() {
        assert_eq!(format_clock(3600), "60:00");
        assert_eq!(format_clock(6000), "100:00");
    }

    #[test]
    fn full_line_rendering() {
        let workout = WorkoutState {
            running: true,
            paused: false,
            phase: Phase::Training,
            current_interval: 2,
            remaining_seconds: 27,
        };
        let settings = WorkoutSettings {
            warmup_seconds: 10,
            training_seconds: 30,
            rest_seconds: 15,
            interval_count: 4,
        };
        assert_eq!(render_line(&workout, &settings), "00:27 Training Interval: 2/4");
    }
}
