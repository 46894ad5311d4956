//! Configuration and CLI argument handling

use clap::Parser;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Documented fallback values for workout settings
pub const DEFAULT_WARMUP_SECONDS: u64 = 0;
pub const DEFAULT_TRAINING_SECONDS: u64 = 1;
pub const DEFAULT_REST_SECONDS: u64 = 0;
pub const DEFAULT_INTERVAL_COUNT: u32 = 1;

/// CLI argument parsing structure
#[derive(Parser)]
#[command(name = "interval-bell")]
#[command(about = "A state-managed HTTP server that runs an interval workout timer")]
#[command(version = "0.1.0")]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20853")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Warmup duration in seconds
    #[arg(long, default_value = "0")]
    pub warmup: u64,

    /// Training interval duration in seconds
    #[arg(long, default_value = "1")]
    pub training: u64,

    /// Rest duration in seconds
    #[arg(long, default_value = "0")]
    pub rest: u64,

    /// Number of training intervals per workout
    #[arg(short, long, default_value = "1")]
    pub intervals: u32,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Build the initial workout settings from the CLI arguments
    pub fn workout_settings(&self) -> WorkoutSettings {
        WorkoutSettings {
            warmup_seconds: self.warmup,
            training_seconds: self.training,
            rest_seconds: self.rest,
            interval_count: self.intervals,
        }
        .normalized()
    }
}

/// Durations and counts that define one workout.
///
/// Snapshotted when a run starts; the scheduler only ever reads the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutSettings {
    pub warmup_seconds: u64,
    pub training_seconds: u64,
    pub rest_seconds: u64,
    pub interval_count: u32,
}

impl WorkoutSettings {
    /// Clamp fields to their documented minimums.
    ///
    /// Warmup and rest may be zero (the phase is skipped); a workout always
    /// has at least one training second and one interval.
    pub fn normalized(mut self) -> Self {
        self.training_seconds = self.training_seconds.max(1);
        self.interval_count = self.interval_count.max(1);
        self
    }

    /// Build settings from a client update, substituting the documented
    /// default for any field that is absent or not a non-negative integer.
    pub fn from_update(update: &SettingsUpdate) -> Self {
        Self {
            warmup_seconds: lenient_count(update.warmup_seconds.as_ref())
                .unwrap_or(DEFAULT_WARMUP_SECONDS),
            training_seconds: lenient_count(update.training_seconds.as_ref())
                .unwrap_or(DEFAULT_TRAINING_SECONDS),
            rest_seconds: lenient_count(update.rest_seconds.as_ref())
                .unwrap_or(DEFAULT_REST_SECONDS),
            interval_count: lenient_count(update.interval_count.as_ref())
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(DEFAULT_INTERVAL_COUNT),
        }
        .normalized()
    }
}

impl Default for WorkoutSettings {
    fn default() -> Self {
        Self {
            warmup_seconds: DEFAULT_WARMUP_SECONDS,
            training_seconds: DEFAULT_TRAINING_SECONDS,
            rest_seconds: DEFAULT_REST_SECONDS,
            interval_count: DEFAULT_INTERVAL_COUNT,
        }
    }
}

/// Raw settings update as sent by clients.
///
/// Fields are untyped on purpose: clients get the parse-or-default policy
/// rather than a 422, so each value is inspected leniently.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsUpdate {
    #[serde(default)]
    pub warmup_seconds: Option<Value>,
    #[serde(default)]
    pub training_seconds: Option<Value>,
    #[serde(default)]
    pub rest_seconds: Option<Value>,
    #[serde(default)]
    pub interval_count: Option<Value>,
}

/// Accept a JSON number or a numeric string; anything else is a parse failure
fn lenient_count(value: Option<&Value>) -> Option<u64> {
    match value {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
}
