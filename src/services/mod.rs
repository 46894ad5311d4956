//! External sinks module
//!
//! This module contains the collaborators that receive scheduler
//! notifications but hold no decision logic, like audio cue playback.

pub mod audio;

// Re-export main functions
pub use audio::*;
