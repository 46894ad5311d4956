//! Background tasks module
//!
//! This module contains background tasks that run alongside the HTTP server.

pub mod tick_driver;
pub mod console_renderer;

// Re-export main functions
pub use tick_driver::tick_driver_task;
pub use console_renderer::console_renderer_task;
