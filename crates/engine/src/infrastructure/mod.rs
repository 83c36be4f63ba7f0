//! Infrastructure implementations.
//!
//! Contains port trait implementations for external dependencies.

pub mod app_settings;
pub mod cache;
pub mod clock;
pub mod console_sink;
pub mod correlation;
pub mod game_state;
pub mod llm;
pub mod ports;
