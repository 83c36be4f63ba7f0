//! Tactician engine library.
//!
//! Turns an NPC's content items into short action descriptions, and a combat
//! snapshot into ranked tactical recommendations for that NPC's turn.
//!
//! ## Structure
//!
//! - `use_cases/` - Action cache, prompt building, response parsing, turn orchestration
//! - `infrastructure/` - External dependency implementations (ports + adapters)
//! - `app` - Application composition

pub mod app;
pub mod infrastructure;
pub mod use_cases;

/// Shared fakes and builders for unit tests.
#[cfg(test)]
pub mod test_fixtures;

pub use app::App;
