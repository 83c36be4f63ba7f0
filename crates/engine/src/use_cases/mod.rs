//! Use cases - the engine's behavior, independent of transport.
//!
//! - `actions` - ability normalization and the description cache
//! - `prompts` - prompt text for both generation calls
//! - `parsing` - recovering structured output from generated text
//! - `combat` - situation analysis and turn orchestration

pub mod actions;
pub mod combat;
pub mod parsing;
pub mod prompts;

pub use actions::ActionDescriptionCache;
pub use combat::{CombatSituationAnalyzer, TurnOrchestrator};
