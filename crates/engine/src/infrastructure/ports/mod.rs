//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - Text generation (OpenAI-compatible, Anthropic, Gemini)
//! - Game state reads (host game, JSON snapshot file)
//! - Recommendation display
//! - Clock (for testing)

mod error;
mod external;
mod game;
mod testing;

pub use error::{GameStateError, LlmError};
pub use external::{FinishReason, LlmPort, LlmRequest, LlmResponse, Usage};
pub use game::{GameStatePort, RecommendationSink};
pub use testing::ClockPort;

#[cfg(test)]
pub use game::{MockGameStatePort, MockRecommendationSink};
#[cfg(test)]
pub use testing::MockClockPort;
