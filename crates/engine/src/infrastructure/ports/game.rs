//! Host-game collaborators: encounter reads and recommendation display.

use async_trait::async_trait;
use tactician_domain::{Combatant, Encounter, RecommendationSet};

use super::error::GameStateError;

/// Read-only access to the running encounter.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GameStatePort: Send + Sync {
    async fn current_encounter(&self) -> Result<Encounter, GameStateError>;
}

/// Where finished recommendations go.
///
/// Errors inside an implementation are the implementation's concern; nothing
/// is returned to the engine.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecommendationSink: Send + Sync {
    async fn present(&self, combatant: &Combatant, recommendations: &RecommendationSet);

    /// Single user-facing notification for a turn that could not be handled.
    async fn notify_failure(&self, message: &str);
}
