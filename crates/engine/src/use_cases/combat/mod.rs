//! NPC turn handling: situation snapshot, recommendation, display.

mod fallback;
mod orchestrator;
mod precache;
mod situation;

pub use fallback::fallback_recommendations;
pub use orchestrator::{
    RecommendationSource, TurnError, TurnOrchestrator, TurnPhase, TurnReport,
};
pub use precache::precache_encounter;
pub use situation::{
    initiative_order, CombatSituation, CombatSituationAnalyzer, CombatantSummary,
    InitiativeEntry, NpcStatus,
};
