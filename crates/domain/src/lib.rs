//! Tactician domain types.
//!
//! Pure data: combatants and encounters as the host game exposes them, the
//! canonical ability shapes the engine derives from content items, and the
//! recommendation types handed to the display. No I/O lives here.

pub mod action;
pub mod combatant;
pub mod error;
pub mod item;
pub mod recommendation;

pub use action::{
    ActivationTime, Activity, ActivityRange, ActivitySave, ActivityTarget, DamagePart,
    FinalAction, RawAction, DESCRIPTION_CHAR_BUDGET,
};
pub use combatant::{
    Combatant, CombatantId, Encounter, Position, ResourcePool, Resources, Vitals,
    DEFAULT_GRID_SIZE, FEET_PER_GRID_CELL,
};
pub use error::DomainError;
pub use item::{ContentItem, ItemDescription};
pub use recommendation::{
    clamp_recommendation_count, group_by_category, ActivationCategory, Difficulty,
    Recommendation, RecommendationSet, DEFAULT_CATEGORY, MAX_RECOMMENDATIONS,
    MIN_RECOMMENDATIONS,
};
