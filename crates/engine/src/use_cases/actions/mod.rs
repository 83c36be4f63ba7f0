//! Ability normalization and the per-entity action description cache.

mod cache;
mod fallback;
mod markup;
mod normalizer;

pub use cache::ActionDescriptionCache;
pub use fallback::{cap_description, fallback_action, fallback_actions};
pub use markup::{clean_description, truncate_chars};
pub use normalizer::{normalize, normalize_item, NormalizeError};
