//! Best-effort parsing of generated text.
//!
//! Generated responses wrap their JSON in prose, code fences, or skip JSON
//! altogether. Each parser walks a fixed chain of tiers and always returns a
//! value; the tier reached is reported alongside it for logging.

mod descriptions;
mod extract;
mod recommendations;

pub use descriptions::{parse_action_descriptions, ParsedActions};
pub use extract::{extract_json, json_candidates, numbered_items, NumberedItem};
pub use recommendations::{
    parse_error_set, parse_recommendations, ParsedRecommendations, PARSE_ERROR_ACTION,
};

/// Which strategy produced a parse result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseTier {
    /// Embedded JSON of the expected shape.
    Json,
    /// A bare list where a category object was expected.
    LegacyArray,
    /// `N. Name - text` lines.
    NumberedList,
    /// Nothing usable; deterministic substitute.
    Fallback,
}

impl ParseTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::LegacyArray => "legacy_array",
            Self::NumberedList => "numbered_list",
            Self::Fallback => "fallback",
        }
    }
}

impl std::fmt::Display for ParseTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
