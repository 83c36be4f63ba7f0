//! Tactical recommendation types.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::action::{ActivationTime, FinalAction};
use crate::error::DomainError;

/// Category key used when a response carries no category information.
pub const DEFAULT_CATEGORY: &str = "action";

/// Fewest / most recommendations that may be requested per category.
pub const MIN_RECOMMENDATIONS: usize = 1;
pub const MAX_RECOMMENDATIONS: usize = 5;

/// Behavioral preset, ordered from most cautious to most lethal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
    Deadly,
    /// Total party kill: no restraint at all.
    Tpk,
}

impl Difficulty {
    pub const ALL: [Difficulty; 5] = [
        Difficulty::Easy,
        Difficulty::Normal,
        Difficulty::Hard,
        Difficulty::Deadly,
        Difficulty::Tpk,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Normal => "normal",
            Self::Hard => "hard",
            Self::Deadly => "deadly",
            Self::Tpk => "tpk",
        }
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::Normal
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "normal" => Ok(Self::Normal),
            "hard" => Ok(Self::Hard),
            "deadly" => Ok(Self::Deadly),
            "tpk" | "brutal" => Ok(Self::Tpk),
            other => Err(DomainError::parse(format!("Unknown difficulty: {}", other))),
        }
    }
}

/// Grouping used for available actions and for recommendation keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivationCategory {
    Action,
    Bonus,
    Reaction,
    Legendary,
    Lair,
    Other,
}

impl ActivationCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Action => "action",
            Self::Bonus => "bonus",
            Self::Reaction => "reaction",
            Self::Legendary => "legendary",
            Self::Lair => "lair",
            Self::Other => "other",
        }
    }

    /// Heading used when listing actions of this category.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Action => "Actions",
            Self::Bonus => "Bonus Actions",
            Self::Reaction => "Reactions",
            Self::Legendary => "Legendary Actions",
            Self::Lair => "Lair Actions",
            Self::Other => "Other",
        }
    }
}

impl From<&ActivationTime> for ActivationCategory {
    fn from(value: &ActivationTime) -> Self {
        match value {
            ActivationTime::Action => Self::Action,
            ActivationTime::Bonus => Self::Bonus,
            ActivationTime::Reaction => Self::Reaction,
            ActivationTime::Multiple => Self::Other,
            ActivationTime::Other(tag) => match tag.to_ascii_lowercase().as_str() {
                "legendary" => Self::Legendary,
                "lair" => Self::Lair,
                _ => Self::Other,
            },
        }
    }
}

impl fmt::Display for ActivationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Group actions by activation category, preserving input order within a group.
pub fn group_by_category(actions: &[FinalAction]) -> BTreeMap<ActivationCategory, Vec<FinalAction>> {
    let mut grouped: BTreeMap<ActivationCategory, Vec<FinalAction>> = BTreeMap::new();
    for action in actions {
        grouped
            .entry(ActivationCategory::from(&action.activation_time))
            .or_default()
            .push(action.clone());
    }
    grouped
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub action: String,
    pub reasoning: String,
    pub priority: u32,
}

impl Recommendation {
    pub fn new(action: impl Into<String>, reasoning: impl Into<String>, priority: u32) -> Self {
        Self {
            action: action.into(),
            reasoning: reasoning.into(),
            priority,
        }
    }
}

/// Ordered recommendations keyed by activation category.
///
/// Keys are kept as strings: generated responses may carry categories this
/// crate does not enumerate, and those are displayed as-is.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecommendationSet(BTreeMap<String, Vec<Recommendation>>);

impl RecommendationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A set holding one list under `category`.
    pub fn single(category: impl Into<String>, recommendations: Vec<Recommendation>) -> Self {
        let mut set = Self::new();
        set.insert(category, recommendations);
        set
    }

    pub fn insert(&mut self, category: impl Into<String>, recommendations: Vec<Recommendation>) {
        self.0.insert(category.into(), recommendations);
    }

    pub fn get(&self, category: &str) -> Option<&[Recommendation]> {
        self.0.get(category).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Recommendation])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(Vec::is_empty)
    }

    /// Number of recommendations across all categories.
    pub fn total(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }
}

impl From<BTreeMap<String, Vec<Recommendation>>> for RecommendationSet {
    fn from(value: BTreeMap<String, Vec<Recommendation>>) -> Self {
        Self(value)
    }
}

/// Clamp a requested recommendation count into the supported range.
pub fn clamp_recommendation_count(count: usize) -> usize {
    count.clamp(MIN_RECOMMENDATIONS, MAX_RECOMMENDATIONS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(name: &str, activation: ActivationTime) -> FinalAction {
        FinalAction {
            name: name.into(),
            description: String::new(),
            activation_time: activation,
            item_type: "feat".into(),
        }
    }

    #[test]
    fn difficulty_parses_case_insensitively() {
        assert_eq!("Deadly".parse::<Difficulty>().unwrap(), Difficulty::Deadly);
        assert!("heroic".parse::<Difficulty>().is_err());
    }

    #[test]
    fn tpk_is_the_top_tier() {
        assert_eq!("tpk".parse::<Difficulty>().unwrap(), Difficulty::Tpk);
        assert_eq!("TPK".parse::<Difficulty>().unwrap(), Difficulty::Tpk);
        assert_eq!("brutal".parse::<Difficulty>().unwrap(), Difficulty::Tpk);
        assert_eq!(Difficulty::Tpk.to_string(), "tpk");
        assert_eq!(serde_json::to_value(Difficulty::Tpk).unwrap(), "tpk");
    }

    #[test]
    fn difficulties_are_ordered_cautious_to_lethal() {
        let mut sorted = Difficulty::ALL;
        sorted.sort();
        assert_eq!(sorted, Difficulty::ALL);
        assert!(Difficulty::Easy < Difficulty::Tpk);
    }

    #[test]
    fn grouping_maps_activation_to_category() {
        let grouped = group_by_category(&[
            action("Scimitar", ActivationTime::Action),
            action("Nimble Escape", ActivationTime::Bonus),
            action("Tail Swipe", ActivationTime::Other("legendary".into())),
            action("Shortbow", ActivationTime::Action),
            action("Staff of Power", ActivationTime::Multiple),
        ]);

        let names: Vec<_> = grouped[&ActivationCategory::Action]
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(names, vec!["Scimitar", "Shortbow"]);
        assert_eq!(grouped[&ActivationCategory::Bonus].len(), 1);
        assert_eq!(grouped[&ActivationCategory::Legendary].len(), 1);
        assert_eq!(grouped[&ActivationCategory::Other].len(), 1);
        assert!(!grouped.contains_key(&ActivationCategory::Reaction));
    }

    #[test]
    fn recommendation_set_serializes_as_plain_object() {
        let set = RecommendationSet::single(
            "bonus",
            vec![Recommendation::new("Nimble Escape", "Disengage", 1)],
        );
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json["bonus"][0]["action"], "Nimble Escape");
        assert_eq!(set.total(), 1);
    }

    #[test]
    fn recommendation_count_is_clamped() {
        assert_eq!(clamp_recommendation_count(0), 1);
        assert_eq!(clamp_recommendation_count(3), 3);
        assert_eq!(clamp_recommendation_count(9), 5);
    }
}
