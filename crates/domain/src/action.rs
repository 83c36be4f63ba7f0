//! Canonical ability shapes.
//!
//! `RawAction` is what the normalizer produces from a content item: one entry per
//! item, aggregating every activity the item exposes. `FinalAction` is the
//! condensed shape consumers (prompts, display) work with once a description has
//! been generated or derived.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Maximum length, in characters, of a `FinalAction` description.
pub const DESCRIPTION_CHAR_BUDGET: usize = 150;

/// The turn-economy slot an ability consumes.
///
/// Values outside the well-known set are preserved verbatim in `Other`
/// (e.g. `"legendary"`, `"lair"`, `"minute"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActivationTime {
    Action,
    Bonus,
    Reaction,
    /// The item exposes two or more distinct activation types.
    Multiple,
    Other(String),
}

impl ActivationTime {
    /// Interpret an activation tag as found in content data.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "action" => Self::Action,
            "bonus" => Self::Bonus,
            "reaction" => Self::Reaction,
            "multiple" => Self::Multiple,
            _ => Self::Other(tag.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Action => "action",
            Self::Bonus => "bonus",
            Self::Reaction => "reaction",
            Self::Multiple => "multiple",
            Self::Other(tag) => tag,
        }
    }
}

impl Default for ActivationTime {
    fn default() -> Self {
        Self::Action
    }
}

impl fmt::Display for ActivationTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for ActivationTime {
    fn from(value: String) -> Self {
        Self::from_tag(&value)
    }
}

impl From<&str> for ActivationTime {
    fn from(value: &str) -> Self {
        Self::from_tag(value)
    }
}

impl From<ActivationTime> for String {
    fn from(value: ActivationTime) -> Self {
        match value {
            ActivationTime::Other(tag) => tag,
            other => other.as_str().to_string(),
        }
    }
}

/// A damage (or healing) roll: dice formula plus damage type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamagePart {
    pub formula: String,
    #[serde(rename = "type")]
    pub damage_type: String,
}

impl fmt::Display for DamagePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.damage_type.is_empty() {
            write!(f, "{}", self.formula)
        } else {
            write!(f, "{} {}", self.formula, self.damage_type)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ActivityRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ActivityTarget {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub target_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivitySave {
    pub ability: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dc: Option<u32>,
}

/// One use of an item (an attack, a save effect, a heal, ...).
///
/// Every detail is optional; content sources vary widely in what they fill in.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activation: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub damage: Vec<DamagePart>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<ActivityRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<ActivityTarget>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save: Option<ActivitySave>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub healing: Option<DamagePart>,
}

impl Activity {
    /// Short mechanical summary, e.g. `"1d6+2 slashing; DC 13 dex save; 30 ft"`.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();

        if !self.damage.is_empty() {
            parts.push(
                self.damage
                    .iter()
                    .map(DamagePart::to_string)
                    .collect::<Vec<_>>()
                    .join(" + "),
            );
        }
        if let Some(healing) = &self.healing {
            parts.push(format!("heals {}", healing.formula));
        }
        if let Some(save) = &self.save {
            match save.dc {
                Some(dc) => parts.push(format!("DC {} {} save", dc, save.ability)),
                None => parts.push(format!("{} save", save.ability)),
            }
        }
        if let Some(range) = &self.range {
            if let Some(value) = range.value {
                let unit = range.unit.as_deref().unwrap_or("ft");
                match range.long {
                    Some(long) => parts.push(format!("{}/{} {}", value, long, unit)),
                    None => parts.push(format!("{} {}", value, unit)),
                }
            }
        }

        parts.join("; ")
    }
}

/// Normalized ability extracted from one content item.
///
/// Transient: built fresh for each description-generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAction {
    pub name: String,
    pub item_type: String,
    pub activation_time: ActivationTime,
    pub raw_description: String,
    pub activities: Vec<Activity>,
}

impl RawAction {
    /// Summaries of every activity that has mechanical detail, joined.
    pub fn activity_summary(&self) -> String {
        self.activities
            .iter()
            .map(Activity::summary)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

/// Condensed action as stored in the description cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalAction {
    pub name: String,
    pub description: String,
    pub activation_time: ActivationTime,
    pub item_type: String,
}
