//! Content items as carried by a combatant.
//!
//! The `activities` container is kept as raw JSON: content sources disagree on
//! its shape (keyed map, list of entries, list of records), so it is decoded
//! exactly once, by the normalizer, into [`crate::Activity`] values.

use serde::{Deserialize, Deserializer, Serialize};

/// Item description as found in content data: plain text or `{ "value": ... }`.
/// A null anywhere along the way reads as an empty description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemDescription {
    Text(String),
    Rich {
        #[serde(default)]
        value: Option<String>,
    },
}

impl ItemDescription {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Rich { value } => value.as_deref().unwrap_or_default(),
        }
    }
}

fn description_or_empty<'de, D>(deserializer: D) -> Result<ItemDescription, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<ItemDescription>::deserialize(deserializer)?.unwrap_or_default())
}

impl Default for ItemDescription {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    /// Category tag such as `weapon`, `spell` or `feat`.
    #[serde(rename = "type", default)]
    pub item_type: String,
    /// Possibly markup-bearing description.
    #[serde(default, deserialize_with = "description_or_empty")]
    pub description: ItemDescription,
    #[serde(default)]
    pub activities: Option<serde_json::Value>,
}

impl ContentItem {
    pub fn new(name: impl Into<String>, item_type: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            item_type: item_type.into(),
            description: ItemDescription::default(),
            activities: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = ItemDescription::Text(description.into());
        self
    }

    pub fn with_activities(mut self, activities: serde_json::Value) -> Self {
        self.activities = Some(activities);
        self
    }
}
