//! Parser for recommendation responses.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;
use tactician_domain::{Recommendation, RecommendationSet, DEFAULT_CATEGORY};

use super::extract::{extract_json, numbered_items};
use super::ParseTier;

/// Action name of the single entry returned when nothing could be parsed.
pub const PARSE_ERROR_ACTION: &str = "Parse error";

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRecommendations {
    pub set: RecommendationSet,
    pub tier: ParseTier,
}

/// Wire shape; `priority` defaults to list position.
#[derive(Deserialize)]
struct RecommendationEntry {
    action: String,
    reasoning: String,
    #[serde(default)]
    priority: Option<u32>,
}

/// Recover a recommendation set from `text`.
///
/// Tiers, in order: an embedded JSON object of category -> list; a bare JSON
/// list (older response shape, filed under [`DEFAULT_CATEGORY`]); a numbered
/// `N. Action - reasoning` list; a single [`PARSE_ERROR_ACTION`] entry.
/// Never fails.
pub fn parse_recommendations(text: &str) -> ParsedRecommendations {
    if let Some(parsed) = extract_json(text, decode) {
        return parsed;
    }

    let listed = numbered_items(text);
    if !listed.is_empty() {
        let recommendations = listed
            .into_iter()
            .map(|item| Recommendation::new(item.title, item.detail, item.number))
            .collect();
        return ParsedRecommendations {
            set: RecommendationSet::single(DEFAULT_CATEGORY, recommendations),
            tier: ParseTier::NumberedList,
        };
    }

    tracing::warn!(
        response_len = text.len(),
        "Could not parse recommendation response"
    );
    ParsedRecommendations {
        set: parse_error_set(),
        tier: ParseTier::Fallback,
    }
}

pub fn parse_error_set() -> RecommendationSet {
    RecommendationSet::single(
        DEFAULT_CATEGORY,
        vec![Recommendation::new(
            PARSE_ERROR_ACTION,
            "The generated recommendations could not be read.",
            1,
        )],
    )
}

fn decode(value: Value) -> Option<ParsedRecommendations> {
    match value {
        Value::Object(categories) => {
            if categories.is_empty() {
                return None;
            }
            let mut grouped = BTreeMap::new();
            for (category, entries) in categories {
                grouped.insert(category, decode_list(entries)?);
            }
            Some(ParsedRecommendations {
                set: grouped.into(),
                tier: ParseTier::Json,
            })
        }
        Value::Array(_) => {
            let list = decode_list(value)?;
            if list.is_empty() {
                return None;
            }
            Some(ParsedRecommendations {
                set: RecommendationSet::single(DEFAULT_CATEGORY, list),
                tier: ParseTier::LegacyArray,
            })
        }
        _ => None,
    }
}

fn decode_list(value: Value) -> Option<Vec<Recommendation>> {
    if !value.is_array() {
        return None;
    }
    let entries: Vec<RecommendationEntry> = serde_json::from_value(value).ok()?;
    Some(
        entries
            .into_iter()
            .enumerate()
            .map(|(i, e)| Recommendation {
                action: e.action,
                reasoning: e.reasoning,
                priority: e.priority.unwrap_or(i as u32 + 1),
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_of_categories_round_trips() {
        let mut expected = RecommendationSet::new();
        expected.insert(
            "action",
            vec![
                Recommendation::new("Scimitar", "The fighter is adjacent", 1),
                Recommendation::new("Shortbow", "Back off first", 2),
            ],
        );
        expected.insert("bonus", vec![Recommendation::new("Nimble Escape", "Disengage", 1)]);
        let text = format!(
            "My plan:\n```json\n{}\n```\nGood luck!",
            serde_json::to_string_pretty(&expected).unwrap()
        );

        let parsed = parse_recommendations(&text);

        assert_eq!(parsed.tier, ParseTier::Json);
        assert_eq!(parsed.set, expected);
    }

    #[test]
    fn bare_array_is_wrapped_under_default_category() {
        let text = r#"[{"action":"Scimitar","reasoning":"adjacent","priority":1}]"#;

        let parsed = parse_recommendations(text);

        assert_eq!(parsed.tier, ParseTier::LegacyArray);
        assert_eq!(
            parsed.set.get(DEFAULT_CATEGORY).unwrap(),
            &[Recommendation::new("Scimitar", "adjacent", 1)]
        );
    }

    #[test]
    fn missing_priority_uses_position() {
        let text = r#"{"action":[{"action":"A","reasoning":"x"},{"action":"B","reasoning":"y"}]}"#;
        let set = parse_recommendations(text).set;
        assert_eq!(set.get("action").unwrap()[1].priority, 2);
    }

    #[test]
    fn wrong_shape_is_rejected() {
        // values must be lists of {action, reasoning}
        let parsed = parse_recommendations(r#"{"action": "Scimitar"}"#);
        assert_eq!(parsed.tier, ParseTier::Fallback);
    }

    #[test]
    fn numbered_list_fallback() {
        let parsed = parse_recommendations(
            "I'd suggest:\n1. Scimitar - finish the wizard\n2. Shortbow - stay at range",
        );

        assert_eq!(parsed.tier, ParseTier::NumberedList);
        let list = parsed.set.get(DEFAULT_CATEGORY).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[1], Recommendation::new("Shortbow", "stay at range", 2));
    }

    #[test]
    fn malformed_json_without_list_yields_sentinel() {
        let parsed = parse_recommendations(r#"{"action": [{"action": "Scimitar", "#);

        assert_eq!(parsed.tier, ParseTier::Fallback);
        assert_eq!(parsed.set.total(), 1);
        assert_eq!(
            parsed.set.get(DEFAULT_CATEGORY).unwrap()[0].action,
            PARSE_ERROR_ACTION
        );
    }

    #[test]
    fn sentinel_is_deterministic() {
        assert_eq!(parse_recommendations("").set, parse_recommendations("???").set);
    }
}
