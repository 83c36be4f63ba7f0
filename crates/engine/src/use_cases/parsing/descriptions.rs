//! Parser for description-generation responses.

use serde_json::Value;
use tactician_domain::{ActivationTime, FinalAction, RawAction};

use super::extract::{extract_json, numbered_items};
use super::ParseTier;
use crate::use_cases::actions::fallback_actions;

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedActions {
    pub actions: Vec<FinalAction>,
    pub tier: ParseTier,
}

/// Recover the generated action list from `text`.
///
/// Tiers, in order: an embedded non-empty JSON array of
/// `{name, description, activationTime, itemType}`; a numbered
/// `N. Name - description` list; descriptions derived from `source` itself.
/// Never fails.
pub fn parse_action_descriptions(text: &str, source: &[RawAction]) -> ParsedActions {
    if let Some(actions) = extract_json(text, decode_action_array) {
        return ParsedActions {
            actions,
            tier: ParseTier::Json,
        };
    }

    let listed = numbered_items(text);
    if !listed.is_empty() {
        tracing::debug!(count = listed.len(), "Description response parsed as numbered list");
        let actions = listed
            .into_iter()
            .map(|item| {
                let raw = source
                    .iter()
                    .find(|r| r.name.eq_ignore_ascii_case(&item.title));
                FinalAction {
                    activation_time: raw
                        .map(|r| r.activation_time.clone())
                        .unwrap_or(ActivationTime::Action),
                    item_type: raw.map(|r| r.item_type.clone()).unwrap_or_default(),
                    name: item.title,
                    description: item.detail,
                }
            })
            .collect();
        return ParsedActions {
            actions,
            tier: ParseTier::NumberedList,
        };
    }

    tracing::warn!(
        response_len = text.len(),
        "Could not parse description response, deriving descriptions"
    );
    ParsedActions {
        actions: fallback_actions(source),
        tier: ParseTier::Fallback,
    }
}

fn decode_action_array(value: Value) -> Option<Vec<FinalAction>> {
    if !value.is_array() {
        return None;
    }
    serde_json::from_value::<Vec<FinalAction>>(value)
        .ok()
        .filter(|actions| !actions.is_empty())
}
