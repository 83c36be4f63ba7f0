//! Prompt for condensing an entity's abilities into short descriptions.

use serde::Serialize;
use tactician_domain::{Activity, RawAction, DESCRIPTION_CHAR_BUDGET};

use crate::use_cases::actions::clean_description;

pub const DESCRIPTION_SYSTEM_PROMPT: &str = "You condense tabletop RPG abilities into short, \
tactically useful descriptions. You always answer with a JSON array and nothing else.";

/// What the generator sees of one ability: markup already stripped.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PromptAbility<'a> {
    name: &'a str,
    item_type: &'a str,
    activation_time: &'a str,
    description: String,
    activities: &'a [Activity],
}

pub fn build_description_prompt(entity_name: &str, actions: &[RawAction]) -> String {
    let abilities: Vec<PromptAbility<'_>> = actions
        .iter()
        .map(|a| PromptAbility {
            name: &a.name,
            item_type: &a.item_type,
            activation_time: a.activation_time.as_str(),
            description: clean_description(&a.raw_description),
            activities: &a.activities,
        })
        .collect();
    let abilities_json =
        serde_json::to_string_pretty(&abilities).unwrap_or_else(|_| "[]".to_string());

    format!(
        r#"Summarize the abilities of "{name}" for a tactical combat assistant.

ABILITIES (JSON):
{abilities}

Return a JSON array. Each element is an object with exactly these string fields:
"name", "description", "activationTime", "itemType".

Rules:
- One element per ability. When a single ability has several materially different uses (for example an item that casts several different spells), emit one element per use and name each use.
- "description": at most {budget} characters. Focus on damage, range, saving throws, healing and conditions inflicted.
- "activationTime": keep the ability's value (action, bonus, reaction, legendary, lair, ...) unless a use has its own.
- "itemType": copy it from the ability.

Respond with the JSON array only."#,
        name = entity_name,
        abilities = abilities_json,
        budget = DESCRIPTION_CHAR_BUDGET,
    )
}
