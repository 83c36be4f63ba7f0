//! Generator-independent descriptions.

use tactician_domain::{FinalAction, RawAction, DESCRIPTION_CHAR_BUDGET};

use super::markup::{clean_description, truncate_chars};

/// Describe an action from its own data: cleaned raw text, or an activity
/// summary when the text is empty after cleaning.
pub fn fallback_action(raw: &RawAction) -> FinalAction {
    let cleaned = clean_description(&raw.raw_description);
    let text = if cleaned.is_empty() {
        raw.activity_summary()
    } else {
        cleaned
    };

    FinalAction {
        name: raw.name.clone(),
        description: truncate_chars(&text, DESCRIPTION_CHAR_BUDGET),
        activation_time: raw.activation_time.clone(),
        item_type: raw.item_type.clone(),
    }
}

pub fn fallback_actions(raw: &[RawAction]) -> Vec<FinalAction> {
    raw.iter().map(fallback_action).collect()
}

/// Enforce the description budget on a generated action.
pub fn cap_description(mut action: FinalAction) -> FinalAction {
    action.description = truncate_chars(&action.description, DESCRIPTION_CHAR_BUDGET);
    action
}
