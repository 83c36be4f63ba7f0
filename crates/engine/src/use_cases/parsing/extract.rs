//! Locating JSON inside free-form generated text.

use regex_lite::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// `1. Name - reasoning`, also `1)` and markdown-bold names.
static NUMBERED_ITEM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*(\d+)[.)]\s+(.+?)\s*(?:-|–|:)\s+(.+?)\s*$").expect("valid regex")
});

/// Every JSON value that starts at a `[` or `{` in `text`, in order of position.
///
/// Decoding stops at the end of the value, so trailing prose is ignored.
/// Positions that do not start a well-formed value are skipped.
pub fn json_candidates(text: &str) -> impl Iterator<Item = Value> + '_ {
    text.char_indices()
        .filter(|(_, c)| *c == '[' || *c == '{')
        .filter_map(move |(start, _)| {
            serde_json::Deserializer::from_str(&text[start..])
                .into_iter::<Value>()
                .next()
                .and_then(Result::ok)
        })
}

/// First embedded JSON value accepted by `accept`.
pub fn extract_json<T>(text: &str, accept: impl FnMut(Value) -> Option<T>) -> Option<T> {
    json_candidates(text).find_map(accept)
}

/// One `N. title - detail` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberedItem {
    pub number: u32,
    pub title: String,
    pub detail: String,
}

pub fn numbered_items(text: &str) -> Vec<NumberedItem> {
    NUMBERED_ITEM_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let number = caps[1].parse().ok()?;
            let title = caps[2].trim().trim_matches('*').trim().to_string();
            if title.is_empty() {
                return None;
            }
            Some(NumberedItem {
                number,
                title,
                detail: caps[3].trim().to_string(),
            })
        })
        .collect()
}
