//! Plain-text rendering of markup-bearing item descriptions.
//!
//! Content descriptions carry HTML, entity escapes, inline roll syntax
//! (`[[/r 1d6]]`) and content links (`@UUID[Item.abc]{Longsword}`). The
//! fallback path shows them to the recommender verbatim, so they are reduced
//! to readable text first.

use regex_lite::Regex;
use std::sync::LazyLock;

static CONTENT_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@[A-Za-z]+\[[^\]]*\](?:\{([^}]*)\})?").expect("valid regex")
});
static INLINE_ROLL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[/[A-Za-z]+\s+([^\]]*?)\]\](?:\{([^}]*)\})?").expect("valid regex")
});
static HTML_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));
static NUMERIC_ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#(x?[0-9A-Fa-f]+);").expect("valid regex"));
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

const NAMED_ENTITIES: [(&str, &str); 6] = [
    ("&nbsp;", " "),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&apos;", "'"),
    ("&amp;", "&"),
];

/// Strip markup and collapse whitespace.
pub fn clean_description(raw: &str) -> String {
    let text = CONTENT_LINK_RE.replace_all(raw, |caps: &regex_lite::Captures| {
        caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_default()
    });
    let text = INLINE_ROLL_RE.replace_all(&text, |caps: &regex_lite::Captures| {
        caps.get(2)
            .or_else(|| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default()
    });
    let text = HTML_TAG_RE.replace_all(&text, " ");
    let text = decode_entities(&text);
    WHITESPACE_RE.replace_all(&text, " ").trim().to_string()
}

fn decode_entities(text: &str) -> String {
    let text = NUMERIC_ENTITY_RE.replace_all(text, |caps: &regex_lite::Captures| {
        let code = &caps[1];
        let parsed = match code.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => code.parse::<u32>().ok(),
        };
        parsed
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_default()
    });

    // `&amp;` last so `&amp;lt;` decodes to `&lt;`, not `<`
    NAMED_ENTITIES
        .iter()
        .fold(text.into_owned(), |acc, (entity, ch)| acc.replace(entity, ch))
}

/// Cap `text` at `budget` characters, marking the cut with `...`.
pub fn truncate_chars(text: &str, budget: usize) -> String {
    if text.chars().count() <= budget {
        return text.to_string();
    }
    if budget <= 3 {
        return text.chars().take(budget).collect();
    }
    let head: String = text.chars().take(budget - 3).collect();
    format!("{}...", head.trim_end())
}
