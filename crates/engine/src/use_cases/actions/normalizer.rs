//! Ability normalizer.
//!
//! Content sources disagree on how an item's activities are laid out: a map
//! keyed by activity id, a list of `[id, activity]` pairs, or a plain list of
//! activity records. Damage parts come as `[formula, type]` pairs or as labeled
//! objects. Everything is decoded here, once, into [`RawAction`]; nothing
//! downstream looks at the raw shapes again.

use serde_json::{Map, Value};
use tactician_domain::{
    ActivationTime, Activity, ActivityRange, ActivitySave, ActivityTarget, ContentItem,
    DamagePart, RawAction,
};

/// A single item whose activity data could not be decoded.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NormalizeError {
    #[error("item '{item}': activities container is a {found}, expected a map or list")]
    MalformedContainer { item: String, found: &'static str },
    #[error("item '{item}': activity #{index} is a {found}, expected an object")]
    MalformedActivity {
        item: String,
        index: usize,
        found: &'static str,
    },
}

/// Normalize every item that exposes at least one activity.
///
/// Items without activities are skipped silently. Malformed items are logged
/// and skipped; the rest of the batch is still normalized.
pub fn normalize(items: &[ContentItem]) -> Vec<RawAction> {
    items
        .iter()
        .filter_map(|item| match normalize_item(item) {
            Ok(action) => action,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping item with malformed activities");
                None
            }
        })
        .collect()
}

/// Normalize one item. `Ok(None)` when it has no activities.
pub fn normalize_item(item: &ContentItem) -> Result<Option<RawAction>, NormalizeError> {
    let records = activity_records(item)?;
    if records.is_empty() {
        return Ok(None);
    }

    let activities: Vec<Activity> = records.into_iter().map(decode_activity).collect();

    Ok(Some(RawAction {
        name: item.name.clone(),
        item_type: item.item_type.clone(),
        activation_time: collapse_activation(&activities),
        raw_description: item.description.as_str().to_string(),
        activities,
    }))
}

fn activity_records(item: &ContentItem) -> Result<Vec<&Map<String, Value>>, NormalizeError> {
    let entries: Vec<&Value> = match &item.activities {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Object(map)) => map.values().collect(),
        Some(Value::Array(list)) => list
            .iter()
            .map(|entry| match entry.as_array() {
                // `[id, activity]` pair as produced by map-to-entries conversion
                Some(pair) if pair.len() == 2 && pair[0].is_string() => &pair[1],
                _ => entry,
            })
            .collect(),
        Some(other) => {
            return Err(NormalizeError::MalformedContainer {
                item: item.name.clone(),
                found: kind_of(other),
            })
        }
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            entry
                .as_object()
                .ok_or_else(|| NormalizeError::MalformedActivity {
                    item: item.name.clone(),
                    index,
                    found: kind_of(entry),
                })
        })
        .collect()
}

fn decode_activity(record: &Map<String, Value>) -> Activity {
    Activity {
        name: non_empty_str(record.get("name")),
        kind: non_empty_str(record.get("type")),
        activation: activation_tag(record),
        damage: record.get("damage").map(damage_parts).unwrap_or_default(),
        range: record.get("range").and_then(decode_range),
        target: record.get("target").and_then(decode_target),
        save: record.get("save").and_then(decode_save),
        healing: record.get("healing").and_then(decode_damage_part),
    }
}

fn activation_tag(record: &Map<String, Value>) -> Option<String> {
    match record.get("activation") {
        Some(Value::Object(activation)) => non_empty_str(activation.get("type")),
        Some(Value::String(_)) => non_empty_str(record.get("activation")),
        _ => non_empty_str(record.get("activationType")),
    }
}

/// One distinct tag wins, two or more collapse to `Multiple`, none means `Action`.
fn collapse_activation(activities: &[Activity]) -> ActivationTime {
    let mut distinct: Vec<ActivationTime> = Vec::new();
    for tag in activities.iter().filter_map(|a| a.activation.as_deref()) {
        let time = ActivationTime::from_tag(tag);
        if !distinct.contains(&time) {
            distinct.push(time);
        }
    }

    match distinct.len() {
        0 => ActivationTime::Action,
        1 => distinct.remove(0),
        _ => ActivationTime::Multiple,
    }
}

fn damage_parts(value: &Value) -> Vec<DamagePart> {
    let parts = match value {
        Value::Object(damage) => match damage.get("parts") {
            Some(Value::Array(parts)) => parts,
            _ => return Vec::new(),
        },
        Value::Array(parts) => parts,
        _ => return Vec::new(),
    };

    parts.iter().filter_map(decode_damage_part).collect()
}

fn decode_damage_part(value: &Value) -> Option<DamagePart> {
    match value {
        Value::Array(pair) => {
            let formula = non_empty_str(pair.first())?;
            let damage_type = pair
                .get(1)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            Some(DamagePart {
                formula,
                damage_type,
            })
        }
        Value::Object(part) => Some(DamagePart {
            formula: part_formula(part)?,
            damage_type: part_type(part),
        }),
        _ => None,
    }
}

fn part_formula(part: &Map<String, Value>) -> Option<String> {
    if let Some(Value::Object(custom)) = part.get("custom") {
        let enabled = custom.get("enabled").and_then(Value::as_bool).unwrap_or(true);
        if let Some(formula) = non_empty_str(custom.get("formula")).filter(|_| enabled) {
            return Some(formula);
        }
    }
    if let Some(formula) = non_empty_str(part.get("formula")) {
        return Some(formula);
    }

    let number = part.get("number").and_then(lenient_number)?;
    let denomination = part.get("denomination").and_then(lenient_number)?;
    let mut formula = format!("{}d{}", number, denomination);
    if let Some(bonus) = non_empty_str(part.get("bonus")) {
        if bonus.starts_with('+') || bonus.starts_with('-') {
            formula.push_str(&bonus);
        } else {
            formula.push('+');
            formula.push_str(&bonus);
        }
    }
    Some(formula)
}

fn part_type(part: &Map<String, Value>) -> String {
    if let Some(kind) = non_empty_str(part.get("type")) {
        return kind;
    }
    match part.get("types") {
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join("/"),
        _ => String::new(),
    }
}

fn decode_range(value: &Value) -> Option<ActivityRange> {
    let range = value.as_object()?;
    let decoded = ActivityRange {
        value: range.get("value").and_then(lenient_float),
        unit: non_empty_str(range.get("units")).or_else(|| non_empty_str(range.get("unit"))),
        long: range.get("long").and_then(lenient_float),
    };
    if decoded.value.is_none() && decoded.unit.is_none() && decoded.long.is_none() {
        return None;
    }
    Some(decoded)
}

fn decode_target(value: &Value) -> Option<ActivityTarget> {
    let target = value.as_object()?;
    let target = match target.get("affects") {
        Some(Value::Object(affects)) => affects,
        _ => target,
    };

    let decoded = ActivityTarget {
        count: target
            .get("count")
            .or_else(|| target.get("value"))
            .and_then(lenient_number),
        target_type: non_empty_str(target.get("type")),
    };
    if decoded.count.is_none() && decoded.target_type.is_none() {
        return None;
    }
    Some(decoded)
}

fn decode_save(value: &Value) -> Option<ActivitySave> {
    let save = value.as_object()?;
    let ability = match save.get("ability") {
        Some(Value::Array(abilities)) => {
            let joined = abilities
                .iter()
                .filter_map(Value::as_str)
                .filter(|a| !a.is_empty())
                .collect::<Vec<_>>()
                .join("/");
            Some(joined).filter(|a| !a.is_empty())
        }
        other => non_empty_str(other),
    }?;

    let dc = match save.get("dc") {
        Some(Value::Object(dc)) => dc.get("value").and_then(lenient_number),
        Some(other) => lenient_number(other),
        None => None,
    };

    Some(ActivitySave { ability, dc })
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn lenient_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn lenient_number(value: &Value) -> Option<u32> {
    lenient_float(value)
        .filter(|n| *n >= 0.0 && n.fract() == 0.0)
        .map(|n| n as u32)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "map",
    }
}
