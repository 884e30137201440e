//! Schema normalization for model replies
//!
//! Models name fields loosely: `entries` comes back as `codebook`,
//! `condition` as `cause`, a list as a single object. Each entity has a
//! declarative alias table here, applied before the typed decode. The
//! normalizers are total; they drop what they cannot place (with a
//! warning) and never fail themselves. Required fields stay strict: a
//! record that loses its required field fails the typed decode that
//! follows.

use serde_json::{json, Map, Value};
use tracing::warn;

/// Whether a value counts as present for alias resolution.
///
/// Null, `false`, zero, the empty string, and empty containers are
/// treated as absent.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Coerce a loosely-typed value into a list of strings.
///
/// Scalars become one-element lists, arrays keep their scalar elements
/// (stringified and trimmed, blanks dropped), and objects contribute the
/// keys whose values are truthy. Booleans normalize to the empty list.
pub fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Null | Value::Bool(_) => Vec::new(),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                Vec::new()
            } else {
                vec![s.to_string()]
            }
        }
        Value::Number(n) => vec![n.to_string()],
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => {
                    let s = s.trim();
                    (!s.is_empty()).then(|| s.to_string())
                }
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        Value::Object(map) => map
            .iter()
            .filter_map(|(k, v)| {
                let k = k.trim();
                (is_truthy(v) && !k.is_empty()).then(|| k.to_string())
            })
            .collect(),
    }
}

/// First alias whose value is present and non-empty.
///
/// Null, `false`, zero, blank strings, and empty containers do not
/// count as present; resolution moves on to the next alias.
pub fn first_alias<'a>(map: &'a Map<String, Value>, aliases: &[&str]) -> Option<&'a Value> {
    for alias in aliases {
        if let Some(value) = map.get(*alias) {
            if matches!(value, Value::String(s) if s.trim().is_empty()) {
                continue;
            }
            if !is_truthy(value) {
                continue;
            }
            return Some(value);
        }
    }
    None
}

/// Coerce a payload into a list of records.
///
/// An `{"items": [...]}` wrapper unwraps first; a bare object becomes a
/// one-element list; anything else becomes the empty list.
pub fn as_object_list(value: Value) -> Vec<Value> {
    let value = match value {
        Value::Object(mut map) => match map.remove("items") {
            Some(items) => items,
            None => Value::Object(map),
        },
        other => other,
    };
    match value {
        Value::Array(items) => items,
        Value::Object(map) => vec![Value::Object(map)],
        _ => Vec::new(),
    }
}

/// Resolve an alias to a trimmed string, treating non-scalars as absent.
fn string_field(map: &Map<String, Value>, aliases: &[&str]) -> Option<String> {
    scalar_string(first_alias(map, aliases)?)
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Resolve an alias to a string list, defaulting to empty.
fn list_field(map: &Map<String, Value>, aliases: &[&str]) -> Value {
    let items = first_alias(map, aliases).map(string_list).unwrap_or_default();
    Value::Array(items.into_iter().map(Value::String).collect())
}

/// Normalize a keyed grouping such as themes-to-codes.
///
/// A native map passes through with its values coerced to string lists.
/// A list of records resolves each record's key and values through the
/// given aliases; records without a usable key are dropped.
fn normalize_grouping(
    value: Option<&Value>,
    key_aliases: &[&str],
    value_aliases: &[&str],
) -> Map<String, Value> {
    let mut out = Map::new();
    match value {
        Some(Value::Object(map)) => {
            for (key, v) in map {
                let items = string_list(v).into_iter().map(Value::String).collect();
                out.insert(key.clone(), Value::Array(items));
            }
        }
        Some(Value::Array(records)) => {
            for record in records {
                let Value::Object(map) = record else {
                    continue;
                };
                let key = key_aliases
                    .iter()
                    .find_map(|a| map.get(*a).filter(|v| is_truthy(v)).and_then(scalar_string));
                let Some(key) = key else {
                    warn!("Dropping grouping record without a key field");
                    continue;
                };
                let values = value_aliases
                    .iter()
                    .find_map(|a| map.get(*a).filter(|v| is_truthy(v)).map(string_list))
                    .unwrap_or_default();
                let items = values.into_iter().map(Value::String).collect();
                out.insert(key, Value::Array(items));
            }
        }
        _ => {}
    }
    out
}

/// Normalize an open-coding reply into a list of item records.
///
/// Only the list shape is repaired here; item fields stay as given so
/// the typed decode can enforce `seg_id` and each initial code's `code`.
pub fn normalize_open_items(value: Value) -> Value {
    let mut items = Vec::new();
    for (idx, item) in as_object_list(value).into_iter().enumerate() {
        if item.is_object() {
            items.push(item);
        } else {
            warn!("Dropping non-object open coding item {}", idx);
        }
    }
    Value::Array(items)
}

/// Normalize a codebook reply.
///
/// A bare list is treated as the entries; a non-object payload becomes
/// an empty codebook. Entries without a usable code are dropped.
pub fn normalize_codebook(value: Value) -> Value {
    let map = match value {
        Value::Array(entries) => {
            let mut m = Map::new();
            m.insert("entries".to_string(), Value::Array(entries));
            m
        }
        Value::Object(m) => m,
        _ => Map::new(),
    };

    let entries_raw = first_alias(&map, &["entries", "codebook", "items", "codes"])
        .cloned()
        .unwrap_or(Value::Null);

    json!({
        "entries": normalize_entries(entries_raw),
        "second_order_themes": normalize_grouping(
            map.get("second_order_themes"),
            &["theme", "name"],
            &["codes", "items"],
        ),
        "aggregate_dimensions": normalize_grouping(
            map.get("aggregate_dimensions"),
            &["dimension", "name"],
            &["themes", "items"],
        ),
    })
}

fn normalize_entries(entries: Value) -> Vec<Value> {
    let records = match entries {
        Value::Array(items) => items,
        Value::Object(map) => vec![Value::Object(map)],
        _ => Vec::new(),
    };

    let mut out = Vec::new();
    for record in records {
        let Value::Object(map) = record else {
            warn!("Dropping non-object codebook entry");
            continue;
        };
        let Some(code) = string_field(&map, &["code", "name", "label"]) else {
            warn!("Dropping codebook entry without a code");
            continue;
        };
        let definition = string_field(&map, &["definition", "description"]).unwrap_or_default();
        out.push(json!({
            "code": code,
            "definition": definition,
            "include": list_field(&map, &["include", "should_include"]),
            "exclude": list_field(&map, &["exclude", "should_exclude"]),
            "positive_examples": list_field(&map, &["positive_examples", "examples"]),
            "near_miss": list_field(&map, &["near_miss", "boundary_cases"]),
            "aliases": list_field(&map, &["aliases", "synonyms"]),
        }));
    }
    out
}

/// Normalize an axial-coding reply into a list of triple records.
///
/// Field aliases are resolved; a record missing condition, action, or
/// result keeps the gap and fails the typed decode.
pub fn normalize_triples(value: Value) -> Value {
    let mut triples = Vec::new();
    for (idx, record) in as_object_list(value).into_iter().enumerate() {
        let Value::Object(map) = record else {
            warn!("Dropping non-object axial record {}", idx);
            continue;
        };
        let mut out = Map::new();
        if let Some(condition) = string_field(&map, &["condition", "cause"]) {
            out.insert("condition".to_string(), Value::String(condition));
        }
        if let Some(action) = string_field(&map, &["action", "strategy"]) {
            out.insert("action".to_string(), Value::String(action));
        }
        if let Some(result) = string_field(&map, &["result", "outcome", "consequence"]) {
            out.insert("result".to_string(), Value::String(result));
        }
        out.insert(
            "evidence".to_string(),
            list_field(&map, &["evidence", "segments", "seg_ids"]),
        );
        triples.push(Value::Object(out));
    }
    Value::Array(triples)
}

/// Normalize a selective-coding reply into a theory record.
pub fn normalize_theory(value: Value) -> Value {
    let Value::Object(map) = value else {
        return json!({});
    };
    let mut out = Map::new();
    if let Some(core) = string_field(&map, &["core_category", "category"]) {
        out.insert("core_category".to_string(), Value::String(core));
    }
    if let Some(storyline) = string_field(&map, &["storyline", "story"]) {
        out.insert("storyline".to_string(), Value::String(storyline));
    }
    if let Some(rationale) = string_field(&map, &["rationale", "reason"]) {
        out.insert("rationale".to_string(), Value::String(rationale));
    }
    Value::Object(out)
}

/// Normalize a negative-case reply into a list of case records.
///
/// Records without a segment reference are dropped; the optional fields
/// pass through when they are scalar.
pub fn normalize_negatives(value: Value) -> Value {
    let mut cases = Vec::new();
    for record in as_object_list(value) {
        let Value::Object(map) = record else {
            continue;
        };
        let Some(seg_id) = string_field(&map, &["seg_id", "segment", "id"]) else {
            warn!("Dropping negative case without a seg_id");
            continue;
        };
        let mut out = Map::new();
        out.insert("seg_id".to_string(), Value::String(seg_id));
        for key in ["conflict_type", "explanation", "boundary_condition"] {
            if let Some(text) = string_field(&map, &[key]) {
                out.insert(key.to_string(), Value::String(text));
            }
        }
        cases.push(Value::Object(out));
    }
    Value::Array(cases)
}
