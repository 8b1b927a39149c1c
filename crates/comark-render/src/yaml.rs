//! YAML frontmatter mining.
//!
//! Frontmatter is never fatal: anything that fails to parse simply
//! contributes nothing (logged at debug level). Three consumers share this
//! module: deferred-tag attribute injection, full-document `<head>`
//! metadata, and the metadata digest's recursive YAML→JSON conversion.

use serde_yaml::Value;

/// Parse frontmatter text into a YAML mapping, or `None` when it is not a
/// mapping (or not YAML at all).
pub fn parse_mapping(text: &str) -> Option<serde_yaml::Mapping> {
    match serde_yaml::from_str::<Value>(text) {
        Ok(Value::Mapping(mapping)) => Some(mapping),
        Ok(_) => None,
        Err(error) => {
            tracing::debug!(%error, "discarding unparsable frontmatter");
            None
        }
    }
}

/// Scalar-to-string conversion for attribute values. Nested maps and
/// sequences yield `None` and are skipped by attribute consumers.
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Sequence(_) | Value::Mapping(_) => None,
        Value::Tagged(tagged) => scalar_string(&tagged.value),
    }
}

/// Top-level scalar key/value pairs of a frontmatter block, in document
/// order. Used for deferred-tag attribute injection.
pub fn frontmatter_attrs(text: &str) -> Vec<(String, String)> {
    let Some(mapping) = parse_mapping(text) else {
        return Vec::new();
    };
    mapping
        .iter()
        .filter_map(|(key, value)| Some((scalar_string(key)?, scalar_string(value)?)))
        .collect()
}

/// Extract `title` and `description` scalars from frontmatter text.
pub fn frontmatter_meta(text: &str) -> (Option<String>, Option<String>) {
    let mut title = None;
    let mut description = None;
    for (key, value) in frontmatter_attrs(text) {
        if value.is_empty() {
            continue;
        }
        match key.as_str() {
            "title" => title = Some(value),
            "description" => description = Some(value),
            _ => {}
        }
    }
    (title, description)
}

/// True for plain scalars the YAML 1.1 schema reads as booleans but
/// YAML 1.2 (serde_yaml) leaves as strings.
fn legacy_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("yes") || s.eq_ignore_ascii_case("on") {
        Some(true)
    } else if s.eq_ignore_ascii_case("no") || s.eq_ignore_ascii_case("off") {
        Some(false)
    } else {
        None
    }
}

/// Convert a YAML value to JSON, recursively, with YAML 1.1 scalar
/// coercion (`yes`/`on` → true, `no`/`off` → false).
pub fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                serde_json::Value::from(i)
            } else if let Some(u) = n.as_u64() {
                serde_json::Value::from(u)
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map_or(serde_json::Value::Null, serde_json::Value::Number)
            }
        }
        Value::String(s) => match legacy_bool(s) {
            Some(b) => serde_json::Value::Bool(b),
            None => serde_json::Value::String(s.clone()),
        },
        Value::Sequence(seq) => serde_json::Value::Array(seq.iter().map(to_json).collect()),
        Value::Mapping(mapping) => serde_json::Value::Object(
            mapping
                .iter()
                .filter_map(|(key, value)| Some((scalar_string(key)?, to_json(value))))
                .collect(),
        ),
        Value::Tagged(tagged) => to_json(&tagged.value),
    }
}
