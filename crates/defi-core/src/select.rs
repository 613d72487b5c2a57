//! Envelope shaping (component J, `select`/`resultsOnly`). `select`'s
//! canonical output casing is decided *per action*: registry/listing-style
//! actions (`chainsTop`, `yieldOpportunities`, `lendMarkets`) canonicalize
//! to snake_case, mirroring the upstream DefiLlama-shaped aggregator JSON
//! they're modeled on, while quote-style actions (`lendRates`,
//! `bridgeQuote`, `swapQuote`) canonicalize to camelCase, mirroring the
//! swap/bridge-aggregator quote APIs they're modeled on. See `DESIGN.md`.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

#[derive(Debug, thiserror::Error)]
pub enum SelectError {
    #[error("select must name at least one field")]
    Blank,
}

#[derive(Debug)]
pub struct FieldAlias {
    pub canonical: &'static str,
    pub aliases: &'static [&'static str],
}

impl FieldAlias {
    pub const fn new(canonical: &'static str, aliases: &'static [&'static str]) -> Self {
        FieldAlias { canonical, aliases }
    }
}

/// Resolves `select`'s raw comma-separated string against an action's alias
/// table. Returns the ordered, deduplicated set of canonical field names to
/// keep. `Err` only for a wholly-blank `select` (spec.md §4.A); a non-blank
/// `select` naming only unrecognized tokens yields an empty set, not an
/// error.
pub fn resolve_tokens(select_raw: &str, table: &[FieldAlias]) -> Result<Vec<&'static str>, SelectError> {
    let tokens: Vec<&str> = select_raw.split(',').map(|s| s.trim()).collect();
    if tokens.iter().all(|t| t.is_empty()) {
        return Err(SelectError::Blank);
    }

    let mut seen = BTreeSet::new();
    let mut resolved = Vec::new();
    for token in tokens.into_iter().filter(|t| !t.is_empty()) {
        let Some(field) = table.iter().find(|f| {
            f.canonical.eq_ignore_ascii_case(token) || f.aliases.iter().any(|a| a.eq_ignore_ascii_case(token))
        }) else {
            continue;
        };
        if seen.insert(field.canonical) {
            resolved.push(field.canonical);
        }
    }
    Ok(resolved)
}

/// Applies a resolved token set to a JSON object payload, keeping only the
/// named canonical keys that are actually present.
pub fn project(payload: &Map<String, Value>, keys: &[&str]) -> Map<String, Value> {
    let mut out = Map::new();
    for key in keys {
        if let Some(v) = payload.get(*key) {
            out.insert(key.to_string(), v.clone());
        }
    }
    out
}

/// Like [`project`] but works over a handler's primary payload, which may be
/// a single record (object) or a list of records (array) — list actions
/// (`chainsTop`, `providersList`, …) project every row independently.
pub fn project_value(payload: &Value, keys: &[&str]) -> Value {
    match payload {
        Value::Object(map) => Value::Object(project(map, keys)),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| match item {
                    Value::Object(map) => Value::Object(project(map, keys)),
                    other => other.clone(),
                })
                .collect(),
        ),
        other => other.clone(),
    }
}
