//! Minimal diffs between a state and its version's defaults.
//!
//! A preset stores only the parameters that differ from the defaults of
//! the engine version it was saved with. [`extract_deltas`] computes that
//! difference and [`merge`] applies it back onto a copy of the defaults:
//!
//! ```rust
//! use serde_json::json;
//! use soundlab_config::{extract_deltas, merge};
//!
//! let defaults = json!({"osc": {"frequency": 440, "waves": {"sine": 1, "triangle": 0}}});
//! let state = json!({"osc": {"frequency": 880, "waves": {"sine": 1, "triangle": 0}}});
//! let (defaults, state) = (defaults.as_object().unwrap(), state.as_object().unwrap());
//!
//! let delta = extract_deltas(state, defaults);
//! assert_eq!(serde_json::Value::Object(delta.clone()), json!({"osc": {"frequency": 880}}));
//!
//! let mut restored = defaults.clone();
//! merge(&mut restored, &delta);
//! assert_eq!(&restored, state);
//! ```
//!
//! Versions whose defaults nest groups under `modules` store those groups
//! at the top level of the preset; [`flatten_modules`] and
//! [`partition_document`] translate between the two layouts.

use serde_json::{Map, Value};

use crate::engine_spec::MODULES_KEY;
use crate::preset::metadata_type;

/// Equality of two parameter values.
///
/// Numbers compare by numeric value regardless of integer or float
/// representation. Arrays are compared as whole values, never element by
/// element with number coercion. Everything else uses plain equality.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(key, value)| y.get(key).is_some_and(|other| values_equal(value, other)))
        }
        _ => a == b,
    }
}

/// Compute the parameters of `current` that differ from `defaults`.
///
/// Groups present as objects on both sides are compared recursively and
/// kept only if something inside them differs. Any other value is kept
/// whole when it differs from the default or has no default.
pub fn extract_deltas(current: &Map<String, Value>, defaults: &Map<String, Value>) -> Map<String, Value> {
    let mut delta = Map::new();
    for (key, value) in current {
        let default = defaults.get(key);
        if let (Value::Object(group), Some(Value::Object(default_group))) = (value, default) {
            let nested = extract_deltas(group, default_group);
            if !nested.is_empty() {
                delta.insert(key.clone(), Value::Object(nested));
            }
            continue;
        }
        if !default.is_some_and(|d| values_equal(value, d)) {
            delta.insert(key.clone(), value.clone());
        }
    }
    delta
}

/// Apply a delta onto `target` in place.
///
/// Object values are merged recursively, creating the target group when
/// it is absent or not an object; any other value overwrites. Callers
/// pass a fresh copy of the defaults, never a shared template.
pub fn merge(target: &mut Map<String, Value>, delta: &Map<String, Value>) {
    for (key, value) in delta {
        if let Value::Object(group) = value {
            let slot = target
                .entry(key.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            if let Value::Object(slot) = slot {
                merge(slot, group);
            }
        } else {
            target.insert(key.clone(), value.clone());
        }
    }
}

/// Hoist entries of a `modules` group to the top level of a delta.
///
/// Existing top-level entries keep their value on a name collision.
pub fn flatten_modules(delta: &mut Map<String, Value>) {
    let Some(Value::Object(modules)) = delta.remove(MODULES_KEY) else {
        return;
    };
    for (key, value) in modules {
        delta.entry(key).or_insert(value);
    }
}

/// Recursively sort object keys lexicographically.
pub fn sort_keys(map: &Map<String, Value>) -> Map<String, Value> {
    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort();
    keys.into_iter()
        .map(|key| {
            let value = match &map[key] {
                Value::Object(inner) => Value::Object(sort_keys(inner)),
                other => other.clone(),
            };
            (key.clone(), value)
        })
        .collect()
}

/// The preset delta for `current`: extracted, flattened, and sorted.
pub fn compute_delta(current: &Map<String, Value>, defaults: &Map<String, Value>) -> Map<String, Value> {
    let mut delta = extract_deltas(current, defaults);
    flatten_modules(&mut delta);
    sort_keys(&delta)
}

/// Split a preset document into engine deltas and everything else.
///
/// Metadata fields always go to the remainder. Keys that name a top-level
/// group of `defaults` go to the delta as they are; keys that name a group
/// nested under the defaults' `modules` are re-nested under `modules` in
/// the delta. All other keys go to the remainder.
///
/// Re-nested groups are merged into an explicit `modules` object once the
/// whole document has been read, so key order never changes the result. A
/// `modules` value that is not an object is kept as it is for validation
/// to reject.
pub fn partition_document(
    doc: &Map<String, Value>,
    defaults: &Map<String, Value>,
) -> (Map<String, Value>, Map<String, Value>) {
    let modules = defaults.get(MODULES_KEY).and_then(Value::as_object);
    let mut delta = Map::new();
    let mut scoped = Map::new();
    let mut rest = Map::new();

    for (key, value) in doc {
        if metadata_type(key).is_some() {
            rest.insert(key.clone(), value.clone());
        } else if defaults.contains_key(key) {
            delta.insert(key.clone(), value.clone());
        } else if modules.is_some_and(|m| m.contains_key(key)) {
            scoped.insert(key.clone(), value.clone());
        } else {
            rest.insert(key.clone(), value.clone());
        }
    }

    if !scoped.is_empty() {
        match delta.get_mut(MODULES_KEY) {
            None => {
                delta.insert(MODULES_KEY.to_string(), Value::Object(scoped));
            }
            Some(Value::Object(explicit)) => merge(explicit, &scoped),
            Some(_) => {}
        }
    }
    (delta, rest)
}
