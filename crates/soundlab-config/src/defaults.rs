//! Default state construction.
//!
//! [`build_defaults`] materializes a state tree from a schema with every
//! parameter at its default. [`default_engine_state`] does so for the
//! current engine schema and hands out a shared, read-only snapshot;
//! callers clone it before mutating.

use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::engine_spec::{ENGINE_VERSION, engine_spec};
use crate::error::ConfigError;
use crate::path::ParamPath;
use crate::spec::{SpecError, SpecGroup, SpecNode};
use crate::validation::validate_leaf;

/// A full engine parameter tree tagged with its schema version.
///
/// Serializes as a single object with `version` first, followed by the
/// parameter groups:
///
/// ```json
/// { "version": "1.0.0", "osc": { "enabled": true, ... }, ... }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineState {
    /// Schema version the parameters were built for.
    pub version: String,

    /// Parameter tree, shaped like the schema.
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

impl EngineState {
    /// Wrap a parameter tree.
    pub fn new(version: impl Into<String>, params: Map<String, Value>) -> Self {
        Self {
            version: version.into(),
            params,
        }
    }

    /// Build a state with every parameter of `spec` at its default.
    pub fn from_spec(version: impl Into<String>, spec: &SpecGroup) -> Result<Self, SpecError> {
        Ok(Self::new(version, build_group(spec)?))
    }

    /// Value of a top-level module.
    pub fn module(&self, name: &str) -> Option<&Map<String, Value>> {
        self.params.get(name).and_then(Value::as_object)
    }
}

/// Build the default value for a schema node.
///
/// Returns the default for a leaf, or a map of built entries for a group.
/// Fails if a leaf's default does not satisfy its own constraints.
pub fn build_defaults(spec: &SpecNode) -> Result<Value, SpecError> {
    build_node(spec, &ParamPath::root())
}

/// Build the default parameter tree for a schema group.
pub fn build_group(spec: &SpecGroup) -> Result<Map<String, Value>, SpecError> {
    build_entries(spec, &ParamPath::root())
}

fn build_node(spec: &SpecNode, path: &ParamPath) -> Result<Value, SpecError> {
    match spec {
        SpecNode::Leaf(leaf) => {
            let value = leaf.default_value();
            if let Some(err) = validate_leaf(leaf, path, &value) {
                return Err(SpecError::InvalidDefault {
                    path: path.to_string(),
                    reason: err.to_string(),
                });
            }
            Ok(value)
        }
        SpecNode::Group(group) => build_entries(group, path).map(Value::Object),
    }
}

fn build_entries(spec: &SpecGroup, path: &ParamPath) -> Result<Map<String, Value>, SpecError> {
    spec.iter()
        .map(|(key, node)| Ok((key.to_string(), build_node(node, &path.child(key))?)))
        .collect()
}

/// The default engine state for [`ENGINE_VERSION`].
///
/// Built once; every call returns the same shared snapshot. The snapshot
/// cannot be mutated through the `Arc`; clone the state to get a working
/// copy.
pub fn default_engine_state() -> Result<Arc<EngineState>, SpecError> {
    static DEFAULT_STATE: OnceLock<Result<Arc<EngineState>, SpecError>> = OnceLock::new();
    DEFAULT_STATE
        .get_or_init(|| EngineState::from_spec(ENGINE_VERSION, engine_spec()).map(Arc::new))
        .clone()
}

/// Deep-copy any serializable state into a fresh, independent parameter tree.
///
/// Fails with [`ConfigError::Clone`] if the value cannot be serialized or
/// does not serialize to an object.
pub fn clone_state<T>(state: &T) -> Result<Map<String, Value>, ConfigError>
where
    T: Serialize + ?Sized,
{
    match serde_json::to_value(state).map_err(ConfigError::Clone)? {
        Value::Object(map) => Ok(map),
        other => Err(ConfigError::Clone(serde::ser::Error::custom(format!(
            "state must serialize to an object, got {}",
            crate::validation::json_type(&other)
        )))),
    }
}
