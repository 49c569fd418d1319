//! The parameter schema tree.
//!
//! A schema is a tree of [`SpecNode`]s. Leaves ([`ParamLeaf`]) declare one
//! parameter with its kind, constraints, and default; groups
//! ([`SpecGroup`]) name and nest other nodes to any depth. A node is
//! either one or the other, never both.
//!
//! Schemas are normally built in code (see [`crate::engine_spec`]), but can
//! also be read from their JSON form with [`SpecNode::from_json`]:
//!
//! ```rust
//! use serde_json::json;
//! use soundlab_config::{ParamKind, SpecNode};
//!
//! let node = SpecNode::from_json(&json!({
//!     "frequency": { "type": "number", "min": 20, "max": 20000, "default": 440 },
//!     "enabled": { "type": "boolean", "default": true }
//! })).unwrap();
//!
//! let group = node.as_group().unwrap();
//! assert_eq!(group.get("frequency").unwrap().as_leaf().unwrap().kind(), ParamKind::Number);
//! ```

use std::fmt;

use serde_json::{Map, Value};
use thiserror::Error;

/// Errors in a schema definition.
///
/// These indicate a programming error in a static schema and are not
/// expected to be recovered from.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SpecError {
    /// A leaf declares no default.
    #[error("spec leaf '{path}' has no default")]
    MissingDefault {
        /// Path of the leaf.
        path: String,
    },

    /// A leaf declares a kind this schema model does not know.
    #[error("spec leaf '{path}' has unknown kind '{kind}'")]
    UnknownKind {
        /// Path of the leaf.
        path: String,
        /// The declared kind.
        kind: String,
    },

    /// A leaf's default does not satisfy the leaf's own constraints.
    #[error("spec leaf '{path}' has an invalid default: {reason}")]
    InvalidDefault {
        /// Path of the leaf.
        path: String,
        /// Why the default was rejected.
        reason: String,
    },

    /// A node is neither a leaf nor a group.
    #[error("spec node '{path}' is neither a parameter nor a group")]
    MalformedNode {
        /// Path of the node.
        path: String,
    },

    /// An enum leaf declares no legal values.
    #[error("spec leaf '{path}' declares no enum values")]
    EmptyEnum {
        /// Path of the leaf.
        path: String,
    },
}

/// The primitive kind of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    /// A finite number, optionally bounded.
    Number,
    /// A boolean toggle.
    Boolean,
    /// One string out of a fixed list.
    Enum,
    /// Free-form text.
    Text,
    /// A list of strings, optionally drawn from a fixed set.
    List,
    /// An open-ended object of named entries.
    Object,
}

impl ParamKind {
    /// The name used for this kind in the JSON schema form.
    pub fn as_str(self) -> &'static str {
        match self {
            ParamKind::Number => "number",
            ParamKind::Boolean => "boolean",
            ParamKind::Enum => "enum",
            ParamKind::Text => "string",
            ParamKind::List => "list",
            ParamKind::Object => "object",
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single parameter declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamLeaf {
    /// A numeric parameter with optional inclusive bounds.
    Number {
        /// Inclusive lower bound.
        min: Option<f64>,
        /// Inclusive upper bound.
        max: Option<f64>,
        /// Default value.
        default: f64,
    },
    /// A boolean parameter.
    Boolean {
        /// Default value.
        default: bool,
    },
    /// A parameter restricted to a list of string values.
    Enum {
        /// Legal values, in declaration order.
        values: Vec<String>,
        /// Default value.
        default: String,
    },
    /// A free-form string parameter.
    Text {
        /// Default value.
        default: String,
    },
    /// An array of strings.
    List {
        /// Legal members, or `None` for any string.
        allowed: Option<Vec<String>>,
        /// Default value.
        default: Vec<String>,
    },
    /// An object whose entries the schema does not declare.
    Object {
        /// Default value.
        default: Map<String, Value>,
    },
}

impl ParamLeaf {
    /// A number bounded to `[min, max]`.
    pub fn number(min: f64, max: f64, default: f64) -> Self {
        ParamLeaf::Number {
            min: Some(min),
            max: Some(max),
            default,
        }
    }

    /// A boolean toggle.
    pub fn boolean(default: bool) -> Self {
        ParamLeaf::Boolean { default }
    }

    /// One of `values`.
    pub fn choice(values: &[&str], default: &str) -> Self {
        ParamLeaf::Enum {
            values: values.iter().map(|v| (*v).to_string()).collect(),
            default: default.to_string(),
        }
    }

    /// Free-form text.
    pub fn text(default: &str) -> Self {
        ParamLeaf::Text {
            default: default.to_string(),
        }
    }

    /// Any list of strings.
    pub fn string_list(default: &[&str]) -> Self {
        ParamLeaf::List {
            allowed: None,
            default: default.iter().map(|v| (*v).to_string()).collect(),
        }
    }

    /// A list whose members are each one of `allowed`.
    pub fn list_of(allowed: &[&str], default: &[&str]) -> Self {
        ParamLeaf::List {
            allowed: Some(allowed.iter().map(|v| (*v).to_string()).collect()),
            default: default.iter().map(|v| (*v).to_string()).collect(),
        }
    }

    /// An object starting out empty.
    pub fn object() -> Self {
        ParamLeaf::Object { default: Map::new() }
    }

    /// The leaf's primitive kind.
    pub fn kind(&self) -> ParamKind {
        match self {
            ParamLeaf::Number { .. } => ParamKind::Number,
            ParamLeaf::Boolean { .. } => ParamKind::Boolean,
            ParamLeaf::Enum { .. } => ParamKind::Enum,
            ParamLeaf::Text { .. } => ParamKind::Text,
            ParamLeaf::List { .. } => ParamKind::List,
            ParamLeaf::Object { .. } => ParamKind::Object,
        }
    }

    /// The default as a state value.
    pub fn default_value(&self) -> Value {
        match self {
            ParamLeaf::Number { default, .. } => Value::from(*default),
            ParamLeaf::Boolean { default } => Value::Bool(*default),
            ParamLeaf::Enum { default, .. } | ParamLeaf::Text { default } => {
                Value::String(default.clone())
            }
            ParamLeaf::List { default, .. } => {
                Value::Array(default.iter().cloned().map(Value::String).collect())
            }
            ParamLeaf::Object { default } => Value::Object(default.clone()),
        }
    }
}

/// A named collection of schema nodes.
///
/// Entries keep their declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpecGroup {
    entries: Vec<(String, SpecNode)>,
}

impl SpecGroup {
    /// Create an empty group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter.
    pub fn with_leaf(self, name: &str, leaf: ParamLeaf) -> Self {
        self.with_node(name, SpecNode::Leaf(leaf))
    }

    /// Add a nested group.
    pub fn with_group(self, name: &str, group: SpecGroup) -> Self {
        self.with_node(name, SpecNode::Group(group))
    }

    /// Add a node, replacing any existing entry of the same name.
    pub fn with_node(mut self, name: &str, node: SpecNode) -> Self {
        self.insert(name, node);
        self
    }

    /// Insert a node, replacing any existing entry of the same name.
    pub fn insert(&mut self, name: &str, node: SpecNode) {
        if let Some(slot) = self.entries.iter_mut().find(|(key, _)| key == name) {
            slot.1 = node;
        } else {
            self.entries.push((name.to_string(), node));
        }
    }

    /// Look up an entry by name.
    pub fn get(&self, name: &str) -> Option<&SpecNode> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, node)| node)
    }

    /// Whether an entry with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SpecNode)> {
        self.entries.iter().map(|(key, node)| (key.as_str(), node))
    }

    /// Entry names in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the group has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A schema node: a single parameter or a group of nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum SpecNode {
    /// A parameter declaration.
    Leaf(ParamLeaf),
    /// A group of named nodes.
    Group(SpecGroup),
}

impl SpecNode {
    /// The leaf, if this node is one.
    pub fn as_leaf(&self) -> Option<&ParamLeaf> {
        match self {
            SpecNode::Leaf(leaf) => Some(leaf),
            SpecNode::Group(_) => None,
        }
    }

    /// The group, if this node is one.
    pub fn as_group(&self) -> Option<&SpecGroup> {
        match self {
            SpecNode::Group(group) => Some(group),
            SpecNode::Leaf(_) => None,
        }
    }

    /// Parse the JSON schema form.
    ///
    /// An object whose `type` entry is a string is a leaf; any other object
    /// is a group, so a group may itself contain a parameter named `type`.
    /// Leaf defaults are only checked for kind here; range and membership
    /// checks happen when defaults are built.
    pub fn from_json(value: &Value) -> Result<Self, SpecError> {
        parse_node(value, "")
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn parse_node(value: &Value, path: &str) -> Result<SpecNode, SpecError> {
    let Some(object) = value.as_object() else {
        return Err(SpecError::MalformedNode {
            path: path.to_string(),
        });
    };

    match object.get("type") {
        Some(Value::String(kind)) => parse_leaf(object, kind, path).map(SpecNode::Leaf),
        Some(Value::Object(_)) | None => {
            let mut group = SpecGroup::new();
            for (key, child) in object {
                group.insert(key, parse_node(child, &join(path, key))?);
            }
            Ok(SpecNode::Group(group))
        }
        Some(other) => Err(SpecError::UnknownKind {
            path: path.to_string(),
            kind: other.to_string(),
        }),
    }
}

fn parse_leaf(object: &Map<String, Value>, kind: &str, path: &str) -> Result<ParamLeaf, SpecError> {
    let default = object.get("default").ok_or_else(|| SpecError::MissingDefault {
        path: path.to_string(),
    })?;
    let wrong_default = |expected: &str| SpecError::InvalidDefault {
        path: path.to_string(),
        reason: format!("expected a {expected}, got {default}"),
    };

    match kind {
        "number" => {
            let bound = |name: &str| -> Result<Option<f64>, SpecError> {
                match object.get(name) {
                    None => Ok(None),
                    Some(v) => v.as_f64().map(Some).ok_or_else(|| SpecError::MalformedNode {
                        path: join(path, name),
                    }),
                }
            };
            Ok(ParamLeaf::Number {
                min: bound("min")?,
                max: bound("max")?,
                default: default.as_f64().ok_or_else(|| wrong_default("number"))?,
            })
        }
        "boolean" => Ok(ParamLeaf::Boolean {
            default: default.as_bool().ok_or_else(|| wrong_default("boolean"))?,
        }),
        "enum" => {
            let values = object
                .get("values")
                .and_then(Value::as_array)
                .ok_or_else(|| SpecError::EmptyEnum {
                    path: path.to_string(),
                })?
                .iter()
                .map(|v| {
                    v.as_str().map(str::to_string).ok_or_else(|| SpecError::MalformedNode {
                        path: join(path, "values"),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            if values.is_empty() {
                return Err(SpecError::EmptyEnum {
                    path: path.to_string(),
                });
            }
            Ok(ParamLeaf::Enum {
                values,
                default: default
                    .as_str()
                    .map(str::to_string)
                    .ok_or_else(|| wrong_default("string"))?,
            })
        }
        "string" => Ok(ParamLeaf::Text {
            default: default
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| wrong_default("string"))?,
        }),
        "list" => {
            let strings = |value: &Value, field: &str| -> Option<Result<Vec<String>, SpecError>> {
                let items = value.as_array()?;
                Some(
                    items
                        .iter()
                        .map(|v| {
                            v.as_str().map(str::to_string).ok_or_else(|| SpecError::MalformedNode {
                                path: join(path, field),
                            })
                        })
                        .collect(),
                )
            };
            let allowed = match object.get("values") {
                None => None,
                Some(values) => Some(strings(values, "values").ok_or_else(|| {
                    SpecError::MalformedNode {
                        path: join(path, "values"),
                    }
                })??),
            };
            let default = strings(default, "default").ok_or_else(|| wrong_default("list"))??;
            Ok(ParamLeaf::List { allowed, default })
        }
        "object" => Ok(ParamLeaf::Object {
            default: default
                .as_object()
                .cloned()
                .ok_or_else(|| wrong_default("object"))?,
        }),
        other => Err(SpecError::UnknownKind {
            path: path.to_string(),
            kind: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_keeps_declaration_order() {
        let group = SpecGroup::new()
            .with_leaf("enabled", ParamLeaf::boolean(true))
            .with_leaf("frequency", ParamLeaf::number(20.0, 20000.0, 440.0))
            .with_group(
                "waves",
                SpecGroup::new().with_leaf("sine", ParamLeaf::number(0.0, 1.0, 1.0)),
            );

        let keys: Vec<_> = group.keys().collect();
        assert_eq!(keys, vec!["enabled", "frequency", "waves"]);
        assert!(group.get("waves").unwrap().as_group().is_some());
        assert!(group.get("frequency").unwrap().as_leaf().is_some());
    }

    #[test]
    fn test_insert_replaces_existing() {
        let mut group = SpecGroup::new().with_leaf("glide", ParamLeaf::number(0.0, 10.0, 0.0));
        group.insert("glide", SpecNode::Leaf(ParamLeaf::boolean(false)));
        assert_eq!(group.len(), 1);
        assert_eq!(
            group.get("glide").unwrap().as_leaf().unwrap().kind(),
            ParamKind::Boolean
        );
    }

    #[test]
    fn test_default_value() {
        assert_eq!(ParamLeaf::number(0.0, 1.0, 0.5).default_value(), json!(0.5));
        assert_eq!(ParamLeaf::boolean(false).default_value(), json!(false));
        assert_eq!(
            ParamLeaf::choice(&["sine", "saw"], "saw").default_value(),
            json!("saw")
        );
    }

    #[test]
    fn test_collection_defaults() {
        assert_eq!(ParamLeaf::text("#00ffcc").default_value(), json!("#00ffcc"));
        assert_eq!(
            ParamLeaf::list_of(&["info", "warn", "error"], &["info", "warn"]).default_value(),
            json!(["info", "warn"])
        );
        assert_eq!(ParamLeaf::string_list(&[]).default_value(), json!([]));
        assert_eq!(ParamLeaf::object().default_value(), json!({}));
        assert_eq!(ParamLeaf::object().kind().to_string(), "object");
    }

    // --- JSON form ---

    #[test]
    fn test_from_json_leaves_and_groups() {
        let node = SpecNode::from_json(&json!({
            "waveform": { "type": "enum", "values": ["sine", "square"], "default": "sine" },
            "env": {
                "enabled": { "type": "boolean", "default": false },
                "attack": { "type": "number", "min": 0, "max": 10, "default": 0.01 }
            }
        }))
        .unwrap();

        let root = node.as_group().unwrap();
        assert_eq!(
            root.get("waveform").unwrap().as_leaf(),
            Some(&ParamLeaf::choice(&["sine", "square"], "sine"))
        );
        let env = root.get("env").unwrap().as_group().unwrap();
        assert_eq!(
            env.get("attack").unwrap().as_leaf(),
            Some(&ParamLeaf::number(0.0, 10.0, 0.01))
        );
    }

    #[test]
    fn test_from_json_group_with_type_parameter() {
        // fx.noise has a parameter literally named "type"
        let node = SpecNode::from_json(&json!({
            "noise": {
                "type": { "type": "enum", "values": ["white", "pink"], "default": "white" },
                "amount": { "type": "number", "min": 0, "max": 1, "default": 0 }
            }
        }))
        .unwrap();
        let noise = node.as_group().unwrap().get("noise").unwrap().as_group().unwrap();
        assert_eq!(noise.get("type").unwrap().as_leaf().unwrap().kind(), ParamKind::Enum);
    }

    #[test]
    fn test_from_json_collection_kinds() {
        let node = SpecNode::from_json(&json!({
            "color": { "type": "string", "default": "#00ffcc" },
            "typeFilters": { "type": "list", "values": ["info", "warn"], "default": ["info"] },
            "recent": { "type": "list", "default": [] },
            "panels": { "type": "object", "default": {} }
        }))
        .unwrap();
        let root = node.as_group().unwrap();
        let leaf = |name: &str| root.get(name).unwrap().as_leaf().unwrap().clone();

        assert_eq!(leaf("color"), ParamLeaf::text("#00ffcc"));
        assert_eq!(leaf("typeFilters"), ParamLeaf::list_of(&["info", "warn"], &["info"]));
        assert_eq!(leaf("recent"), ParamLeaf::string_list(&[]));
        assert_eq!(leaf("panels").kind(), ParamKind::Object);
    }

    #[test]
    fn test_from_json_list_default_must_hold_strings() {
        let err = SpecNode::from_json(&json!({
            "recent": { "type": "list", "default": [1, 2] }
        }))
        .unwrap_err();
        assert_eq!(err, SpecError::MalformedNode { path: "recent.default".to_string() });

        let err = SpecNode::from_json(&json!({
            "recent": { "type": "list", "default": "x" }
        }))
        .unwrap_err();
        assert!(matches!(err, SpecError::InvalidDefault { ref path, .. } if path == "recent"));
    }

    #[test]
    fn test_from_json_missing_default() {
        let err = SpecNode::from_json(&json!({
            "osc": { "detune": { "type": "number", "min": -1200, "max": 1200 } }
        }))
        .unwrap_err();
        assert_eq!(
            err,
            SpecError::MissingDefault {
                path: "osc.detune".to_string()
            }
        );
    }

    #[test]
    fn test_from_json_unknown_kind() {
        let err = SpecNode::from_json(&json!({ "color": { "type": "rgb", "default": "#fff" } }))
            .unwrap_err();
        assert!(matches!(err, SpecError::UnknownKind { ref kind, .. } if kind == "rgb"));
    }

    #[test]
    fn test_from_json_malformed_node() {
        let err = SpecNode::from_json(&json!({ "osc": 5 })).unwrap_err();
        assert_eq!(err, SpecError::MalformedNode { path: "osc".to_string() });
        assert!(err.to_string().contains("neither a parameter nor a group"));
    }

    #[test]
    fn test_from_json_empty_enum() {
        let err = SpecNode::from_json(&json!({
            "mode": { "type": "enum", "values": [], "default": "x" }
        }))
        .unwrap_err();
        assert!(matches!(err, SpecError::EmptyEnum { .. }));
    }

    #[test]
    fn test_from_json_wrong_default_kind() {
        let err = SpecNode::from_json(&json!({
            "expo": { "type": "boolean", "default": "yes" }
        }))
        .unwrap_err();
        assert!(matches!(err, SpecError::InvalidDefault { ref path, .. } if path == "expo"));
    }
}
