//! State and preset validation.
//!
//! Two validators with deliberately different traversal directions:
//!
//! - [`validate_state`] is schema-driven. It walks the schema and checks the
//!   value found at every declared leaf: kind, numeric bounds, and enum
//!   membership. Keys present in the state but absent from the schema are
//!   ignored, so live states may carry runtime-only fields.
//! - [`validate_preset`] is delta-driven. It walks an untrusted preset
//!   document and checks every key it finds against the defaults for the
//!   preset's declared version. Unknown keys are rejected; values are only
//!   checked for primitive type agreement.
//!
//! Both collect every finding before returning.
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use soundlab_config::{default_engine_state, validate_engine_state};
//!
//! let mut state = (*default_engine_state().unwrap()).clone();
//! assert!(validate_engine_state(&state).is_empty());
//!
//! state.params["osc"]["frequency"] = json!(-5);
//! let errors = validate_engine_state(&state);
//! assert_eq!(errors[0].to_string(), "osc.frequency must be within [20, 20000] (got -5)");
//! ```

use serde_json::{Map, Value};
use thiserror::Error;

use crate::defaults::EngineState;
use crate::delta::partition_document;
use crate::engine_spec::schema_for_version;
use crate::path::ParamPath;
use crate::preset::{MetadataType, REQUIRED_METADATA, metadata_type};
use crate::spec::{ParamLeaf, SpecGroup, SpecNode};
use crate::versions::DefaultsProvider;

/// A single validation finding.
///
/// Every variant renders as a human-readable, path-qualified message.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// A declared parameter or group is absent.
    #[error("{path} is missing")]
    Missing {
        /// Path of the missing entry.
        path: String,
    },

    /// A declared group holds a non-object value.
    #[error("{path} must be an object (got {value})")]
    NotAGroup {
        /// Path of the group.
        path: String,
        /// The value found instead.
        value: Value,
    },

    /// A number parameter holds a non-number.
    #[error("{path} must be a finite number (got {value})")]
    NotANumber {
        /// Path of the parameter.
        path: String,
        /// The value found.
        value: Value,
    },

    /// A number parameter lies outside its bounds.
    #[error("{path} must be within {} (got {value})", format_range(.min, .max))]
    OutOfRange {
        /// Path of the parameter.
        path: String,
        /// The offending value.
        value: f64,
        /// Inclusive lower bound, if declared.
        min: Option<f64>,
        /// Inclusive upper bound, if declared.
        max: Option<f64>,
    },

    /// A boolean parameter holds a non-boolean.
    #[error("{path} must be a boolean (got {value})")]
    NotABoolean {
        /// Path of the parameter.
        path: String,
        /// The value found.
        value: Value,
    },

    /// An enum parameter holds a value outside its list.
    #[error("{path} must be one of [{}] (got {value})", .values.join(", "))]
    NotInEnum {
        /// Path of the parameter.
        path: String,
        /// The value found.
        value: Value,
        /// The legal values.
        values: Vec<String>,
    },

    /// A text parameter holds a non-string.
    #[error("{path} must be a string (got {value})")]
    NotAString {
        /// Path of the parameter.
        path: String,
        /// The value found.
        value: Value,
    },

    /// A list parameter holds something other than an array of strings.
    #[error("{path} must be an array of strings (got {value})")]
    NotAStringList {
        /// Path of the parameter.
        path: String,
        /// The value found.
        value: Value,
    },

    /// A list parameter holds a member outside its allowed set.
    #[error("{path} entries must be one of [{}] (got {value})", .values.join(", "))]
    NotInList {
        /// Path of the parameter.
        path: String,
        /// The offending member.
        value: Value,
        /// The legal members.
        values: Vec<String>,
    },

    /// An object parameter holds a non-object.
    #[error("{path} must be an object (got {value})")]
    NotAnObjectValue {
        /// Path of the parameter.
        path: String,
        /// The value found.
        value: Value,
    },

    /// A top-level module declared by the schema is absent.
    #[error("missing module '{module}'")]
    MissingModule {
        /// Name of the module.
        module: String,
    },

    /// A state's version has no known schema.
    #[error("no schema for engine version '{version}'")]
    UnknownSchema {
        /// The unresolved version.
        version: String,
    },

    /// A preset document is not a JSON object.
    #[error("Preset must be a JSON object.")]
    NotAnObject,

    /// A preset document has no usable `engineVersion`.
    #[error("Preset must include a valid 'engineVersion' string.")]
    MissingEngineVersion,

    /// A preset's `engineVersion` cannot be resolved to defaults.
    #[error("Unknown engineVersion '{version}'.")]
    UnknownVersion {
        /// The unresolved version.
        version: String,
    },

    /// A required metadata field is absent.
    #[error("Missing required metadata field '{field}'.")]
    MissingMetadata {
        /// Name of the field.
        field: String,
    },

    /// A metadata field has the wrong type.
    #[error("Metadata field '{field}' must be {expected}.")]
    MetadataType {
        /// Name of the field.
        field: String,
        /// The expected type.
        expected: MetadataType,
    },

    /// A preset delta names a parameter the defaults do not have.
    #[error("Unknown engine parameter '{path}'.")]
    UnknownParameter {
        /// Path of the unknown parameter.
        path: String,
    },

    /// A preset delta value disagrees with its default on array-ness.
    #[error("Type mismatch at '{path}': expected {}.", array_word(.expected_array))]
    ArrayMismatch {
        /// Path of the parameter.
        path: String,
        /// Whether the default is an array.
        expected_array: bool,
    },

    /// A preset delta value has a different primitive type than its default.
    #[error("Type mismatch at '{path}': expected '{expected}', got '{found}'.")]
    TypeMismatch {
        /// Path of the parameter.
        path: String,
        /// Type of the default value.
        expected: &'static str,
        /// Type of the delta value.
        found: &'static str,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

impl ValidationError {
    /// Collapse a list of findings into one error.
    ///
    /// Returns `None` for an empty list and the finding itself for a
    /// single-element list.
    pub fn from_list(mut errors: Vec<ValidationError>) -> Option<ValidationError> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(ValidationError::Multiple(errors)),
        }
    }
}

fn format_range(min: &Option<f64>, max: &Option<f64>) -> String {
    match (min, max) {
        (Some(min), Some(max)) => format!("[{min}, {max}]"),
        (Some(min), None) => format!("[{min}, +inf)"),
        (None, Some(max)) => format!("(-inf, {max}]"),
        (None, None) => "(-inf, +inf)".to_string(),
    }
}

fn array_word(expected_array: &bool) -> &'static str {
    if *expected_array { "array" } else { "non-array" }
}

/// The JSON type name of a value.
pub fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Check one value against one parameter declaration.
pub fn validate_leaf(leaf: &ParamLeaf, path: &ParamPath, value: &Value) -> Option<ValidationError> {
    let path = path.to_string();
    match leaf {
        ParamLeaf::Number { min, max, .. } => {
            let Some(number) = value.as_f64().filter(|n| n.is_finite()) else {
                return Some(ValidationError::NotANumber {
                    path,
                    value: value.clone(),
                });
            };
            let below = min.is_some_and(|min| number < min);
            let above = max.is_some_and(|max| number > max);
            (below || above).then(|| ValidationError::OutOfRange {
                path,
                value: number,
                min: *min,
                max: *max,
            })
        }
        ParamLeaf::Boolean { .. } => (!value.is_boolean()).then(|| ValidationError::NotABoolean {
            path,
            value: value.clone(),
        }),
        ParamLeaf::Enum { values, .. } => {
            let member = value
                .as_str()
                .is_some_and(|s| values.iter().any(|v| v == s));
            (!member).then(|| ValidationError::NotInEnum {
                path,
                value: value.clone(),
                values: values.clone(),
            })
        }
        ParamLeaf::Text { .. } => (!value.is_string()).then(|| ValidationError::NotAString {
            path,
            value: value.clone(),
        }),
        ParamLeaf::List { allowed, .. } => {
            let Some(items) = value.as_array().filter(|items| items.iter().all(Value::is_string))
            else {
                return Some(ValidationError::NotAStringList {
                    path,
                    value: value.clone(),
                });
            };
            let allowed = allowed.as_ref()?;
            items
                .iter()
                .find(|item| !allowed.iter().any(|a| item.as_str() == Some(a.as_str())))
                .map(|item| ValidationError::NotInList {
                    path,
                    value: item.clone(),
                    values: allowed.clone(),
                })
        }
        ParamLeaf::Object { .. } => (!value.is_object()).then(|| ValidationError::NotAnObjectValue {
            path,
            value: value.clone(),
        }),
    }
}

/// Validate a state tree against a spec group, schema-driven.
///
/// `path` is the location of `state` inside the full tree and prefixes
/// every reported path. A group absent from the state is reported once
/// per declared leaf beneath it; a group holding a non-object is reported
/// once.
pub fn validate_state(
    state: &Map<String, Value>,
    spec: &SpecGroup,
    path: &ParamPath,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    collect_state_errors(Some(state), spec, path, &mut errors);
    errors
}

fn collect_state_errors(
    state: Option<&Map<String, Value>>,
    spec: &SpecGroup,
    path: &ParamPath,
    errors: &mut Vec<ValidationError>,
) {
    for (key, node) in spec.iter() {
        let child_path = path.child(key);
        let value = state.and_then(|s| s.get(key));
        validate_node(node, value, &child_path, errors);
    }
}

fn validate_node(
    node: &SpecNode,
    value: Option<&Value>,
    path: &ParamPath,
    errors: &mut Vec<ValidationError>,
) {
    match (node, value) {
        (SpecNode::Group(group), None) => collect_state_errors(None, group, path, errors),
        (SpecNode::Group(group), Some(Value::Object(map))) => {
            collect_state_errors(Some(map), group, path, errors)
        }
        (SpecNode::Group(_), Some(other)) => errors.push(ValidationError::NotAGroup {
            path: path.to_string(),
            value: other.clone(),
        }),
        (SpecNode::Leaf(_), None) => errors.push(ValidationError::Missing {
            path: path.to_string(),
        }),
        (SpecNode::Leaf(leaf), Some(value)) => errors.extend(validate_leaf(leaf, path, value)),
    }
}

/// Validate parameters against a schema, requiring every top-level module.
///
/// A missing module yields one [`ValidationError::MissingModule`] instead of
/// one finding per parameter inside it.
pub fn validate_modules(params: &Map<String, Value>, spec: &SpecGroup) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for (module, node) in spec.iter() {
        match params.get(module) {
            None => errors.push(ValidationError::MissingModule {
                module: module.to_string(),
            }),
            Some(value) => validate_node(node, Some(value), &ParamPath::root().child(module), &mut errors),
        }
    }
    errors
}

/// Validate an engine state against the schema for its version.
pub fn validate_engine_state(state: &EngineState) -> Vec<ValidationError> {
    match schema_for_version(&state.version) {
        Some(spec) => validate_modules(&state.params, spec),
        None => vec![ValidationError::UnknownSchema {
            version: state.version.clone(),
        }],
    }
}

/// Validate an untrusted preset document, delta-driven.
///
/// Checks the document shape, resolves the defaults for its
/// `engineVersion` (stopping at the first of these that fails), then
/// checks metadata fields and every engine parameter the document carries.
pub fn validate_preset<P>(doc: &Value, provider: &P) -> Vec<ValidationError>
where
    P: DefaultsProvider + ?Sized,
{
    let Some(object) = doc.as_object() else {
        return vec![ValidationError::NotAnObject];
    };

    let version = match object.get("engineVersion").and_then(Value::as_str) {
        Some(version) if !version.is_empty() => version,
        _ => return vec![ValidationError::MissingEngineVersion],
    };

    let Ok(defaults) = provider.defaults(version) else {
        return vec![ValidationError::UnknownVersion {
            version: version.to_string(),
        }];
    };

    let mut errors = validate_metadata(object);
    let (delta, _) = partition_document(object, &defaults.params);
    validate_delta(&delta, &defaults.params, &ParamPath::root(), &mut errors);
    errors
}

/// Check required metadata presence and the type of every known field.
pub fn validate_metadata(doc: &Map<String, Value>) -> Vec<ValidationError> {
    let mut errors: Vec<_> = REQUIRED_METADATA
        .iter()
        .filter(|field| !doc.contains_key(**field))
        .map(|field| ValidationError::MissingMetadata {
            field: (*field).to_string(),
        })
        .collect();

    for (key, value) in doc {
        if let Some(expected) = metadata_type(key)
            && !expected.matches(value)
        {
            errors.push(ValidationError::MetadataType {
                field: key.clone(),
                expected,
            });
        }
    }
    errors
}

/// Check a delta tree against a defaults tree, delta-driven.
pub fn validate_delta(
    delta: &Map<String, Value>,
    defaults: &Map<String, Value>,
    path: &ParamPath,
    errors: &mut Vec<ValidationError>,
) {
    for (key, delta_value) in delta {
        let child_path = path.child(key);
        let Some(default_value) = defaults.get(key) else {
            errors.push(ValidationError::UnknownParameter {
                path: child_path.to_string(),
            });
            continue;
        };

        if let (Value::Object(delta_group), Value::Object(default_group)) = (delta_value, default_value) {
            validate_delta(delta_group, default_group, &child_path, errors);
            continue;
        }

        if delta_value.is_array() != default_value.is_array() {
            errors.push(ValidationError::ArrayMismatch {
                path: child_path.to_string(),
                expected_array: default_value.is_array(),
            });
            continue;
        }

        let (expected, found) = (json_type(default_value), json_type(delta_value));
        if expected != found {
            errors.push(ValidationError::TypeMismatch {
                path: child_path.to_string(),
                expected,
                found,
            });
        }
    }
}
