//! Schema-checked reads and writes of single parameters.

use serde_json::{Map, Value};

use crate::defaults::EngineState;
use crate::engine_spec::schema_for_version;
use crate::error::ConfigError;
use crate::path::{ParamPath, PathError};
use crate::spec::{ParamLeaf, SpecGroup, SpecNode};
use crate::validation::validate_leaf;

/// Resolve `path` to a parameter leaf of `spec`.
pub fn spec_leaf<'a>(spec: &'a SpecGroup, path: &ParamPath) -> Result<&'a ParamLeaf, PathError> {
    let unknown = || PathError::UnknownParameter {
        path: path.to_string(),
    };
    let (last, parents) = path.split_last().ok_or(PathError::Empty)?;
    let mut group = spec;
    for segment in parents {
        group = group.get(segment).and_then(SpecNode::as_group).ok_or_else(unknown)?;
    }
    match group.get(last).ok_or_else(unknown)? {
        SpecNode::Leaf(leaf) => Ok(leaf),
        SpecNode::Group(_) => Err(PathError::NotAParameter {
            path: path.to_string(),
        }),
    }
}

/// The current value of a parameter.
pub fn get_param<'a>(state: &'a EngineState, path: &ParamPath) -> Option<&'a Value> {
    path.lookup(&state.params)
}

/// Write one parameter of a tree after checking it against its leaf in `spec`.
///
/// Nothing is written if the path is unknown, the value violates the
/// leaf's constraints, or the parent group is missing from `params`.
pub fn set_value(
    params: &mut Map<String, Value>,
    spec: &SpecGroup,
    path: &ParamPath,
    value: Value,
) -> Result<(), ConfigError> {
    let leaf = spec_leaf(spec, path)?;
    if let Some(err) = validate_leaf(leaf, path, &value) {
        return Err(err.into());
    }
    let (parent, key) = path.parent_mut(params)?;
    parent.insert(key, value);
    Ok(())
}

/// Set a parameter of an engine state, validated against its version's schema.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use soundlab_config::{default_engine_state, get_param, set_param};
///
/// let mut state = (*default_engine_state().unwrap()).clone();
/// let path = "vibrato.depth".parse().unwrap();
///
/// set_param(&mut state, &path, json!(0.4)).unwrap();
/// assert_eq!(get_param(&state, &path), Some(&json!(0.4)));
///
/// assert!(set_param(&mut state, &path, json!("deep")).is_err());
/// ```
pub fn set_param(state: &mut EngineState, path: &ParamPath, value: Value) -> Result<(), ConfigError> {
    let spec = schema_for_version(&state.version)
        .ok_or_else(|| ConfigError::UnknownVersion(state.version.clone()))?;
    set_value(&mut state.params, spec, path, value)?;
    tracing::trace!(%path, "parameter set");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::default_engine_state;
    use crate::engine_spec::engine_spec;
    use crate::validation::ValidationError;
    use serde_json::json;

    fn path(text: &str) -> ParamPath {
        text.parse().unwrap()
    }

    fn working_state() -> EngineState {
        (*default_engine_state().unwrap()).clone()
    }

    #[test]
    fn test_spec_leaf_resolves() {
        let leaf = spec_leaf(engine_spec(), &path("osc.waves.sine")).unwrap();
        assert_eq!(leaf.default_value(), json!(1.0));
        // "type" inside fx.reverb is a parameter, not a schema tag
        assert!(spec_leaf(engine_spec(), &path("fx.reverb.type")).is_ok());
    }

    #[test]
    fn test_spec_leaf_errors() {
        assert!(matches!(
            spec_leaf(engine_spec(), &path("osc.bogus")),
            Err(PathError::UnknownParameter { .. })
        ));
        assert!(matches!(
            spec_leaf(engine_spec(), &path("osc.frequency.deeper")),
            Err(PathError::UnknownParameter { .. })
        ));
        assert!(matches!(
            spec_leaf(engine_spec(), &path("osc.waves")),
            Err(PathError::NotAParameter { .. })
        ));
    }

    #[test]
    fn test_set_param_writes() {
        let mut state = working_state();
        set_param(&mut state, &path("globalFilter.type"), json!("bandpass")).unwrap();
        assert_eq!(
            get_param(&state, &path("globalFilter.type")),
            Some(&json!("bandpass"))
        );
    }

    #[test]
    fn test_set_param_rejects_out_of_range() {
        let mut state = working_state();
        let err = set_param(&mut state, &path("global.tuning"), json!(500)).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Validation(ValidationError::OutOfRange { .. })
        ));
        assert_eq!(state.params["global"]["tuning"], json!(440.0));
    }

    #[test]
    fn test_set_param_unknown_path() {
        let mut state = working_state();
        let err = set_param(&mut state, &path("osc.bogus"), json!(1)).unwrap_err();
        assert_eq!(err.to_string(), "unknown parameter: osc.bogus");
    }

    #[test]
    fn test_set_param_missing_group() {
        let mut state = working_state();
        state.params.remove("vibrato");
        let err = set_param(&mut state, &path("vibrato.rate"), json!(2.0)).unwrap_err();
        assert!(matches!(err, ConfigError::Path(PathError::Unresolved { .. })));
    }

    #[test]
    fn test_set_param_unknown_version() {
        let mut state = working_state();
        state.version = "7.0.0".to_string();
        assert!(matches!(
            set_param(&mut state, &path("osc.detune"), json!(1)),
            Err(ConfigError::UnknownVersion(_))
        ));
    }
}
