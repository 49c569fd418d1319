//! Typed addressing of nested parameters.
//!
//! A [`ParamPath`] is a sequence of field selectors such as
//! `["osc", "waves", "sine"]`. It replaces dotted string keys so that
//! malformed addresses are rejected once, at parse time, with a
//! structured [`PathError`].

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};
use thiserror::Error;

/// Errors produced while parsing or resolving a [`ParamPath`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    /// The path has no segments.
    #[error("parameter path is empty")]
    Empty,

    /// The path contains an empty segment (e.g. `"osc..frequency"`).
    #[error("parameter path '{path}' contains an empty segment")]
    EmptySegment {
        /// The offending path text.
        path: String,
    },

    /// No spec node exists at the path.
    #[error("unknown parameter: {path}")]
    UnknownParameter {
        /// The unresolved path.
        path: String,
    },

    /// The path names a group rather than a single parameter.
    #[error("'{path}' is a parameter group, not a parameter")]
    NotAParameter {
        /// The path of the group.
        path: String,
    },

    /// An intermediate group is missing from the target state.
    #[error("invalid state path: {path}")]
    Unresolved {
        /// The path that could not be followed.
        path: String,
    },
}

/// A path into a nested parameter tree.
///
/// The root path has no segments and displays as the empty string.
///
/// # Example
///
/// ```rust
/// use soundlab_config::ParamPath;
///
/// let path: ParamPath = "osc.waves.sine".parse().unwrap();
/// assert_eq!(path.segments(), ["osc", "waves", "sine"]);
/// assert_eq!(path.to_string(), "osc.waves.sine");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParamPath(Vec<String>);

impl ParamPath {
    /// The root path.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Build a path from segments.
    pub fn from_segments<I, S>(segments: I) -> Result<Self, PathError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(PathError::Empty);
        }
        if segments.iter().any(String::is_empty) {
            return Err(PathError::EmptySegment {
                path: segments.join("."),
            });
        }
        Ok(Self(segments))
    }

    /// Return a new path with `key` appended.
    pub fn child(&self, key: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(key.to_string());
        Self(segments)
    }

    /// The path segments, outermost first.
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Whether this is the root path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Split into parent segments and the final field name.
    pub fn split_last(&self) -> Option<(&str, &[String])> {
        self.0.split_last().map(|(last, parents)| (last.as_str(), parents))
    }

    /// Look up the value at this path inside a nested map.
    pub fn lookup<'a>(&self, root: &'a Map<String, Value>) -> Option<&'a Value> {
        let (last, parents) = self.split_last()?;
        let mut cursor = root;
        for segment in parents {
            cursor = cursor.get(segment)?.as_object()?;
        }
        cursor.get(last)
    }

    /// Mutable lookup of the map that owns the final segment.
    ///
    /// Fails with [`PathError::Unresolved`] if any intermediate group is
    /// absent or not an object.
    pub fn parent_mut<'a>(
        &self,
        root: &'a mut Map<String, Value>,
    ) -> Result<(&'a mut Map<String, Value>, String), PathError> {
        let (last, parents) = self.split_last().ok_or(PathError::Empty)?;
        let mut cursor = root;
        for segment in parents {
            cursor = cursor
                .get_mut(segment)
                .and_then(Value::as_object_mut)
                .ok_or_else(|| PathError::Unresolved {
                    path: self.to_string(),
                })?;
        }
        Ok((cursor, last.to_string()))
    }
}

impl fmt::Display for ParamPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

impl FromStr for ParamPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(PathError::Empty);
        }
        Self::from_segments(s.split('.'))
    }
}
