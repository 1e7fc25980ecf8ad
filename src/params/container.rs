//! Static fallback containers consulted when the runtime cache misses.

use std::fmt;
use std::io;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use super::error::{ContainerError, ParameterNotFound};
use super::provider::ParameterMap;

/// Static, wiring-time parameter store consulted as a fallback.
///
/// The bag only ever borrows a container, it never owns one; see
/// [`RuntimeParameterBag::set_container`](crate::params::RuntimeParameterBag::set_container).
pub trait ParameterContainer: Send + Sync + fmt::Debug {
    /// Whether the container holds a parameter under this name.
    fn has_parameter(&self, name: &str) -> bool;

    /// Returns the parameter value, or [`ParameterNotFound`] if absent.
    fn parameter(&self, name: &str) -> Result<Value, ParameterNotFound>;
}

/// In-memory [`ParameterContainer`] keyed by flat, dot-separated names.
///
/// Mirrors the usual shape of compiled application configuration: nested
/// sections flattened into names like `server.port`. Build one inline with
/// [`with_parameter`](Self::with_parameter), from a TOML document, or from
/// any serializable config snapshot.
///
/// ## Example
///
/// ```
/// use runtime_config::params::{ParameterContainer, StaticContainer};
///
/// let container = StaticContainer::from_toml_str(r#"
///     [server]
///     host = "localhost"
///     port = 8080
/// "#)?;
///
/// assert!(container.has_parameter("server.port"));
/// assert_eq!(container.parameter("server.host")?.as_str(), Some("localhost"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticContainer {
    parameters: ParameterMap,
}

impl StaticContainer {
    /// Creates an empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter, replacing any previous value under the same name.
    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// Builds a container from a TOML document.
    ///
    /// Nested tables flatten into dot-separated parameter names. Arrays,
    /// including arrays of tables, stay whole values; datetimes and
    /// non-finite floats become strings.
    pub fn from_toml_str(document: &str) -> Result<Self, ContainerError> {
        let table: toml::Table = toml::from_str(document)?;
        let map = table
            .into_iter()
            .map(|(key, value)| (key, json_value(value)))
            .collect();
        Ok(Self::from_object(map))
    }

    /// Builds a container from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ContainerError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_toml_str(&contents),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(ContainerError::FileNotFound(path.to_path_buf()))
            }
            Err(e) => Err(ContainerError::ReadError {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }

    /// Builds a container from any serializable configuration snapshot.
    ///
    /// Lets an application expose its already-deserialized static config as
    /// fallback parameters. The snapshot must serialize to a map.
    pub fn from_config<T: Serialize>(config: &T) -> Result<Self, ContainerError> {
        match serde_json::to_value(config)? {
            Value::Object(map) => Ok(Self::from_object(map)),
            _ => Err(ContainerError::NotAMap),
        }
    }

    fn from_object(map: ParameterMap) -> Self {
        let mut parameters = ParameterMap::new();
        for (name, value) in map {
            flatten(name, value, &mut parameters);
        }
        Self { parameters }
    }
}

impl ParameterContainer for StaticContainer {
    fn has_parameter(&self, name: &str) -> bool {
        self.parameters.contains_key(name)
    }

    fn parameter(&self, name: &str) -> Result<Value, ParameterNotFound> {
        self.parameters
            .get(name)
            .cloned()
            .ok_or_else(|| ParameterNotFound::new(name))
    }
}

/// Flattens nested objects into dot-separated names; everything else is a
/// leaf, empty objects included.
fn flatten(name: String, value: Value, out: &mut ParameterMap) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, nested) in map {
                flatten(format!("{name}.{key}"), nested, out);
            }
        }
        leaf => {
            out.insert(name, leaf);
        }
    }
}

/// Converts a TOML value into its JSON counterpart. Datetimes and
/// non-finite floats, which JSON cannot carry, become strings.
fn json_value(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) if f.is_finite() => Value::from(f),
        toml::Value::Float(f) => Value::String(f.to_string()),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(json_value).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(key, value)| (key, json_value(value)))
                .collect(),
        ),
    }
}
