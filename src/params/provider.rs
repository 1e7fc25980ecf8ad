//! Parameter providers, the source of truth for runtime parameters.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

/// Flat mapping of parameter name to value, as produced by a provider.
///
/// JSON null is a valid parameter value, distinct from an absent key.
pub type ParameterMap = serde_json::Map<String, Value>;

/// Source of truth for runtime-overridable parameters.
///
/// Implementations return the full current parameter set; the
/// [`RuntimeParameterBag`](crate::params::RuntimeParameterBag) calls this at
/// most once per cache generation.
///
/// Fetching is infallible by contract. How an implementation deals with its
/// own backend failures (defaults, empty set, stale data) is its own
/// business.
pub trait ParameterProvider: Send + Sync + fmt::Debug {
    /// Returns all current parameters as a key-value mapping.
    fn parameters(&self) -> ParameterMap;
}

/// Provider backed by a fixed in-memory mapping.
///
/// Useful as a stand-in source during wiring and in tests.
#[derive(Debug, Clone, Default)]
pub struct MapProvider {
    parameters: ParameterMap,
}

impl MapProvider {
    /// Creates an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter, replacing any previous value under the same name.
    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }
}

impl From<ParameterMap> for MapProvider {
    fn from(parameters: ParameterMap) -> Self {
        Self { parameters }
    }
}

impl ParameterProvider for MapProvider {
    fn parameters(&self) -> ParameterMap {
        self.parameters.clone()
    }
}

/// Provider that re-reads a JSON file on every fetch.
///
/// The file must hold a single top-level JSON object; its entries become the
/// parameter set. Because a fetch cannot fail, load problems degrade to an
/// empty mapping: a missing file is reported at debug level (running without
/// overrides is normal), anything else at warn level.
///
/// ## Example
///
/// ```no_run
/// use runtime_config::params::{JsonFileProvider, RuntimeParameterBag};
///
/// let bag = RuntimeParameterBag::new(JsonFileProvider::new("config/runtime.json"));
/// let parameters = bag.all();
/// ```
#[derive(Debug, Clone)]
pub struct JsonFileProvider {
    path: PathBuf,
}

impl JsonFileProvider {
    /// Creates a provider reading from the given path.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn load(&self) -> Result<ParameterMap, LoadError> {
        let contents = std::fs::read_to_string(&self.path)?;
        let document: Value = serde_json::from_str(&contents)?;
        match document {
            Value::Object(parameters) => Ok(parameters),
            _ => Err(LoadError::NotAnObject),
        }
    }
}

impl ParameterProvider for JsonFileProvider {
    fn parameters(&self) -> ParameterMap {
        match self.load() {
            Ok(parameters) => parameters,
            Err(LoadError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("no runtime parameter file at '{}'", self.path.display());
                ParameterMap::new()
            }
            Err(e) => {
                tracing::warn!(
                    "failed to load runtime parameters from '{}': {}",
                    self.path.display(),
                    e
                );
                ParameterMap::new()
            }
        }
    }
}

#[derive(Debug, Error)]
enum LoadError {
    #[error("{0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a top-level JSON object")]
    NotAnObject,
}
