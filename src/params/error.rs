use std::path::PathBuf;

use thiserror::Error;

/// Error returned when a parameter is absent from the runtime cache and no
/// fallback container can supply it.
///
/// This is the only lookup error this crate produces; anything else a lookup
/// can observe (a null value, an empty parameter set) is ordinary data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("runtime parameter '{name}' was not found")]
pub struct ParameterNotFound {
    name: String,
}

impl ParameterNotFound {
    /// Creates the error for the given parameter name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The name of the parameter that was requested.
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContainerError {
    #[error("static parameter file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to read static parameters from '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse static parameters: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("failed to serialize static config: {0}")]
    SerializeError(#[from] serde_json::Error),

    #[error("static config must serialize to a key-value mapping")]
    NotAMap,
}
