use crate::params::{ContainerError, ParameterNotFound};
use thiserror::Error;

/// Top-level error type for the runtime-config library.
///
/// ## Example
///
/// ```
/// use runtime_config::params::{ParameterContainer, StaticContainer};
/// use runtime_config::Error;
/// use serde_json::Value;
///
/// fn fallback_theme() -> Result<Value, Error> {
///     let container = StaticContainer::from_toml_str("theme = \"dark\"")?;
///     Ok(container.parameter("theme")?)
/// }
///
/// assert_eq!(fallback_theme()?.as_str(), Some("dark"));
/// # Ok::<(), Error>(())
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("parameter lookup failed: {0}")]
    Parameter(#[from] ParameterNotFound),

    #[error("static container error: {0}")]
    Container(#[from] ContainerError),
}
