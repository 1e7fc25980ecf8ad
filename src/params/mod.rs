//! Runtime parameter lookup: the bag, its collaborator traits, and the
//! shipped implementations.

mod bag;
mod container;
mod error;
mod logger;
mod provider;

pub use bag::RuntimeParameterBag;
pub use container::{ParameterContainer, StaticContainer};
pub use error::{ContainerError, ParameterNotFound};
pub use logger::{ParameterLogger, TracingLogger};
pub use provider::{JsonFileProvider, MapProvider, ParameterMap, ParameterProvider};
