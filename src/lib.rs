pub mod params;
pub mod template;
mod error;

pub use params::{ParameterMap, ParameterNotFound, ParameterProvider, RuntimeParameterBag};
pub use template::RuntimeConfigExtension;
pub use error::Error;
