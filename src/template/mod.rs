//! Template-engine integration.

mod extension;

pub use extension::RuntimeConfigExtension;
