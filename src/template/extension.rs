//! Handlebars glue exposing runtime parameters to templates.

use std::sync::Arc;

use handlebars::{
    Context, Handlebars, Helper, HelperDef, RenderContext, RenderError, RenderErrorReason,
    ScopedJson,
};
use serde_json::Value;

use crate::params::RuntimeParameterBag;

/// Template extension backing the `runtime_config` helper.
///
/// `{{runtime_config "some.key"}}` renders the parameter's value. A missing
/// parameter renders as nothing instead of failing the render; this is the
/// only place a [`ParameterNotFound`](crate::params::ParameterNotFound) is
/// swallowed rather than propagated.
///
/// ## Example
///
/// ```
/// use std::sync::Arc;
///
/// use handlebars::Handlebars;
/// use runtime_config::params::{MapProvider, RuntimeParameterBag};
/// use runtime_config::template::RuntimeConfigExtension;
///
/// let bag = Arc::new(RuntimeParameterBag::new(
///     MapProvider::new().with_parameter("site.banner", "Closing sale"),
/// ));
///
/// let mut registry = Handlebars::new();
/// RuntimeConfigExtension::register(bag, &mut registry);
///
/// let html = registry.render_template(r#"{{runtime_config "site.banner"}}"#, &())?;
/// assert_eq!(html, "Closing sale");
/// # Ok::<(), handlebars::RenderError>(())
/// ```
#[derive(Debug, Clone)]
pub struct RuntimeConfigExtension {
    bag: Arc<RuntimeParameterBag>,
}

impl RuntimeConfigExtension {
    /// Name under which the template function is registered.
    pub const FUNCTION_NAME: &'static str = "runtime_config";

    /// Creates the extension over a shared bag.
    pub fn new(bag: Arc<RuntimeParameterBag>) -> Self {
        Self { bag }
    }

    /// Registers the `runtime_config` helper on the given registry.
    pub fn register(bag: Arc<RuntimeParameterBag>, registry: &mut Handlebars<'_>) {
        registry.register_helper(Self::FUNCTION_NAME, Box::new(Self::new(bag)));
    }
}

impl HelperDef for RuntimeConfigExtension {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'rc>, RenderError> {
        let Some(param) = h.param(0) else {
            return Err(RenderErrorReason::ParamNotFoundForIndex(Self::FUNCTION_NAME, 0).into());
        };

        // Non-string arguments (unresolved template variables and the like)
        // look up nothing and render as nothing, same as a missing key.
        let value = param
            .value()
            .as_str()
            .and_then(|name| self.bag.get(name).ok())
            .unwrap_or(Value::Null);

        Ok(ScopedJson::Derived(value))
    }
}
