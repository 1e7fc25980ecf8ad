use std::sync::Arc;

use handlebars::Handlebars;
use runtime_config::params::{
    JsonFileProvider, RuntimeParameterBag, StaticContainer, TracingLogger,
};
use runtime_config::RuntimeConfigExtension;

const STOREFRONT: &str = "\
{{runtime_config \"site.name\"}}: {{runtime_config \"site.tagline\"}}
currency {{runtime_config \"checkout.currency\"}}, cart limit {{runtime_config \"checkout.max_items\"}}
{{runtime_config \"checkout.banner\"}}
";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    // Static configuration fixed at deploy time
    let container = Arc::new(StaticContainer::from_toml_file("demos/static.toml")?);

    // Runtime overrides re-read from disk on every cache generation
    let mut bag = RuntimeParameterBag::new(JsonFileProvider::new("demos/parameters.json"))
        .with_logger(TracingLogger::default());
    bag.set_container(&container);
    let bag = Arc::new(bag);

    let mut registry = Handlebars::new();
    RuntimeConfigExtension::register(bag.clone(), &mut registry);
    registry.register_template_string("storefront", STOREFRONT)?;

    println!("{}", registry.render("storefront", &())?);

    println!("tagline (runtime wins)  = {}", bag.get("site.tagline")?);
    println!("currency (static only)  = {}", bag.get("checkout.currency")?);
    println!("missing key             = {:?}", bag.get("checkout.promo_code").err());

    // Start a new generation; the next lookup re-reads the JSON file
    bag.deinitialize();
    println!("after refresh           = {}", bag.get("site.tagline")?);

    Ok(())
}
