use autoreg_core::AppConfig;
use autoreg_registration::{Dispatch, SiteHandlerRegistry};

use super::build_registry;

pub fn run(config: &AppConfig, url: &str) {
    let registry = build_registry(config);

    println!("URL:      {}", url);
    println!("Domain:   {}", SiteHandlerRegistry::extract_domain(url));
    match registry.dispatch(url) {
        Dispatch::Named(handler) => {
            println!("Handler:  {} ({})", handler.name(), handler.domain());
        }
        Dispatch::Generic(_) => {
            println!("Handler:  generic fallback");
        }
    }

    let fields: Vec<&str> = registry
        .required_fields(url)
        .into_iter()
        .map(|f| f.as_str())
        .collect();
    println!("Requires: {}", fields.join(", "));
}
