pub mod generic_handler;
pub mod policy_handler;

pub use generic_handler::*;
pub use policy_handler::*;

use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::core::types::*;

/// Ordered, immutable set of site handlers plus the generic fallback
pub struct SiteHandlerRegistry {
    handlers: Vec<Arc<dyn SiteHandler>>,
    generic: GenericHandler,
}

/// Where an attempt for a URL is sent
pub enum Dispatch<'a> {
    Named(&'a dyn SiteHandler),
    Generic(&'a GenericHandler),
}

impl SiteHandlerRegistry {
    pub fn new(handlers: Vec<Arc<dyn SiteHandler>>, generic: GenericHandler) -> Self {
        Self { handlers, generic }
    }

    /// Registry with the built-in handlers sharing one outcome provider and latency
    pub fn with_builtin_handlers(outcomes: Arc<dyn OutcomeProvider>, latency: Duration) -> Self {
        let handlers = builtin_handlers(outcomes.clone(), latency)
            .into_iter()
            .map(|h| Arc::new(h) as Arc<dyn SiteHandler>)
            .collect();
        Self::new(handlers, GenericHandler::new(outcomes).with_latency(latency))
    }

    /// Hostname without a leading "www.", or the raw input when it does not parse as a URL
    pub fn extract_domain(url: &str) -> String {
        match Url::parse(url).ok().and_then(|u| u.host_str().map(str::to_string)) {
            Some(host) => host.strip_prefix("www.").map(str::to_string).unwrap_or(host),
            None => url.to_string(),
        }
    }

    /// First handler whose domain and the URL's host contain one another
    pub fn resolve(&self, url: &str) -> Option<&dyn SiteHandler> {
        let domain = Self::extract_domain(url);
        if domain.is_empty() {
            return None;
        }
        self.handlers
            .iter()
            .find(|h| domain.contains(h.domain()) || h.domain().contains(domain.as_str()))
            .map(|h| h.as_ref())
    }

    pub fn dispatch(&self, url: &str) -> Dispatch<'_> {
        match self.resolve(url) {
            Some(handler) => Dispatch::Named(handler),
            None => Dispatch::Generic(&self.generic),
        }
    }

    /// Fields the resolved handler needs, or the full default set
    pub fn required_fields(&self, url: &str) -> Vec<Field> {
        match self.resolve(url) {
            Some(handler) => handler.required_fields().to_vec(),
            None => DEFAULT_REQUIRED_FIELDS.to_vec(),
        }
    }

    /// Name of the handler a URL maps to
    pub fn handler_name(&self, url: &str) -> String {
        self.resolve(url)
            .map(|h| h.name().to_string())
            .unwrap_or_else(|| GENERIC_HANDLER_NAME.to_string())
    }
}
