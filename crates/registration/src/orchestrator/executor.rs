use std::sync::Arc;
use tracing::{info, warn};

use crate::core::types::*;
use crate::handlers::{Dispatch, SiteHandlerRegistry};
use crate::validator::RegistrationValidator;

/// Runs single attempts through the handler a URL resolves to
#[derive(Clone)]
pub struct AttemptExecutor {
    registry: Arc<SiteHandlerRegistry>,
}

impl AttemptExecutor {
    pub fn new(registry: Arc<SiteHandlerRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &SiteHandlerRegistry {
        &self.registry
    }

    pub fn validator(&self) -> RegistrationValidator<'_> {
        RegistrationValidator::new(&self.registry)
    }

    /// Execute one attempt. Handler errors become failed outcomes, never `Err`.
    pub async fn execute(&self, url: &str, data: &RegistrationData) -> RegistrationOutcome {
        let handler = match self.registry.dispatch(url) {
            Dispatch::Named(handler) => handler,
            Dispatch::Generic(generic) => return generic.register(url, data).await,
        };

        let sms_expected = handler.required_fields().contains(&Field::PhoneNumber);
        let name = handler.name().to_string();

        match handler.register(data).await {
            Ok(true) => {
                info!(handler = %name, "registration accepted");
                RegistrationOutcome {
                    success: true,
                    message: format!("Registration successful on {}", name),
                    sms_expected,
                    handler: name,
                }
            }
            Ok(false) => RegistrationOutcome {
                success: false,
                message: format!("Registration failed on {}", name),
                sms_expected,
                handler: name,
            },
            Err(e) => {
                warn!(handler = %name, error = %e, "handler execution failed");
                RegistrationOutcome {
                    success: false,
                    message: format!("Error registering on {}: {}", name, e),
                    sms_expected,
                    handler: name,
                }
            }
        }
    }
}
