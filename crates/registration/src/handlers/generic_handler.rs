use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::core::types::*;
use crate::form_filler;

pub const GENERIC_HANDLER_NAME: &str = "generic";

const EMAIL_HINTS: [&str; 3] = ["email", "register", "signup"];
const PHONE_HINTS: [&str; 3] = ["phone", "sms", "mobile"];

/// Field needs guessed from a URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldNeeds {
    pub needs_email: bool,
    pub needs_phone: bool,
}

impl FieldNeeds {
    /// Phone flow is taken when phone hints are present or nothing points to email
    pub fn uses_phone(&self) -> bool {
        self.needs_phone || !self.needs_email
    }
}

/// Fallback for sites without a dedicated handler
pub struct GenericHandler {
    success_rate: f64,
    latency: Duration,
    outcomes: Arc<dyn OutcomeProvider>,
}

impl GenericHandler {
    pub fn new(outcomes: Arc<dyn OutcomeProvider>) -> Self {
        Self {
            success_rate: 0.6,
            latency: Duration::ZERO,
            outcomes,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Guess which fields a site wants from URL substrings
    pub fn infer_needs(url: &str) -> FieldNeeds {
        let url_lower = url.to_lowercase();
        FieldNeeds {
            needs_email: EMAIL_HINTS.iter().any(|h| url_lower.contains(h)),
            needs_phone: PHONE_HINTS.iter().any(|h| url_lower.contains(h)),
        }
    }

    pub async fn register(&self, url: &str, data: &RegistrationData) -> RegistrationOutcome {
        info!(url, "using generic handler");

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let needs = Self::infer_needs(url);
        let uses_phone = needs.uses_phone();
        let form = form_filler::generic_form(data, uses_phone, needs.needs_email);
        debug!(?needs, ?form, "generic registration attempt");

        let (success, message) = match self.outcomes.draw(GENERIC_HANDLER_NAME, self.success_rate) {
            Ok(true) => (true, "Registration completed successfully".to_string()),
            Ok(false) => (
                false,
                "Registration failed - site may require manual verification".to_string(),
            ),
            Err(e) => (false, format!("Error registering with generic handler: {}", e)),
        };

        RegistrationOutcome {
            success,
            message,
            sms_expected: uses_phone,
            handler: GENERIC_HANDLER_NAME.to_string(),
        }
    }
}
