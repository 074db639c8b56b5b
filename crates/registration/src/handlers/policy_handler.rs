use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::core::types::*;
use crate::form_filler::{self, FormPayload};
use crate::RegistrationError;

/// Handler whose result is drawn from an outcome provider at a fixed success rate
pub struct PolicyHandler {
    name: String,
    domain: String,
    required_fields: Vec<Field>,
    success_rate: f64,
    latency: Duration,
    build_form: fn(&RegistrationData) -> FormPayload,
    outcomes: Arc<dyn OutcomeProvider>,
}

impl PolicyHandler {
    pub fn new(
        name: impl Into<String>,
        domain: impl Into<String>,
        required_fields: Vec<Field>,
        success_rate: f64,
        outcomes: Arc<dyn OutcomeProvider>,
    ) -> Self {
        Self {
            name: name.into(),
            domain: domain.into(),
            required_fields,
            success_rate,
            latency: Duration::ZERO,
            build_form: phone_form,
            outcomes,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_form(mut self, build_form: fn(&RegistrationData) -> FormPayload) -> Self {
        self.build_form = build_form;
        self
    }

    pub fn success_rate(&self) -> f64 {
        self.success_rate
    }
}

#[async_trait]
impl SiteHandler for PolicyHandler {
    fn name(&self) -> &str {
        &self.name
    }

    fn domain(&self) -> &str {
        &self.domain
    }

    fn required_fields(&self) -> &[Field] {
        &self.required_fields
    }

    async fn register(&self, data: &RegistrationData) -> Result<bool, RegistrationError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let form = (self.build_form)(data);
        debug!(handler = %self.name, ?form, "submitting registration form");

        self.outcomes.draw(&self.name, self.success_rate)
    }
}

fn phone_form(data: &RegistrationData) -> FormPayload {
    FormPayload::from([("phone", data.phone_number.clone())])
}

/// The site handlers known out of the box, in match priority order
pub fn builtin_handlers(
    outcomes: Arc<dyn OutcomeProvider>,
    latency: Duration,
) -> Vec<PolicyHandler> {
    use Field::*;

    let full = vec![PhoneNumber, Email, FirstName, LastName];
    vec![
        PolicyHandler::new("Sekaimon", "sekaimon.com", vec![PhoneNumber], 0.8, outcomes.clone())
            .with_form(form_filler::sekaimon_form),
        PolicyHandler::new("Qoo10", "qoo10.jp", full.clone(), 0.75, outcomes.clone())
            .with_form(form_filler::qoo10_form),
        PolicyHandler::new(
            "City Heaven",
            "cityheaven.net",
            vec![PhoneNumber],
            0.85,
            outcomes.clone(),
        )
            .with_form(form_filler::city_heaven_form),
        PolicyHandler::new("Mixi", "mixi.com", full.clone(), 0.8, outcomes.clone())
            .with_form(form_filler::mixi_form),
        PolicyHandler::new(
            "Zexy Enmusubi",
            "zexy-enmusubi.net",
            vec![PhoneNumber],
            0.7,
            outcomes.clone(),
        )
            .with_form(form_filler::zexy_enmusubi_form),
        PolicyHandler::new("Suntory", "suntory.co.jp", full, 0.9, outcomes)
            .with_form(form_filler::suntory_form),
    ]
    .into_iter()
    .map(|h| h.with_latency(latency))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form_filler::placeholder_data;
    use crate::outcomes::{FixedOutcomes, ScriptedOutcomes};

    #[test]
    fn test_builtin_handlers_order_and_fields() {
        let handlers = builtin_handlers(Arc::new(FixedOutcomes(true)), Duration::ZERO);
        let domains: Vec<_> = handlers.iter().map(|h| h.domain().to_string()).collect();
        assert_eq!(
            domains,
            vec![
                "sekaimon.com",
                "qoo10.jp",
                "cityheaven.net",
                "mixi.com",
                "zexy-enmusubi.net",
                "suntory.co.jp"
            ]
        );
        assert_eq!(handlers[0].required_fields(), &[Field::PhoneNumber]);
        assert_eq!(handlers[1].required_fields().len(), 4);
        assert!((handlers[5].success_rate() - 0.9).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_register_uses_outcome_provider() {
        let outcomes = Arc::new(ScriptedOutcomes::new(
            vec![Ok(true), Err("connection reset".to_string())],
            false,
        ));
        let fields = vec![Field::PhoneNumber];
        let handler = PolicyHandler::new("Mixi", "mixi.com", fields, 0.8, outcomes.clone())
            .with_form(form_filler::mixi_form);
        let data = placeholder_data("090-0000-0000");

        assert_eq!(handler.register(&data).await, Ok(true));
        assert_eq!(
            handler.register(&data).await,
            Err(RegistrationError::HandlerExecution("connection reset".to_string()))
        );
        assert_eq!(outcomes.draws(), vec!["Mixi", "Mixi"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_register_waits_for_latency() {
        let handler = PolicyHandler::new(
            "Sekaimon",
            "sekaimon.com",
            vec![Field::PhoneNumber],
            0.8,
            Arc::new(FixedOutcomes(true)),
        )
        .with_latency(Duration::from_secs(2));

        let started = tokio::time::Instant::now();
        handler.register(&placeholder_data("090")).await.unwrap();
        assert!(started.elapsed() >= Duration::from_secs(2));
    }
}
