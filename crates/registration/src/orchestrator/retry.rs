use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

use autoreg_core::{RegistrationConfig, Site};

use crate::core::*;
use crate::events::EventLog;
use crate::form_filler::placeholder_data;
use crate::orchestrator::control::RunSignal;
use crate::orchestrator::executor::AttemptExecutor;
use crate::phone_pool::PhoneNumberPool;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl From<&RegistrationConfig> for RetryPolicy {
    fn from(config: &RegistrationConfig) -> Self {
        Self {
            max_retries: config.max_retries.max(1),
            delay: config.retry_delay(),
        }
    }
}

/// Bounded retry loop around the attempt executor
pub struct RetryController<'a> {
    executor: &'a AttemptExecutor,
    policy: RetryPolicy,
    events: &'a EventLog,
    synthesize: fn(&str) -> RegistrationData,
}

impl<'a> RetryController<'a> {
    pub fn new(executor: &'a AttemptExecutor, policy: RetryPolicy, events: &'a EventLog) -> Self {
        Self {
            executor,
            policy,
            events,
            synthesize: placeholder_data,
        }
    }

    /// Replace how attempt data is built from the selected phone number
    pub fn with_data(mut self, synthesize: fn(&str) -> RegistrationData) -> Self {
        self.synthesize = synthesize;
        self
    }

    /// Run up to `max_retries` attempts for `site`.
    ///
    /// Data is assembled fresh per attempt. Running out of active phone numbers
    /// fails the sequence at once; validation and handler failures are retried.
    /// A reset observed at a suspension point abandons the sequence.
    pub async fn run(
        &self,
        site: &Site,
        phones: &RwLock<PhoneNumberPool>,
        signal: &mut RunSignal,
    ) -> RetryReport {
        let mut ctx = AttemptContext::new(site.id.clone(), self.policy.max_retries);
        let site_id = Some(site.id.as_str());

        while ctx.can_retry() {
            if ctx.attempt() > 0 {
                self.events.warning(
                    format!(
                        "Retry attempt {}/{} for {}",
                        ctx.attempt() + 1,
                        ctx.max_retries,
                        site.name
                    ),
                    site_id,
                );
                if !signal.sleep_unless_reset(self.policy.delay).await {
                    ctx.abandon();
                    return RetryReport::new(ctx);
                }
            }

            let attempt = ctx.begin_attempt();
            self.events.info(format!("Starting registration for {}", site.name), site_id);

            let phone = match phones.write().await.select_active() {
                Ok(phone) => phone,
                Err(e) => {
                    self.events.error(e.to_string(), site_id);
                    ctx.record(AttemptRecord {
                        attempt,
                        phone_id: None,
                        outcome: None,
                        error: Some(e.to_string()),
                    });
                    ctx.fail();
                    return RetryReport::new(ctx);
                }
            };
            self.events.info(format!("Using phone number: {}", phone.number), site_id);

            let data = (self.synthesize)(&phone.number);
            if let Err(e) = self.executor.validator().validate(&site.url, &data).into_result() {
                self.events.error(
                    format!("Attempt {} failed for {}: {}", attempt, site.name, e),
                    site_id,
                );
                ctx.record(AttemptRecord {
                    attempt,
                    phone_id: Some(phone.id),
                    outcome: None,
                    error: Some(e.to_string()),
                });
                continue;
            }

            let outcome = self.executor.execute(&site.url, &data).await;
            debug!(
                site_id = %site.id,
                attempt,
                handler = %outcome.handler,
                success = outcome.success,
                "attempt finished"
            );

            if outcome.sms_expected {
                self.events.info(format!("SMS verification expected for {}", site.name), site_id);
            }

            let success = outcome.success;
            let message = outcome.message.clone();
            ctx.record(AttemptRecord {
                attempt,
                phone_id: Some(phone.id),
                error: (!success).then(|| message.clone()),
                outcome: Some(outcome),
            });

            if signal.is_reset() {
                ctx.abandon();
                return RetryReport::new(ctx);
            }

            if success {
                ctx.succeed();
                return RetryReport::new(ctx);
            }

            self.events.error(
                format!("Attempt {} failed for {}: {}", attempt, site.name, message),
                site_id,
            );
        }

        ctx.fail();
        RetryReport::new(ctx)
    }
}
