use super::context::*;
use super::types::*;

/// Final result of a retry sequence with its per-attempt history
#[derive(Debug)]
pub struct RetryReport {
    pub site_id: String,
    pub state: AttemptState,
    pub attempts: Vec<AttemptRecord>,
    pub duration_ms: u128,
}

impl RetryReport {
    pub fn new(context: AttemptContext) -> Self {
        debug_assert!(context.state.is_finished());
        Self {
            duration_ms: context.duration().as_millis(),
            site_id: context.site_id,
            state: context.state,
            attempts: context.records,
        }
    }

    pub fn is_success(&self) -> bool {
        self.state == AttemptState::Success
    }

    pub fn is_abandoned(&self) -> bool {
        self.state == AttemptState::Abandoned
    }

    /// Error carried by a failed sequence
    pub fn error(&self) -> Option<&str> {
        match &self.state {
            AttemptState::Failed { error } => Some(error),
            _ => None,
        }
    }

    /// Outcome of the successful attempt
    pub fn final_outcome(&self) -> Option<&RegistrationOutcome> {
        self.attempts.last().and_then(|r| r.outcome.as_ref())
    }

    /// Phone ids whose verification capacity was consumed, one entry per attempt
    pub fn sms_usage(&self) -> impl Iterator<Item = &str> {
        self.attempts
            .iter()
            .filter(|r| r.sms_expected())
            .filter_map(|r| r.phone_id.as_deref())
    }

    /// Human-readable summary
    pub fn summary(&self) -> String {
        match &self.state {
            AttemptState::Success => format!(
                "Registration successful for site {} in {}ms (attempts: {})",
                self.site_id,
                self.duration_ms,
                self.attempts.len()
            ),
            AttemptState::Failed { error } => format!(
                "Registration failed for site {}: {} (attempts: {})",
                self.site_id,
                error,
                self.attempts.len()
            ),
            _ => format!("Registration abandoned for site {}", self.site_id),
        }
    }
}
