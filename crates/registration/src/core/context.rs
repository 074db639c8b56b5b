use std::time::Instant;

use super::types::*;

pub const FALLBACK_FAILURE_MESSAGE: &str = "Registration failed after all retry attempts";

/// State machine for one site's retry sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptState {
    Initial,
    Attempting(u32),
    Success,
    Failed { error: String },
    /// Run was reset while the sequence was in flight
    Abandoned,
}

impl AttemptState {
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            AttemptState::Success | AttemptState::Failed { .. } | AttemptState::Abandoned
        )
    }
}

/// What one attempt produced
#[derive(Debug, Clone)]
pub struct AttemptRecord {
    pub attempt: u32,
    /// Phone identity used, if one could be selected
    pub phone_id: Option<String>,
    pub outcome: Option<RegistrationOutcome>,
    pub error: Option<String>,
}

impl AttemptRecord {
    pub fn sms_expected(&self) -> bool {
        self.outcome.as_ref().is_some_and(|o| o.sms_expected)
    }
}

#[derive(Debug, Clone)]
pub struct StateTransition {
    pub from: AttemptState,
    pub to: AttemptState,
}

/// Context for a retry sequence
#[derive(Debug)]
pub struct AttemptContext {
    pub site_id: String,
    pub state: AttemptState,
    pub max_retries: u32,
    pub last_error: Option<String>,
    pub records: Vec<AttemptRecord>,
    pub transitions: Vec<StateTransition>,
    pub started_at: Instant,
}

impl AttemptContext {
    pub fn new(site_id: impl Into<String>, max_retries: u32) -> Self {
        Self {
            site_id: site_id.into(),
            state: AttemptState::Initial,
            max_retries: max_retries.max(1),
            last_error: None,
            records: Vec::new(),
            transitions: Vec::new(),
            started_at: Instant::now(),
        }
    }

    fn transition(&mut self, new_state: AttemptState) {
        let from = std::mem::replace(&mut self.state, new_state.clone());
        self.transitions.push(StateTransition { from, to: new_state });
    }

    /// Current attempt number, 0 before the first attempt
    pub fn attempt(&self) -> u32 {
        self.records.len() as u32
    }

    pub fn begin_attempt(&mut self) -> u32 {
        let n = match self.state {
            AttemptState::Attempting(n) => n + 1,
            _ => 1,
        };
        self.transition(AttemptState::Attempting(n));
        n
    }

    pub fn can_retry(&self) -> bool {
        match self.state {
            AttemptState::Attempting(n) => n < self.max_retries,
            AttemptState::Initial => true,
            _ => false,
        }
    }

    pub fn record(&mut self, record: AttemptRecord) {
        if let Some(ref error) = record.error {
            self.last_error = Some(error.clone());
        }
        self.records.push(record);
    }

    pub fn succeed(&mut self) {
        self.transition(AttemptState::Success);
    }

    /// Terminal failure, carrying the last recorded error or a fallback
    pub fn fail(&mut self) {
        let error = self
            .last_error
            .clone()
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_FAILURE_MESSAGE.to_string());
        self.transition(AttemptState::Failed { error });
    }

    pub fn abandon(&mut self) {
        self.transition(AttemptState::Abandoned);
    }

    pub fn duration(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }
}
