//! Outcome providers standing in for the registration transport.

use rand::Rng;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::core::types::OutcomeProvider;
use crate::RegistrationError;

/// Draws success with the handler's nominal probability
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomOutcomes;

impl OutcomeProvider for RandomOutcomes {
    fn draw(&self, _handler: &str, success_rate: f64) -> Result<bool, RegistrationError> {
        Ok(rand::thread_rng().gen_bool(success_rate.clamp(0.0, 1.0)))
    }
}

/// Every attempt ends the same way
#[derive(Debug, Clone, Copy)]
pub struct FixedOutcomes(pub bool);

impl OutcomeProvider for FixedOutcomes {
    fn draw(&self, _handler: &str, _success_rate: f64) -> Result<bool, RegistrationError> {
        Ok(self.0)
    }
}

/// Replays a queued sequence of results, then falls back to a fixed value
#[derive(Debug)]
pub struct ScriptedOutcomes {
    script: Mutex<VecDeque<Result<bool, String>>>,
    fallback: bool,
    draws: Mutex<Vec<String>>,
}

impl ScriptedOutcomes {
    pub fn new<I>(script: I, fallback: bool) -> Self
    where
        I: IntoIterator<Item = Result<bool, String>>,
    {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            fallback,
            draws: Mutex::new(Vec::new()),
        }
    }

    /// Handler names in the order they were drawn for
    pub fn draws(&self) -> Vec<String> {
        self.draws.lock().map(|d| d.clone()).unwrap_or_default()
    }
}

impl OutcomeProvider for ScriptedOutcomes {
    fn draw(&self, handler: &str, _success_rate: f64) -> Result<bool, RegistrationError> {
        if let Ok(mut draws) = self.draws.lock() {
            draws.push(handler.to_string());
        }
        let next = self.script.lock().ok().and_then(|mut s| s.pop_front());
        match next {
            Some(Ok(success)) => Ok(success),
            Some(Err(message)) => Err(RegistrationError::HandlerExecution(message)),
            None => Ok(self.fallback),
        }
    }
}
