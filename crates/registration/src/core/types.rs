use async_trait::async_trait;
use serde::Serialize;
use std::fmt;

use crate::RegistrationError;

/// Form fields a handler may require
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    PhoneNumber,
    Email,
    FirstName,
    LastName,
    Address,
    Password,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Field::PhoneNumber => "phoneNumber",
            Field::Email => "email",
            Field::FirstName => "firstName",
            Field::LastName => "lastName",
            Field::Address => "address",
            Field::Password => "password",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Required fields assumed for sites without a dedicated handler
pub const DEFAULT_REQUIRED_FIELDS: [Field; 4] =
    [Field::PhoneNumber, Field::Email, Field::FirstName, Field::LastName];

/// Data submitted for one attempt, synthesized fresh each time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationData {
    pub phone_number: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub address: Option<String>,
    pub password: Option<String>,
}

impl RegistrationData {
    /// Value for a field, `None` when absent or empty
    pub fn get(&self, field: Field) -> Option<&str> {
        let value = match field {
            Field::PhoneNumber => Some(self.phone_number.as_str()),
            Field::Email => self.email.as_deref(),
            Field::FirstName => self.first_name.as_deref(),
            Field::LastName => self.last_name.as_deref(),
            Field::Address => self.address.as_deref(),
            Field::Password => self.password.as_deref(),
        };
        value.filter(|v| !v.is_empty())
    }
}

/// Result of one attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationOutcome {
    pub success: bool,
    pub message: String,
    /// The attempt consumed SMS verification capacity of the phone used
    pub sms_expected: bool,
    /// Handler name, or "generic"
    pub handler: String,
}

/// A named registration policy bound to a domain
#[async_trait]
pub trait SiteHandler: Send + Sync {
    /// Display name of the handler
    fn name(&self) -> &str;

    /// Domain this handler is keyed by
    fn domain(&self) -> &str;

    fn required_fields(&self) -> &[Field];

    /// Run the registration, returning whether it succeeded
    async fn register(&self, data: &RegistrationData) -> Result<bool, RegistrationError>;
}

/// Source of simulated transport outcomes
pub trait OutcomeProvider: Send + Sync {
    /// Decide one attempt for `handler`, which nominally succeeds with `success_rate`
    fn draw(&self, handler: &str, success_rate: f64) -> Result<bool, RegistrationError>;
}
