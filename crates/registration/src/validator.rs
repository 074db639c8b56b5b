use crate::core::types::{Field, RegistrationData};
use crate::handlers::SiteHandlerRegistry;
use crate::RegistrationError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub valid: bool,
    /// Missing fields in required-field order
    pub missing_fields: Vec<Field>,
}

impl Validation {
    pub fn into_result(self) -> Result<(), RegistrationError> {
        if self.valid {
            Ok(())
        } else {
            Err(RegistrationError::MissingRequiredFields(
                self.missing_fields.iter().map(|f| f.as_str().to_string()).collect(),
            ))
        }
    }
}

/// Check `data` against an explicit required-field list
pub fn validate_fields(required: &[Field], data: &RegistrationData) -> Validation {
    let missing_fields: Vec<Field> = required
        .iter()
        .copied()
        .filter(|field| data.get(*field).is_none())
        .collect();
    Validation {
        valid: missing_fields.is_empty(),
        missing_fields,
    }
}

/// Checks assembled data against the fields the URL's handler requires
pub struct RegistrationValidator<'a> {
    registry: &'a SiteHandlerRegistry,
}

impl<'a> RegistrationValidator<'a> {
    pub fn new(registry: &'a SiteHandlerRegistry) -> Self {
        Self { registry }
    }

    pub fn validate(&self, url: &str, data: &RegistrationData) -> Validation {
        validate_fields(&self.registry.required_fields(url), data)
    }
}
