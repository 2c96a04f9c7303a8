//! Request-body schemas for the account endpoints.
//!
//! Bodies arrive with every field optional so that a missing field and an
//! empty one can be told apart. [`Validate::validate`] checks the fields in
//! declaration order, stops at the first failure and, on success, yields the
//! service input type.

use std::fmt;

use serde::Deserialize;

use super::domain::{ChangePasswordInput, CreateUserInput, UpdateUserInput};

const EMAIL_MAX_CHARS: usize = 254;
const LOCAL_PART_MAX_CHARS: usize = 64;
const DOMAIN_LABEL_MAX_CHARS: usize = 63;
// RFC 5322 atext besides alphanumerics
const LOCAL_PART_SYMBOLS: &str = "!#$%&'*+-/=?^_`{|}~";

/// Which constraint a field broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    Required,
    Empty,
    TooShort { min: usize },
    TooLong { max: usize },
    InvalidEmail,
}

/// First constraint violation found in a request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Wire name of the field, e.g. `confirm_password`
    pub field: &'static str,
    /// Human label used in the message, e.g. `Confirm Password`
    pub label: &'static str,
    pub kind: ValidationErrorKind,
    pub message: String,
}

impl ValidationError {
    fn new(rule: &StringRule, kind: ValidationErrorKind) -> Self {
        let label = rule.label;
        let message = match kind {
            ValidationErrorKind::Required => format!("\"{label}\" is required"),
            ValidationErrorKind::Empty => format!("\"{label}\" is not allowed to be empty"),
            ValidationErrorKind::TooShort { min } => {
                format!("\"{label}\" length must be at least {min} characters long")
            }
            ValidationErrorKind::TooLong { max } => {
                format!("\"{label}\" length must be less than or equal to {max} characters long")
            }
            ValidationErrorKind::InvalidEmail => format!("\"{label}\" must be a valid email"),
        };
        Self { field: rule.field, label, kind, message }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Constraints for one string field.
#[derive(Debug, Clone, Copy)]
pub struct StringRule {
    pub field: &'static str,
    pub label: &'static str,
    pub min: Option<usize>,
    pub max: Option<usize>,
    pub email: bool,
}

impl StringRule {
    const fn text(field: &'static str, label: &'static str, min: usize, max: usize) -> Self {
        Self { field, label, min: Some(min), max: Some(max), email: false }
    }

    const fn email(field: &'static str, label: &'static str) -> Self {
        Self { field, label, min: None, max: None, email: true }
    }

    /// Check a required value against this rule and hand it back on success.
    pub fn check(&self, value: Option<String>) -> Result<String, ValidationError> {
        let value = value.ok_or_else(|| ValidationError::new(self, ValidationErrorKind::Required))?;
        if value.is_empty() {
            return Err(ValidationError::new(self, ValidationErrorKind::Empty));
        }
        let len = value.chars().count();
        if let Some(min) = self.min {
            if len < min {
                return Err(ValidationError::new(self, ValidationErrorKind::TooShort { min }));
            }
        }
        if let Some(max) = self.max {
            if len > max {
                return Err(ValidationError::new(self, ValidationErrorKind::TooLong { max }));
            }
        }
        if self.email && !is_valid_email(&value) {
            return Err(ValidationError::new(self, ValidationErrorKind::InvalidEmail));
        }
        Ok(value)
    }
}

pub const NAME: StringRule = StringRule::text("name", "Name", 1, 100);
pub const EMAIL: StringRule = StringRule::email("email", "Email");
pub const PASSWORD: StringRule = StringRule::text("password", "Password", 6, 32);
pub const CONFIRM_PASSWORD: StringRule = StringRule::text("confirm_password", "Confirm Password", 6, 32);
pub const OLD_PASSWORD: StringRule = StringRule::text("old_password", "Old Password", 6, 32);
pub const NEW_PASSWORD: StringRule = StringRule::text("new_password", "New Password", 6, 32);

/// Turn a raw request body into a checked service input.
pub trait Validate {
    type Output;

    fn validate(self) -> Result<Self::Output, ValidationError>;
}

/// Body of the create-user endpoint.
#[derive(Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateUserBody {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

impl Validate for CreateUserBody {
    type Output = CreateUserInput;

    fn validate(self) -> Result<CreateUserInput, ValidationError> {
        Ok(CreateUserInput {
            name: NAME.check(self.name)?,
            email: EMAIL.check(self.email)?,
            password: PASSWORD.check(self.password)?,
            confirm_password: CONFIRM_PASSWORD.check(self.confirm_password)?,
        })
    }
}

/// Body of the update-user endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserBody {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl Validate for UpdateUserBody {
    type Output = UpdateUserInput;

    fn validate(self) -> Result<UpdateUserInput, ValidationError> {
        Ok(UpdateUserInput {
            name: NAME.check(self.name)?,
            email: EMAIL.check(self.email)?,
        })
    }
}

/// Body of the change-password endpoint.
#[derive(Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChangePasswordBody {
    pub old_password: Option<String>,
    pub new_password: Option<String>,
    pub confirm_password: Option<String>,
}

impl Validate for ChangePasswordBody {
    type Output = ChangePasswordInput;

    fn validate(self) -> Result<ChangePasswordInput, ValidationError> {
        Ok(ChangePasswordInput {
            old_password: OLD_PASSWORD.check(self.old_password)?,
            new_password: NEW_PASSWORD.check(self.new_password)?,
            confirm_password: CONFIRM_PASSWORD.check(self.confirm_password)?,
        })
    }
}

/// Dot-atom local part: atext runs joined by single dots.
fn is_valid_local_part(local: &str) -> bool {
    if local.is_empty() || local.chars().count() > LOCAL_PART_MAX_CHARS {
        return false;
    }
    local.split('.').all(|atom| {
        !atom.is_empty()
            && atom.chars().all(|c| {
                c.is_ascii_alphanumeric()
                    || LOCAL_PART_SYMBOLS.contains(c)
                    || (!c.is_ascii() && c.is_alphanumeric())
            })
    })
}

/// Syntactic email check: `dot.atom@label.label...tld`.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().count() > EMAIL_MAX_CHARS {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else { return false };
    if !is_valid_local_part(local) {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }
    let labels_ok = labels.iter().all(|label| {
        !label.is_empty()
            && label.len() <= DOMAIN_LABEL_MAX_CHARS
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    });
    let tld_ok = labels
        .last()
        .map(|tld| tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic()))
        .unwrap_or(false);
    labels_ok && tld_ok
}
