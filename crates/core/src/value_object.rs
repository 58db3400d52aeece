//! Value objects: equality by value, not identity.
//!
//! The registration inputs (`name`, `email`) are wrapped in validated value
//! objects so that an empty or whitespace-only field cannot reach storage.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**: two instances
/// with the same attributes are interchangeable.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

fn non_empty(field: &'static str, raw: &str) -> DomainResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

/// Display name of a user. Trimmed, never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserName(String);

impl UserName {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        non_empty("name", raw).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl ValueObject for UserName {}

impl core::fmt::Display for UserName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Email address used as the unique lookup key for users.
///
/// Only emptiness is checked; addresses are otherwise stored exactly as
/// given (after trimming), so lookups are case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        non_empty("email", raw).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl ValueObject for EmailAddress {}

impl core::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_name_rejected() {
        let err = UserName::parse("").unwrap_err();
        assert_eq!(err, DomainError::validation("name is required"));
    }

    #[test]
    fn whitespace_email_rejected() {
        assert!(EmailAddress::parse("   \t").is_err());
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let email = EmailAddress::parse("  ann@x.com ").unwrap();
        assert_eq!(email.as_str(), "ann@x.com");
    }

    proptest! {
        #[test]
        fn any_non_blank_name_is_accepted(raw in "[a-zA-Z][a-zA-Z ]{0,30}") {
            let name = UserName::parse(&raw).unwrap();
            prop_assert_eq!(name.as_str(), raw.trim());
        }

        #[test]
        fn blank_inputs_never_validate(raw in "[ \t\n]{0,8}") {
            prop_assert!(UserName::parse(&raw).is_err());
            prop_assert!(EmailAddress::parse(&raw).is_err());
        }
    }
}
