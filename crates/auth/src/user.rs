//! User record: the identity a credential resolves to.

use serde::{Deserialize, Serialize};

use idgate_core::{EmailAddress, UserId, UserName};

/// A registered user.
///
/// # Invariants
/// - `email` identifies at most one user.
/// - Records are never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: UserName,
    pub email: EmailAddress,
}

impl User {
    /// Build a fresh record with a newly generated identifier.
    pub fn new(name: UserName, email: EmailAddress) -> Self {
        Self {
            id: UserId::new(),
            name,
            email,
        }
    }

    /// Public view of the user with the identifier withheld.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            name: self.name.as_str().to_string(),
            email: self.email.as_str().to_string(),
        }
    }
}

/// What a protected endpoint reveals about the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ann() -> User {
        User::new(
            UserName::parse("Ann").unwrap(),
            EmailAddress::parse("ann@x.com").unwrap(),
        )
    }

    #[test]
    fn profile_omits_identifier() {
        let json = serde_json::to_value(ann().profile()).unwrap();
        assert_eq!(json, serde_json::json!({ "name": "Ann", "email": "ann@x.com" }));
    }

    #[test]
    fn user_serializes_id_as_string() {
        let user = ann();
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["id"].as_str().unwrap(), user.id.to_string());
    }
}
