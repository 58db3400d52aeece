use serde::{Deserialize, Serialize};

use idgate_auth::User;

use crate::app::errors::ApiError;

// -------------------------
// Request DTOs
// -------------------------

/// Body of `POST /register` and `POST /token`.
///
/// Fields are optional at the JSON level so that a missing field becomes a
/// 400 `invalid_request` instead of an extractor rejection.
#[derive(Debug, Deserialize)]
pub struct CredentialRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl CredentialRequest {
    /// Both fields, present and non-blank.
    pub fn require_fields(self) -> Result<(String, String), ApiError> {
        match (self.name, self.email) {
            (Some(name), Some(email)) if !name.trim().is_empty() && !email.trim().is_empty() => {
                Ok((name, email))
            }
            _ => Err(ApiError::invalid_request("Missing required fields")),
        }
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl From<User> for RegisterResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.into_inner(),
            email: user.email.into_inner(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}
