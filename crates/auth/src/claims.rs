use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use idgate_core::UserId;

use crate::User;

/// Fixed validity window of a signed credential, in seconds.
pub const SIGNED_CREDENTIAL_TTL_SECS: i64 = 15 * 60;

/// Claims embedded in a signed credential.
///
/// Timestamps are unix seconds (`iat`/`exp` as in RFC 7519) so the token is
/// readable by any standard JWT tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialClaims {
    #[serde(rename = "userId")]
    pub user_id: UserId,

    pub email: String,

    /// Issued-at timestamp.
    pub iat: i64,

    /// Expiration timestamp.
    pub exp: i64,

    /// Per-issuance identifier (UUIDv7), so two credentials for the same
    /// user minted within one second still differ.
    pub jti: String,
}

impl CredentialClaims {
    /// Claims for `user`, valid from `issued_at` for [`SIGNED_CREDENTIAL_TTL_SECS`].
    pub fn for_user(user: &User, issued_at: DateTime<Utc>) -> Self {
        let iat = issued_at.timestamp();
        Self {
            user_id: user.id,
            email: user.email.as_str().to_string(),
            iat,
            exp: iat + SIGNED_CREDENTIAL_TTL_SECS,
            jti: Uuid::now_v7().to_string(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (iat is in the future)")]
    NotYetValid,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,
}

/// Deterministically validate the time window of decoded claims.
///
/// Signature verification happens before this, in [`crate::JwtCodec`].
pub fn validate_claims(
    claims: &CredentialClaims,
    now: DateTime<Utc>,
) -> Result<(), TokenValidationError> {
    let now = now.timestamp();
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.iat {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}
