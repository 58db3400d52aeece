//! HS256 signing and verification of [`CredentialClaims`].

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use crate::claims::{CredentialClaims, TokenValidationError, validate_claims};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JwtError {
    #[error("failed to sign credential: {0}")]
    Encode(String),

    /// Bad encoding, bad signature, wrong algorithm or missing claims.
    #[error("malformed or tampered credential")]
    Invalid,

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

/// Signs and verifies credentials with a single process-wide secret.
#[derive(Clone)]
pub struct JwtCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtCodec {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked by `validate_claims` against an injected clock.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn encode(&self, claims: &CredentialClaims) -> Result<String, JwtError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| JwtError::Encode(e.to_string()))
    }

    /// Verify signature, then the time window at `now`.
    pub fn decode(&self, token: &str, now: DateTime<Utc>) -> Result<CredentialClaims, JwtError> {
        let data = jsonwebtoken::decode::<CredentialClaims>(token, &self.decoding, &self.validation)
            .map_err(|_| JwtError::Invalid)?;
        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

impl core::fmt::Debug for JwtCodec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("JwtCodec")
            .field("algorithm", &"HS256")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}
