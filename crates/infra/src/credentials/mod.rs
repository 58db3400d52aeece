//! Credential issuance and verification.
//!
//! A [`CredentialScheme`] is picked once per process; [`CredentialScheme::build`]
//! is the only way to get an issuer/verifier pair, which guarantees both
//! sides agree on the credential kind.

pub mod issuer;
pub mod verifier;

use idgate_auth::{CredentialMode, JwtCodec};

use crate::store::Store;

pub use issuer::{CredentialIssuer, IssueError};
pub use verifier::{CredentialVerifier, VerifyError};

#[derive(Debug, Clone)]
pub enum CredentialScheme {
    /// Stateless HS256 JWT; the issuance record is written for audit only.
    Signed(JwtCodec),
    /// Random token; the issuance record is the source of truth.
    Opaque,
}

impl CredentialScheme {
    pub fn signed(secret: &[u8]) -> Self {
        Self::Signed(JwtCodec::new(secret))
    }

    pub fn opaque() -> Self {
        Self::Opaque
    }

    pub fn mode(&self) -> CredentialMode {
        match self {
            CredentialScheme::Signed(_) => CredentialMode::Signed,
            CredentialScheme::Opaque => CredentialMode::Opaque,
        }
    }

    pub fn build(self, store: &Store) -> (CredentialIssuer, CredentialVerifier) {
        let issuer = CredentialIssuer::new(self.clone(), store);
        let verifier = CredentialVerifier::new(self, store);
        (issuer, verifier)
    }
}
