use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::debug;

use idgate_auth::User;

use crate::store::{Store, StoreError, TokenStore, UserStore};

use super::CredentialScheme;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VerifyError {
    /// Empty, malformed, tampered, expired or never issued.
    #[error("invalid or expired credential")]
    InvalidCredential,

    /// The credential is genuine but its user no longer resolves.
    #[error("credential refers to an unknown user")]
    UnknownUser,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Resolves a presented credential back to the user it was issued for.
#[derive(Clone)]
pub struct CredentialVerifier {
    scheme: CredentialScheme,
    users: Arc<dyn UserStore>,
    tokens: Arc<dyn TokenStore>,
}

impl CredentialVerifier {
    pub(crate) fn new(scheme: CredentialScheme, store: &Store) -> Self {
        Self {
            scheme,
            users: store.users(),
            tokens: store.tokens(),
        }
    }

    pub async fn verify(&self, presented: &str) -> Result<User, VerifyError> {
        self.verify_at(presented, Utc::now()).await
    }

    pub async fn verify_at(
        &self,
        presented: &str,
        now: DateTime<Utc>,
    ) -> Result<User, VerifyError> {
        let presented = presented.trim();
        if presented.is_empty() {
            return Err(VerifyError::InvalidCredential);
        }

        let user_id = match &self.scheme {
            CredentialScheme::Signed(codec) => {
                let claims = codec.decode(presented, now).map_err(|e| {
                    debug!(error = %e, "signed credential rejected");
                    VerifyError::InvalidCredential
                })?;
                claims.user_id
            }
            CredentialScheme::Opaque => {
                let record = self.tokens.find_by_token(presented).await?.ok_or_else(|| {
                    debug!("opaque credential not found");
                    VerifyError::InvalidCredential
                })?;
                record.user_id
            }
        };

        self.users
            .find_by_id(&user_id)
            .await?
            .ok_or(VerifyError::UnknownUser)
    }
}

impl core::fmt::Debug for CredentialVerifier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CredentialVerifier")
            .field("mode", &self.scheme.mode())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use idgate_auth::{CredentialClaims, JwtCodec};
    use idgate_core::{EmailAddress, UserName};

    use super::*;
    use crate::store::{IssuanceRecord, MEMORY_URL};

    const SECRET: &[u8] = b"verifier-test-secret-verifier-xx";

    fn ann() -> User {
        User::new(
            UserName::parse("Ann").unwrap(),
            EmailAddress::parse("ann@x.com").unwrap(),
        )
    }

    async fn store_with(user: &User) -> Store {
        let store = Store::connect(MEMORY_URL).await.unwrap();
        store.users().insert(user).await.unwrap();
        store
    }

    #[tokio::test]
    async fn signed_round_trip_resolves_user() {
        let user = ann();
        let store = store_with(&user).await;
        let (issuer, verifier) = CredentialScheme::signed(SECRET).build(&store);

        let record = issuer.issue(&user).await.unwrap();
        assert_eq!(verifier.verify(&record.token).await.unwrap(), user);
    }

    #[tokio::test]
    async fn signed_credential_expires_after_fifteen_minutes() {
        let user = ann();
        let store = store_with(&user).await;
        let (issuer, verifier) = CredentialScheme::signed(SECRET).build(&store);

        let issued = Utc::now() - Duration::minutes(16);
        let record = issuer.issue_at(&user, issued).await.unwrap();

        assert_eq!(
            verifier.verify(&record.token).await.unwrap_err(),
            VerifyError::InvalidCredential
        );
        assert_eq!(
            verifier.verify_at(&record.token, issued + Duration::minutes(14)).await.unwrap(),
            user
        );
    }

    #[tokio::test]
    async fn signed_credential_for_missing_user_is_unknown_user() {
        let store = Store::in_memory();
        let (_, verifier) = CredentialScheme::signed(SECRET).build(&store);

        // Valid signature, but the user was never stored.
        let token = JwtCodec::new(SECRET)
            .encode(&CredentialClaims::for_user(&ann(), Utc::now()))
            .unwrap();
        assert_eq!(verifier.verify(&token).await.unwrap_err(), VerifyError::UnknownUser);
    }

    #[tokio::test]
    async fn malformed_and_blank_credentials_rejected() {
        let store = Store::in_memory();
        for scheme in [CredentialScheme::signed(SECRET), CredentialScheme::opaque()] {
            let (_, verifier) = scheme.build(&store);
            for presented in ["", "   ", "garbage", "a.b.c"] {
                assert_eq!(
                    verifier.verify(presented).await.unwrap_err(),
                    VerifyError::InvalidCredential,
                    "presented {presented:?}"
                );
            }
        }
    }

    #[tokio::test]
    async fn opaque_round_trip_resolves_user() {
        let user = ann();
        let store = store_with(&user).await;
        let (issuer, verifier) = CredentialScheme::opaque().build(&store);

        let record = issuer.issue(&user).await.unwrap();
        assert_eq!(verifier.verify(&record.token).await.unwrap(), user);
        // No expiry for opaque credentials.
        assert_eq!(
            verifier.verify_at(&record.token, Utc::now() + Duration::days(365)).await.unwrap(),
            user
        );
    }

    #[tokio::test]
    async fn opaque_record_with_vanished_user_is_unknown_user() {
        let user = ann();
        let store = store_with(&user).await;
        let (_, verifier) = CredentialScheme::opaque().build(&store);

        // Same tokens collection, but a users collection that never saw Ann.
        let record = IssuanceRecord::new("orphan".into(), user.id, Utc::now());
        store.tokens().insert(&record).await.unwrap();

        let empty_users = Store::in_memory();
        let split = Store::from_parts(empty_users.users(), store.tokens());
        let (_, split_verifier) = CredentialScheme::opaque().build(&split);

        assert_eq!(verifier.verify("orphan").await.unwrap(), user);
        assert_eq!(
            split_verifier.verify("orphan").await.unwrap_err(),
            VerifyError::UnknownUser
        );
    }
}
