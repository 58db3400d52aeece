use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{Level, debug};

use idgate_auth::{CredentialClaims, JwtError, User, generate_opaque_token};

use crate::store::{IssuanceRecord, Store, StoreError, TokenStore};

use super::CredentialScheme;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IssueError {
    #[error(transparent)]
    Sign(#[from] JwtError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Mints credentials and records every issuance in the `tokens` collection.
#[derive(Clone)]
pub struct CredentialIssuer {
    scheme: CredentialScheme,
    tokens: Arc<dyn TokenStore>,
}

impl CredentialIssuer {
    pub(crate) fn new(scheme: CredentialScheme, store: &Store) -> Self {
        Self {
            scheme,
            tokens: store.tokens(),
        }
    }

    pub async fn issue(&self, user: &User) -> Result<IssuanceRecord, IssueError> {
        self.issue_at(user, Utc::now()).await
    }

    /// Issue a credential as of `now`. Signed credentials expire 15 minutes later.
    pub async fn issue_at(
        &self,
        user: &User,
        now: DateTime<Utc>,
    ) -> Result<IssuanceRecord, IssueError> {
        let token = match &self.scheme {
            CredentialScheme::Signed(codec) => {
                codec.encode(&CredentialClaims::for_user(user, now))?
            }
            CredentialScheme::Opaque => generate_opaque_token(),
        };

        let record = IssuanceRecord::new(token, user.id, now);
        self.tokens.insert(&record).await?;

        if tracing::enabled!(Level::DEBUG) {
            match self.tokens.list_for_user(&user.id).await {
                Ok(held) => debug!(
                    user_id = %user.id,
                    mode = %self.scheme.mode(),
                    credentials_held = held.len(),
                    "credential issued"
                ),
                Err(e) => debug!(
                    user_id = %user.id,
                    error = %e,
                    "could not count issued credentials"
                ),
            }
        }

        Ok(record)
    }
}

impl core::fmt::Debug for CredentialIssuer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CredentialIssuer")
            .field("mode", &self.scheme.mode())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use idgate_core::{EmailAddress, UserName};

    use super::*;
    use crate::store::UserStore;

    const SECRET: &[u8] = b"issuer-test-secret-issuer-test-xx";

    async fn seeded_store() -> (Store, User) {
        let store = Store::in_memory();
        let user = User::new(
            UserName::parse("Ann").unwrap(),
            EmailAddress::parse("ann@x.com").unwrap(),
        );
        store.users().insert(&user).await.unwrap();
        (store, user)
    }

    #[tokio::test]
    async fn signed_issue_persists_record() {
        let (store, user) = seeded_store().await;
        let (issuer, _) = CredentialScheme::signed(SECRET).build(&store);

        let now = Utc::now();
        let record = issuer.issue_at(&user, now).await.unwrap();
        assert_eq!(record.user_id, user.id);
        assert_eq!(record.created_at, now);
        assert_eq!(record.token.split('.').count(), 3);

        let stored = store.tokens().find_by_token(&record.token).await.unwrap();
        assert_eq!(stored, Some(record));
    }

    #[tokio::test]
    async fn signed_claims_carry_user_and_window() {
        let (store, user) = seeded_store().await;
        let (issuer, _) = CredentialScheme::signed(SECRET).build(&store);

        let now = Utc::now();
        let record = issuer.issue_at(&user, now).await.unwrap();
        let claims = idgate_auth::JwtCodec::new(SECRET)
            .decode(&record.token, now + Duration::minutes(1))
            .unwrap();
        assert_eq!(claims.user_id, user.id);
        assert_eq!(claims.email, "ann@x.com");
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[tokio::test]
    async fn signed_tokens_in_the_same_second_differ() {
        let (store, user) = seeded_store().await;
        let (issuer, verifier) = CredentialScheme::signed(SECRET).build(&store);

        let now = Utc::now();
        let first = issuer.issue_at(&user, now).await.unwrap();
        let second = issuer.issue_at(&user, now).await.unwrap();

        assert_ne!(first.token, second.token);
        assert_eq!(store.tokens().list_for_user(&user.id).await.unwrap().len(), 2);
        assert_eq!(verifier.verify_at(&first.token, now).await.unwrap(), user);
        assert_eq!(verifier.verify_at(&second.token, now).await.unwrap(), user);
    }

    #[tokio::test]
    async fn opaque_tokens_never_repeat() {
        let (store, user) = seeded_store().await;
        let (issuer, _) = CredentialScheme::opaque().build(&store);

        let mut seen = std::collections::HashSet::new();
        for _ in 0..2_000 {
            let record = issuer.issue(&user).await.unwrap();
            assert!(seen.insert(record.token));
        }
        assert_eq!(store.tokens().list_for_user(&user.id).await.unwrap().len(), 2_000);
    }

    #[tokio::test]
    async fn issuing_for_unstored_user_fails() {
        let store = Store::in_memory();
        let (issuer, _) = CredentialScheme::opaque().build(&store);
        let ghost = User::new(
            UserName::parse("Ghost").unwrap(),
            EmailAddress::parse("ghost@x.com").unwrap(),
        );
        assert!(matches!(issuer.issue(&ghost).await, Err(IssueError::Store(_))));
    }
}
