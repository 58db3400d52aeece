use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use idgate_auth::User;
use idgate_core::UserId;

/// Persisted link between an issued credential and its user.
///
/// Immutable once written. Field names match the stored document layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuanceRecord {
    pub token: String,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

impl IssuanceRecord {
    pub fn new(token: String, user_id: UserId, created_at: DateTime<Utc>) -> Self {
        Self {
            token,
            user_id,
            created_at,
        }
    }
}

/// Store operation error.
///
/// `DuplicateEmail` is the only failure callers are expected to branch on.
/// `DuplicateToken` means a credential collided with an earlier one and is
/// treated like any other backend problem.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("email already registered: {0}")]
    DuplicateEmail(String),

    #[error("credential already recorded")]
    DuplicateToken,

    #[error("unsupported store url: {0}")]
    Unsupported(String),

    #[error("store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}

/// The `users` collection.
///
/// Implementations must enforce uniqueness of `email`.
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user; fails with `DuplicateEmail` if the email is taken.
    async fn insert(&self, user: &User) -> Result<(), StoreError>;

    /// Atomically insert `user`, or return the already-stored user with the
    /// same email. The returned record is whichever one won.
    async fn insert_or_get_by_email(&self, user: &User) -> Result<User, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError>;
}

/// The `tokens` collection (issuance records).
///
/// Token values are unique across all records; `insert` fails with
/// `DuplicateToken` rather than storing a second record for the same value.
#[async_trait::async_trait]
pub trait TokenStore: Send + Sync {
    async fn insert(&self, record: &IssuanceRecord) -> Result<(), StoreError>;

    /// Exact-match lookup.
    async fn find_by_token(&self, token: &str) -> Result<Option<IssuanceRecord>, StoreError>;

    /// All records issued to `user_id`, oldest first.
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<IssuanceRecord>, StoreError>;
}

#[async_trait::async_trait]
impl<S> UserStore for Arc<S>
where
    S: UserStore + ?Sized,
{
    async fn insert(&self, user: &User) -> Result<(), StoreError> {
        (**self).insert(user).await
    }

    async fn insert_or_get_by_email(&self, user: &User) -> Result<User, StoreError> {
        (**self).insert_or_get_by_email(user).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        (**self).find_by_email(email).await
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        (**self).find_by_id(id).await
    }
}

#[async_trait::async_trait]
impl<S> TokenStore for Arc<S>
where
    S: TokenStore + ?Sized,
{
    async fn insert(&self, record: &IssuanceRecord) -> Result<(), StoreError> {
        (**self).insert(record).await
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<IssuanceRecord>, StoreError> {
        (**self).find_by_token(token).await
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<IssuanceRecord>, StoreError> {
        (**self).list_for_user(user_id).await
    }
}
