//! User registry: lookup by email/id and creation with email uniqueness.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use idgate_auth::User;
use idgate_core::{DomainError, EmailAddress, UserId, UserName};

use crate::store::{Store, StoreError, UserStore};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] DomainError),

    #[error("email already registered: {0}")]
    DuplicateEmail(String),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for RegistryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail(email) => Self::DuplicateEmail(email),
            other => Self::Store(other),
        }
    }
}

#[derive(Clone)]
pub struct UserRegistry {
    users: Arc<dyn UserStore>,
}

impl UserRegistry {
    pub fn new(store: &Store) -> Self {
        Self { users: store.users() }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, RegistryError> {
        let email = EmailAddress::parse(email)?;
        Ok(self.users.find_by_email(email.as_str()).await?)
    }

    pub async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RegistryError> {
        Ok(self.users.find_by_id(id).await?)
    }

    /// Register a new user. A second registration of the same email fails
    /// with `DuplicateEmail`, including when both race.
    pub async fn create(&self, name: &str, email: &str) -> Result<User, RegistryError> {
        let user = User::new(UserName::parse(name)?, EmailAddress::parse(email)?);
        self.users.insert(&user).await?;
        info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Return the user owning `email`, creating it with `name` if absent.
    ///
    /// The existing record wins: `name` is ignored for known emails.
    /// Concurrent calls for an unseen email converge on a single user.
    pub async fn find_or_create(&self, name: &str, email: &str) -> Result<User, RegistryError> {
        let name = UserName::parse(name)?;
        let email = EmailAddress::parse(email)?;

        if let Some(existing) = self.users.find_by_email(email.as_str()).await? {
            return Ok(existing);
        }

        let candidate = User::new(name, email);
        let user = self.users.insert_or_get_by_email(&candidate).await?;
        if user.id == candidate.id {
            info!(user_id = %user.id, "user created on first credential request");
        }
        Ok(user)
    }
}

impl core::fmt::Debug for UserRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("UserRegistry").finish_non_exhaustive()
    }
}
