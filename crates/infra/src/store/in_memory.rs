use std::collections::HashMap;
use std::sync::RwLock;

use idgate_auth::User;
use idgate_core::UserId;

use super::r#trait::{IssuanceRecord, StoreError, TokenStore, UserStore};

#[derive(Debug, Default)]
struct Collections {
    users: HashMap<UserId, User>,
    /// email -> id; the uniqueness constraint.
    emails: HashMap<String, UserId>,
    tokens: Vec<IssuanceRecord>,
    /// token -> index of its record in `tokens`; the uniqueness constraint.
    token_index: HashMap<String, usize>,
}

/// In-memory `users` + `tokens` collections.
///
/// Intended for tests/dev. Every operation takes the single lock, so the
/// email uniqueness check and the insert are atomic.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<Collections>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Collections>, StoreError> {
        self.inner.read().map_err(|_| StoreError::backend("lock poisoned"))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Collections>, StoreError> {
        self.inner.write().map_err(|_| StoreError::backend("lock poisoned"))
    }
}

impl Collections {
    fn insert_user(&mut self, user: &User) {
        self.emails.insert(user.email.as_str().to_string(), user.id);
        self.users.insert(user.id, user.clone());
    }

    fn user_by_email(&self, email: &str) -> Option<&User> {
        self.emails.get(email).and_then(|id| self.users.get(id))
    }
}

#[async_trait::async_trait]
impl UserStore for InMemoryStore {
    async fn insert(&self, user: &User) -> Result<(), StoreError> {
        let mut c = self.write()?;
        if c.emails.contains_key(user.email.as_str()) {
            return Err(StoreError::DuplicateEmail(user.email.as_str().to_string()));
        }
        c.insert_user(user);
        Ok(())
    }

    async fn insert_or_get_by_email(&self, user: &User) -> Result<User, StoreError> {
        let mut c = self.write()?;
        if let Some(existing) = c.user_by_email(user.email.as_str()) {
            return Ok(existing.clone());
        }
        c.insert_user(user);
        Ok(user.clone())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.read()?.user_by_email(email).cloned())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        Ok(self.read()?.users.get(id).cloned())
    }
}

#[async_trait::async_trait]
impl TokenStore for InMemoryStore {
    async fn insert(&self, record: &IssuanceRecord) -> Result<(), StoreError> {
        let mut c = self.write()?;
        if !c.users.contains_key(&record.user_id) {
            return Err(StoreError::backend(format!(
                "issuance record references unknown user {}",
                record.user_id
            )));
        }
        if c.token_index.contains_key(&record.token) {
            return Err(StoreError::DuplicateToken);
        }
        let idx = c.tokens.len();
        c.tokens.push(record.clone());
        c.token_index.insert(record.token.clone(), idx);
        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<IssuanceRecord>, StoreError> {
        let c = self.read()?;
        Ok(c.token_index.get(token).and_then(|&i| c.tokens.get(i)).cloned())
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<IssuanceRecord>, StoreError> {
        let c = self.read()?;
        Ok(c
            .tokens
            .iter()
            .filter(|r| &r.user_id == user_id)
            .cloned()
            .collect())
    }
}
