//! Store adapter: the `users` and `tokens` collections.
//!
//! A [`Store`] is built once at startup and cloned into every component that
//! needs it. There is no process-wide handle; a component cannot exist
//! without the store it was constructed with.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

use std::sync::Arc;

pub use in_memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use r#trait::{IssuanceRecord, StoreError, TokenStore, UserStore};

/// URL scheme selecting the in-memory backend.
pub const MEMORY_URL: &str = "memory://";

/// Shared handle to both collections.
#[derive(Clone)]
pub struct Store {
    backend: &'static str,
    users: Arc<dyn UserStore>,
    tokens: Arc<dyn TokenStore>,
}

impl Store {
    /// Connect to the backend named by `url`.
    ///
    /// `memory://` selects the in-memory store; `postgres://` and
    /// `postgresql://` open a pool and ensure the schema exists.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        if url == MEMORY_URL {
            return Ok(Self::in_memory());
        }
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            let pg = Arc::new(PostgresStore::connect(url).await?);
            return Ok(Self {
                backend: "postgres",
                users: pg.clone(),
                tokens: pg,
            });
        }
        Err(StoreError::Unsupported(redact_url(url)))
    }

    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            backend: "memory",
            users: store.clone(),
            tokens: store,
        }
    }

    /// Assemble a handle from arbitrary collection implementations.
    pub fn from_parts(users: Arc<dyn UserStore>, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            backend: "custom",
            users,
            tokens,
        }
    }

    pub fn backend(&self) -> &'static str {
        self.backend
    }

    pub fn users(&self) -> Arc<dyn UserStore> {
        self.users.clone()
    }

    pub fn tokens(&self) -> Arc<dyn TokenStore> {
        self.tokens.clone()
    }
}

impl core::fmt::Debug for Store {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Store").field("backend", &self.backend).finish()
    }
}

/// Strip credentials from a connection URL before it reaches an error/log.
fn redact_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://[REDACTED]{}", &url[..scheme_end], &url[at..])
        }
        _ => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_url_selects_in_memory_backend() {
        let store = Store::connect(MEMORY_URL).await.unwrap();
        assert_eq!(store.backend(), "memory");
    }

    #[tokio::test]
    async fn unknown_scheme_rejected() {
        let err = Store::connect("mongodb://127.0.0.1:27017/app").await.unwrap_err();
        assert_eq!(err, StoreError::Unsupported("mongodb://127.0.0.1:27017/app".to_string()));
    }

    #[test]
    fn credentials_are_redacted() {
        assert_eq!(
            redact_url("mysql://admin:hunter2@db:3306/app"),
            "mysql://[REDACTED]@db:3306/app"
        );
    }
}
