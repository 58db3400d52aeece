//! Postgres-backed `users` / `tokens` collections.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError | Scenario |
//! |------------|----------------------|------------|----------|
//! | Database (unique violation) on `users` | `23505` | `DuplicateEmail` | Email already registered |
//! | Database (unique violation) on `tokens` | `23505` | `DuplicateToken` | Credential value reused |
//! | Database (other) | Any other | `Backend` | FK violation, bad data, etc. |
//! | PoolClosed / Io / Tls / other | N/A | `Backend` | Connection failures |
//!
//! ## Thread Safety
//!
//! `PostgresStore` is `Send + Sync`; the SQLx pool handles connection sharing,
//! so no additional locking is done here.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::instrument;

use idgate_auth::User;
use idgate_core::{EmailAddress, UserId, UserName};

use super::r#trait::{IssuanceRecord, StoreError, TokenStore, UserStore};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id    TEXT PRIMARY KEY,
        name  TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS tokens (
        token      TEXT PRIMARY KEY,
        user_id    TEXT NOT NULL REFERENCES users (id),
        created_at TIMESTAMPTZ NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS tokens_user_id_idx ON tokens (user_id)",
];

/// Postgres-backed document store.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: Arc<PgPool>,
}

impl PostgresStore {
    /// Open a pool against `database_url` and make sure both tables exist.
    #[instrument(skip(database_url), err)]
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        let store = Self::new(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl UserStore for PostgresStore {
    #[instrument(skip(self, user), fields(user_id = %user.id), err)]
    async fn insert(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO users (id, name, email) VALUES ($1, $2, $3)")
            .bind(user.id.to_string())
            .bind(user.name.as_str())
            .bind(user.email.as_str())
            .execute(&*self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::DuplicateEmail(user.email.as_str().to_string())
                } else {
                    map_sqlx_error("insert_user", e)
                }
            })?;
        Ok(())
    }

    #[instrument(skip(self, user), fields(user_id = %user.id), err)]
    async fn insert_or_get_by_email(&self, user: &User) -> Result<User, StoreError> {
        let row = sqlx::query(
            r#"
            WITH inserted AS (
                INSERT INTO users (id, name, email)
                VALUES ($1, $2, $3)
                ON CONFLICT (email) DO NOTHING
                RETURNING id, name, email
            )
            SELECT id, name, email FROM inserted
            UNION ALL
            SELECT id, name, email FROM users WHERE email = $3
            LIMIT 1
            "#,
        )
        .bind(user.id.to_string())
        .bind(user.name.as_str())
        .bind(user.email.as_str())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_or_get_user", e))?;

        if let Some(row) = row {
            return user_from_row(&row);
        }

        // The conflicting row was committed after this statement's snapshot
        // was taken; a fresh statement sees it.
        self.find_by_email(user.email.as_str())
            .await?
            .ok_or_else(|| StoreError::backend("conflicting user vanished during upsert"))
    }

    #[instrument(skip(self), err)]
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query("SELECT id, name, email FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user_by_email", e))?;
        row.as_ref().map(user_from_row).transpose()
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query("SELECT id, name, email FROM users WHERE id = $1")
            .bind(id.to_string())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user_by_id", e))?;
        row.as_ref().map(user_from_row).transpose()
    }
}

#[async_trait::async_trait]
impl TokenStore for PostgresStore {
    #[instrument(skip(self, record), fields(user_id = %record.user_id), err)]
    async fn insert(&self, record: &IssuanceRecord) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO tokens (token, user_id, created_at) VALUES ($1, $2, $3)")
            .bind(&record.token)
            .bind(record.user_id.to_string())
            .bind(record.created_at)
            .execute(&*self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::DuplicateToken
                } else {
                    map_sqlx_error("insert_token", e)
                }
            })?;
        Ok(())
    }

    #[instrument(skip(self, token), err)]
    async fn find_by_token(&self, token: &str) -> Result<Option<IssuanceRecord>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT token, user_id, created_at
            FROM tokens
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_token", e))?;
        row.as_ref().map(record_from_row).transpose()
    }

    #[instrument(skip(self), fields(user_id = %user_id), err)]
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<IssuanceRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT token, user_id, created_at
            FROM tokens
            WHERE user_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id.to_string())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_tokens", e))?;
        rows.iter().map(record_from_row).collect()
    }
}

fn user_from_row(row: &sqlx::postgres::PgRow) -> Result<User, StoreError> {
    let id: String = row.try_get("id").map_err(|e| map_sqlx_error("read_user", e))?;
    let name: String = row.try_get("name").map_err(|e| map_sqlx_error("read_user", e))?;
    let email: String = row.try_get("email").map_err(|e| map_sqlx_error("read_user", e))?;

    let corrupt =
        |e: &dyn core::fmt::Display| StoreError::backend(format!("corrupt user row: {e}"));
    Ok(User {
        id: id.parse().map_err(|e| corrupt(&e))?,
        name: UserName::parse(&name).map_err(|e| corrupt(&e))?,
        email: EmailAddress::parse(&email).map_err(|e| corrupt(&e))?,
    })
}

fn record_from_row(row: &sqlx::postgres::PgRow) -> Result<IssuanceRecord, StoreError> {
    let token: String = row
        .try_get("token")
        .map_err(|e| map_sqlx_error("read_token", e))?;
    let user_id: String = row
        .try_get("user_id")
        .map_err(|e| map_sqlx_error("read_token", e))?;
    let created_at: DateTime<Utc> = row
        .try_get("created_at")
        .map_err(|e| map_sqlx_error("read_token", e))?;

    Ok(IssuanceRecord {
        token,
        user_id: user_id
            .parse()
            .map_err(|e| StoreError::backend(format!("corrupt token row: {e}")))?,
        created_at,
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => StoreError::Backend(format!(
            "database error in {}: {}",
            operation,
            db_err.message()
        )),
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {}", operation))
        }
        _ => StoreError::Backend(format!("sqlx error in {}: {}", operation, err)),
    }
}
