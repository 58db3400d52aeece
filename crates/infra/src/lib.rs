//! Infrastructure layer: document store adapter plus the services built on it.
//!
//! - `store`: the `users` / `tokens` collections and their backends
//! - `registry`: user lookup and creation
//! - `credentials`: issuing and verifying credentials

pub mod credentials;
pub mod registry;
pub mod store;

pub use credentials::{
    CredentialIssuer, CredentialScheme, CredentialVerifier, IssueError, VerifyError,
};
pub use registry::{RegistryError, UserRegistry};
pub use store::{
    InMemoryStore, IssuanceRecord, PostgresStore, Store, StoreError, TokenStore, UserStore,
};
