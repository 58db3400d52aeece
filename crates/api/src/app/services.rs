//! Service wiring: everything a request handler needs, built from one `Store`.

use idgate_infra::{CredentialIssuer, CredentialScheme, CredentialVerifier, Store, UserRegistry};

#[derive(Debug, Clone)]
pub struct AppServices {
    pub registry: UserRegistry,
    pub issuer: CredentialIssuer,
    pub verifier: CredentialVerifier,
}

impl AppServices {
    pub fn new(store: &Store, scheme: CredentialScheme) -> Self {
        let (issuer, verifier) = scheme.build(store);
        Self {
            registry: UserRegistry::new(store),
            issuer,
            verifier,
        }
    }

    /// In-memory store; for tests and local experiments.
    pub fn in_memory(scheme: CredentialScheme) -> Self {
        Self::new(&Store::in_memory(), scheme)
    }
}
