//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STORE_URL` - `postgres://...` connection string, or `memory://`
//! - `JWT_SECRET` - HS256 signing secret (min 32 bytes); only when
//!   `CREDENTIAL_MODE=signed`
//!
//! ## Optional
//! - `CREDENTIAL_MODE` - `signed` (default) or `opaque`
//! - `HOST` - Bind address (default: 0.0.0.0)
//! - `PORT` - Listen port (default: 3000)
//!
//! There are no fallback values for the store or the secret: a missing value
//! fails startup.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use idgate_auth::CredentialMode;
use idgate_infra::CredentialScheme;

pub const DEFAULT_PORT: u16 = 3000;
const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Well-known placeholder values (case-insensitive substrings).
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "defaultsecret",
    "dev-secret",
    "changeme",
    "placeholder",
    "your-",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// How credentials are minted, with the secret when one is needed.
#[derive(Clone)]
pub enum CredentialConfig {
    Signed { secret: SecretString },
    Opaque,
}

impl CredentialConfig {
    pub fn mode(&self) -> CredentialMode {
        match self {
            CredentialConfig::Signed { .. } => CredentialMode::Signed,
            CredentialConfig::Opaque => CredentialMode::Opaque,
        }
    }

    pub fn scheme(&self) -> CredentialScheme {
        match self {
            CredentialConfig::Signed { secret } => {
                CredentialScheme::signed(secret.expose_secret().as_bytes())
            }
            CredentialConfig::Opaque => CredentialScheme::opaque(),
        }
    }
}

impl std::fmt::Debug for CredentialConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialConfig::Signed { .. } => f
                .debug_struct("Signed")
                .field("secret", &"[REDACTED]")
                .finish(),
            CredentialConfig::Opaque => f.write_str("Opaque"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Store connection URL (may contain a password)
    pub store_url: SecretString,
    pub credentials: CredentialConfig,
    pub host: IpAddr,
    pub port: u16,
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| get(key).filter(|v| !v.trim().is_empty());

        let store_url = non_empty("STORE_URL")
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("STORE_URL".to_string()))?;

        let mode = match non_empty("CREDENTIAL_MODE") {
            Some(raw) => raw.parse::<CredentialMode>().map_err(|e| {
                ConfigError::InvalidEnvVar("CREDENTIAL_MODE".to_string(), e.to_string())
            })?,
            None => CredentialMode::default(),
        };

        let credentials = match mode {
            CredentialMode::Signed => {
                let secret = non_empty("JWT_SECRET")
                    .ok_or_else(|| ConfigError::MissingEnvVar("JWT_SECRET".to_string()))?;
                validate_secret("JWT_SECRET", &secret)?;
                CredentialConfig::Signed {
                    secret: SecretString::from(secret),
                }
            }
            CredentialMode::Opaque => CredentialConfig::Opaque,
        };

        let host = match non_empty("HOST") {
            Some(raw) => raw
                .parse()
                .map_err(|e| ConfigError::InvalidEnvVar("HOST".to_string(), format!("{e}")))?,
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };

        let port = match non_empty("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|e| ConfigError::InvalidEnvVar("PORT".to_string(), format!("{e}")))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            store_url,
            credentials,
            host,
            port,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn validate_secret(var: &str, secret: &str) -> Result<(), ConfigError> {
    if secret.len() < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var.to_string(),
            format!("must be at least {MIN_JWT_SECRET_LENGTH} bytes"),
        ));
    }

    let lower = secret.to_ascii_lowercase();
    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var.to_string(),
            format!("looks like a placeholder (contains '{pattern}')"),
        ));
    }

    Ok(())
}
