//! `idgate-auth` — credential minting and checking, decoupled from HTTP and storage.
//!
//! Everything here is deterministic given its inputs (`now` is always passed
//! in), which keeps expiry behaviour testable without sleeping.

pub mod claims;
pub mod jwt;
pub mod mode;
pub mod opaque;
pub mod user;

pub use claims::{
    CredentialClaims, SIGNED_CREDENTIAL_TTL_SECS, TokenValidationError, validate_claims,
};
pub use jwt::{JwtCodec, JwtError};
pub use mode::{CredentialMode, ParseCredentialModeError};
pub use opaque::{OPAQUE_TOKEN_BYTES, generate_opaque_token};
pub use user::{User, UserProfile};
