use core::str::FromStr;

use thiserror::Error;

/// Which kind of credential a process issues and accepts.
///
/// Chosen once at startup. Issuer and verifier always share the same mode,
/// since signed credentials expire statelessly and opaque ones never do.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum CredentialMode {
    /// Self-contained HS256 JWT with a 15 minute lifetime.
    #[default]
    Signed,
    /// Random string resolved through the `tokens` collection.
    Opaque,
}

impl CredentialMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialMode::Signed => "signed",
            CredentialMode::Opaque => "opaque",
        }
    }
}

impl core::fmt::Display for CredentialMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown credential mode '{0}' (expected 'signed' or 'opaque')")]
pub struct ParseCredentialModeError(pub String);

impl FromStr for CredentialMode {
    type Err = ParseCredentialModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "signed" | "jwt" => Ok(CredentialMode::Signed),
            "opaque" => Ok(CredentialMode::Opaque),
            other => Err(ParseCredentialModeError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Signed".parse::<CredentialMode>(), Ok(CredentialMode::Signed));
        assert_eq!(" OPAQUE ".parse::<CredentialMode>(), Ok(CredentialMode::Opaque));
        assert_eq!("jwt".parse::<CredentialMode>(), Ok(CredentialMode::Signed));
    }

    #[test]
    fn rejects_unknown() {
        assert!("session".parse::<CredentialMode>().is_err());
    }

    #[test]
    fn defaults_to_signed() {
        assert_eq!(CredentialMode::default(), CredentialMode::Signed);
    }
}
