//! Random, structure-free credentials.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;

/// Entropy of an opaque credential.
pub const OPAQUE_TOKEN_BYTES: usize = 32;

/// Generate an unguessable credential (base64url, no padding).
///
/// Draws from the thread-local CSPRNG, which is seeded from the OS.
pub fn generate_opaque_token() -> String {
    let mut bytes = [0u8; OPAQUE_TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn encoded_length_matches_entropy() {
        assert_eq!(generate_opaque_token().len(), 43);
    }

    #[test]
    fn url_safe_alphabet_only() {
        let token = generate_opaque_token();
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn no_collisions_over_many_issuances() {
        let n = 50_000;
        let seen: HashSet<String> = (0..n).map(|_| generate_opaque_token()).collect();
        assert_eq!(seen.len(), n);
    }
}
