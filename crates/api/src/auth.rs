//! Keyed password hashing.
//!
//! Passwords are stored as hex-encoded HMAC-SHA256 digests keyed with a
//! secret injected from configuration; there is no ambient hashing secret
//! anywhere else in the process. The hash never leaves the storage boundary
//! unmasked (see `UserProfile`).

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Hashes and verifies passwords with an injected keyed secret.
pub struct PasswordHasher {
    secret: SecretString,
}

impl PasswordHasher {
    /// Create a hasher keyed with `secret`.
    #[must_use]
    pub const fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    /// Hash a password to a lowercase hex digest.
    #[must_use]
    pub fn hash(&self, password: &str) -> String {
        let mut mac = self.mac();
        mac.update(password.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Verify a password against a stored hex digest in constant time.
    ///
    /// An undecodable digest verifies as false rather than erroring; a
    /// mangled stored hash must never let a login through.
    #[must_use]
    pub fn verify(&self, password: &str, expected_hex: &str) -> bool {
        let Ok(expected) = hex::decode(expected_hex) else {
            return false;
        };
        let mut mac = self.mac();
        mac.update(password.as_bytes());
        mac.verify_slice(&expected).is_ok()
    }

    fn mac(&self) -> HmacSha256 {
        // HMAC accepts keys of any length.
        HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .expect("HMAC key of any length is valid")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(SecretString::from("k3rQ9vX2mN8pL5wZ1cT7bJ4hF6dS0aG3"))
    }

    #[test]
    fn test_hash_is_deterministic() {
        let h = hasher();
        assert_eq!(h.hash("hunter2"), h.hash("hunter2"));
    }

    #[test]
    fn test_hash_depends_on_secret() {
        let a = PasswordHasher::new(SecretString::from("secret-a-x9q2m7v4k1p8w3z6"));
        let b = PasswordHasher::new(SecretString::from("secret-b-x9q2m7v4k1p8w3z6"));
        assert_ne!(a.hash("hunter2"), b.hash("hunter2"));
    }

    #[test]
    fn test_verify_round_trip() {
        let h = hasher();
        let digest = h.hash("hunter2");
        assert!(h.verify("hunter2", &digest));
        assert!(!h.verify("hunter3", &digest));
    }

    #[test]
    fn test_verify_rejects_undecodable_digest() {
        let h = hasher();
        assert!(!h.verify("hunter2", "not-hex"));
        assert!(!h.verify("hunter2", ""));
    }
}
