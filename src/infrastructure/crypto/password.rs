//! Password hashing

use bcrypt::DEFAULT_COST;

use crate::domain::{DomainError, DomainResult};

pub fn hash_password(password: &str) -> DomainResult<String> {
    bcrypt::hash(password, DEFAULT_COST)
        .map_err(|e| DomainError::validation(format!("Failed to hash password: {e}")))
}

/// A broken or foreign stored hash must read as a failed credential
/// check, not an internal error.
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify() {
        let hashed = hash_password("secure_password_123").unwrap();

        assert!(verify_password("secure_password_123", &hashed));
        assert!(!verify_password("wrong_password", &hashed));
    }

    #[test]
    fn invalid_stored_hash_reads_as_mismatch() {
        assert!(!verify_password("anything", "not-a-bcrypt-hash"));
    }
}
