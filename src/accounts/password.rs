use tracing::error;

use crate::accounts::error::AccountResult;

pub fn hash_password(plain: &str, cost: u32) -> AccountResult<String> {
    let hash = bcrypt::hash(plain, cost).map_err(|e| {
        error!(error = %e, "bcrypt hash error");
        e
    })?;
    Ok(hash)
}

/// Compares a candidate against a stored bcrypt hash.
/// A mismatch is `Ok(false)`; only a hash that does not parse is an error.
pub fn verify_password(plain: &str, hash: &str) -> AccountResult<bool> {
    let matches = bcrypt::verify(plain, hash).map_err(|e| {
        error!(error = %e, "bcrypt parse hash error");
        e
    })?;
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_COST: u32 = 4;

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let hash = hash_password(password, TEST_COST).expect("hashing should succeed");
        assert_ne!(hash, password);
        assert!(verify_password(password, &hash).expect("verify should succeed"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let password = "correct-horse-battery-staple";
        let hash = hash_password(password, TEST_COST).expect("hashing should succeed");
        assert!(!verify_password("wrong-password", &hash).expect("verify should not error"));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let a = hash_password("secret123", TEST_COST).unwrap();
        let b = hash_password("secret123", TEST_COST).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn hash_encodes_cost() {
        let hash = hash_password("secret123", 12).unwrap();
        assert!(hash.starts_with("$2b$12$"));
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        let err = verify_password("anything", "not-a-valid-hash").unwrap_err();
        assert!(!err.to_string().is_empty());
    }
}
