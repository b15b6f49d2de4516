use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use tracing::error;

// Argon2id v1.3 with the crate's recommended cost; stored hashes carry their
// own parameters, so raising these later still verifies old rows.
fn hasher() -> Argon2<'static> {
    Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::default())
}

fn argon2_failure(op: &'static str, e: password_hash::Error) -> anyhow::Error {
    error!(error = %e, op, "argon2 failure");
    anyhow::anyhow!("argon2 {op}: {e}")
}

/// PHC string for `plain` with a fresh random salt.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    hasher()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| argon2_failure("hash", e))
}

/// `Ok(false)` on a mismatch. A stored hash that cannot be parsed or
/// checked is an internal error, not a failed login.
pub fn verify_password(plain: &str, stored: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(stored).map_err(|e| argon2_failure("parse", e))?;
    match hasher().verify_password(plain.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(argon2_failure("verify", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_password_round_trips() {
        let stored = hash_password("1234").unwrap();
        assert!(stored.starts_with("$argon2id$v=19$"));
        assert!(verify_password("1234", &stored).unwrap());
        assert!(!verify_password("4321", &stored).unwrap());
    }

    #[test]
    fn salts_differ_per_hash() {
        assert_ne!(hash_password("1234").unwrap(), hash_password("1234").unwrap());
    }

    #[test]
    fn hash_from_other_params_still_verifies() {
        let salt = SaltString::generate(&mut OsRng);
        let weak = Argon2::new(
            Algorithm::Argon2id,
            Version::V0x13,
            Params::new(8 * 1024, 1, 1, None).unwrap(),
        );
        let stored = weak.hash_password(b"1234", &salt).unwrap().to_string();
        assert!(verify_password("1234", &stored).unwrap());
    }

    #[test]
    fn garbage_hash_is_an_error() {
        assert!(verify_password("1234", "not-a-phc-string").is_err());
    }
}
