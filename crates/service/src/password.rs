//! Password hashing and comparison.
//!
//! Hashes are argon2id PHC strings with a per-password random salt, so the
//! stored value carries its own cost parameters. Verification therefore keeps
//! working after the configured parameters change.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use configs::PasswordConfig;
use rand::rngs::OsRng;

use crate::users::errors::UserError;

/// Build an argon2id hasher from the configured cost parameters.
pub fn hasher(cfg: &PasswordConfig) -> Result<Argon2<'static>, UserError> {
    let params = Params::new(cfg.memory_kib, cfg.iterations, cfg.parallelism, None)
        .map_err(|e| UserError::HashError(e.to_string()))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

pub fn hash_password(argon: &Argon2<'_>, password: &str) -> Result<String, UserError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| UserError::HashError(e.to_string()))?
        .to_string();
    Ok(hash)
}

/// `true` iff `password` matches `hash`. A malformed hash never matches.
pub fn verify_password(argon: &Argon2<'_>, password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => argon.verify_password(password.as_bytes(), &parsed).is_ok(),
        Err(_) => false,
    }
}
