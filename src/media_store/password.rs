use anyhow::{anyhow, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Hashes a plain password into a PHC string with a fresh random salt.
pub fn hash_password(plain: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|err| anyhow!("{}", err))?;
    Ok(hash.to_string())
}

pub fn verify_password(plain: &str, target_hash: &str) -> Result<bool> {
    let password_hash = PasswordHash::new(target_hash).map_err(|err| anyhow!("{}", err))?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &password_hash)
        .is_ok())
}
