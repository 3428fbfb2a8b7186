//! Password hashing

use anyhow::Result;

mod catalog_argon2 {
    use anyhow::{anyhow, Result};
    use argon2::{
        password_hash::{
            rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
        },
        Argon2,
    };

    /// Returns a PHC string, the salt is embedded in it.
    pub fn hash(plain: &[u8]) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        Ok(Argon2::default()
            .hash_password(plain, &salt)
            .map_err(|err| anyhow!("{}", err))?
            .to_string())
    }

    pub fn verify(plain: &[u8], phc_hash: &str) -> Result<bool> {
        let password_hash = PasswordHash::new(phc_hash).map_err(|err| anyhow!("{}", err))?;
        Ok(Argon2::default()
            .verify_password(plain, &password_hash)
            .is_ok())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CatalogHasher {
    #[default]
    Argon2,
}

impl CatalogHasher {
    pub fn hash<T: AsRef<str>>(&self, plain: T) -> Result<String> {
        match self {
            CatalogHasher::Argon2 => catalog_argon2::hash(plain.as_ref().as_bytes()),
        }
    }

    /// `Ok(false)` for a wrong password, `Err` only for a malformed stored hash.
    pub fn verify<T: AsRef<str>>(&self, plain: T, stored_hash: &str) -> Result<bool> {
        match self {
            CatalogHasher::Argon2 => catalog_argon2::verify(plain.as_ref().as_bytes(), stored_hash),
        }
    }
}
