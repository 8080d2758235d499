//! Credentials and session tokens

use anyhow::{anyhow, Result};
use rand::Rng;
use rand_distr::Alphanumeric;
use serde::{Deserialize, Serialize};

pub const AUTH_TOKEN_LENGTH: usize = 64;

#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Debug)]
pub struct AuthTokenValue(pub String);

impl AuthTokenValue {
    pub fn generate() -> AuthTokenValue {
        let rng = rand::rng();
        let random_string: String = rng
            .sample_iter(&Alphanumeric)
            .take(AUTH_TOKEN_LENGTH)
            .map(char::from)
            .collect();
        AuthTokenValue(random_string)
    }
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct AuthToken {
    pub user_id: i64,
    pub value: AuthTokenValue,
    pub created: i64,
    pub last_used: Option<i64>,
}

mod argon2_hasher {
    use anyhow::{anyhow, Result};
    use argon2::{
        password_hash::{
            rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
        },
        Argon2,
    };

    pub fn hash(plain: &[u8]) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash_string = Argon2::default()
            .hash_password(plain, &salt)
            .map_err(|err| anyhow!("{}", err))?
            .to_string();
        Ok(hash_string)
    }

    pub fn verify(plain: &[u8], target_hash: &str) -> Result<bool> {
        let password_hash = PasswordHash::new(target_hash).map_err(|err| anyhow!("{}", err))?;
        Ok(Argon2::default()
            .verify_password(plain, &password_hash)
            .is_ok())
    }
}

/// Hashes a plain password into a self-describing PHC string (algorithm,
/// parameters and salt included).
pub fn hash_password(plain: &str) -> Result<String> {
    if plain.is_empty() {
        return Err(anyhow!("Password cannot be empty"));
    }
    argon2_hasher::hash(plain.as_bytes())
}

/// `Ok(false)` for a wrong password, `Err` only when the stored hash can't be
/// parsed.
pub fn verify_password(plain: &str, stored_hash: &str) -> Result<bool> {
    argon2_hasher::verify(plain.as_bytes(), stored_hash)
}
