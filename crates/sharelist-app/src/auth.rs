//! Password hashing and verification.
//!
//! Passwords are stored as argon2id PHC strings with a per-user random salt.
//! Verification reads the parameters back out of the stored string, so
//! changing the configured cost only affects newly registered users.

use argon2::{
  Algorithm, Argon2, Params, PasswordHash, PasswordHasher as _, PasswordVerifier as _,
  Version, password_hash::SaltString,
};
use rand_core::OsRng;

use crate::{
  config::HashingConfig,
  error::{AppError, Result},
};

#[derive(Clone)]
pub struct Hasher {
  argon2: Argon2<'static>,
}

impl Hasher {
  pub fn new(config: &HashingConfig) -> Result<Self> {
    let params = Params::new(
      config.memory_kib,
      config.iterations,
      config.parallelism,
      None,
    )
    .map_err(|e| AppError::Hashing(e.to_string()))?;

    Ok(Self { argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params) })
  }

  /// Produce a PHC string for `password`.
  pub fn hash(&self, password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = self
      .argon2
      .hash_password(password.as_bytes(), &salt)
      .map_err(|e| AppError::Hashing(e.to_string()))?;
    Ok(hash.to_string())
  }

  /// `true` if `password` matches `phc`. A malformed `phc` never matches.
  pub fn verify(&self, password: &str, phc: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(phc) else { return false };
    self.argon2.verify_password(password.as_bytes(), &parsed).is_ok()
  }
}

impl Default for Hasher {
  fn default() -> Self { Self { argon2: Argon2::default() } }
}
