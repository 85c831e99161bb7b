//! Share codes, the short public token used to join a list.
//!
//! A code is eight uppercase ASCII alphanumerics. Lookups are
//! case-insensitive, so every code is normalised to uppercase on the way in.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Number of characters in every share code.
pub const SHARE_CODE_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShareCode(String);

impl ShareCode {
  /// Draw a fresh code from a random v4 UUID.
  ///
  /// Collisions are possible; the store's `UNIQUE` constraint rejects them.
  pub fn generate() -> Self {
    let mut code = Uuid::new_v4().simple().to_string();
    code.truncate(SHARE_CODE_LEN);
    code.make_ascii_uppercase();
    Self(code)
  }

  /// Normalise user input: surrounding whitespace is dropped and letters
  /// are uppercased.
  pub fn parse(input: &str) -> Result<Self> {
    let code = input.trim().to_ascii_uppercase();
    let valid = code.len() == SHARE_CODE_LEN
      && code.bytes().all(|b| b.is_ascii_alphanumeric());
    if !valid {
      return Err(Error::InvalidShareCode(input.to_owned()));
    }
    Ok(Self(code))
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for ShareCode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl FromStr for ShareCode {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> { Self::parse(s) }
}

impl TryFrom<String> for ShareCode {
  type Error = Error;

  fn try_from(value: String) -> Result<Self> { Self::parse(&value) }
}

impl From<ShareCode> for String {
  fn from(code: ShareCode) -> Self { code.0 }
}
