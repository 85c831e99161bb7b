//! Error types for `sharelist-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid share code: {0:?}")]
  InvalidShareCode(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
