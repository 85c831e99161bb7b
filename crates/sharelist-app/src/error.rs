//! The error taxonomy reported to callers of [`crate::App`].
//!
//! Every variant is an ordinary value; presenting it to a person is the
//! caller's job.

use sharelist_core::id::{ItemId, ListId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("not logged in")]
  NotAuthenticated,

  #[error("no list selected")]
  NoListSelected,

  /// Unknown username and wrong password are deliberately the same error.
  #[error("invalid username or password")]
  InvalidCredentials,

  #[error("username {0:?} is already taken")]
  DuplicateUsername(String),

  #[error("list not found")]
  ListNotFound,

  #[error("already a member of list {0}")]
  AlreadyMember(ListId),

  #[error("only the owner of a list can do that")]
  NotOwner,

  #[error("item {0} not found")]
  ItemNotFound(ItemId),

  #[error("no unused share code found after {0} attempts")]
  ShareCodeCollision(u32),

  #[error("invalid input: {0}")]
  InvalidInput(String),

  #[error("password hashing failed: {0}")]
  Hashing(String),

  /// The store failed; nothing from the operation was committed.
  #[error("storage unavailable: {0}")]
  StorageUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl AppError {
  pub(crate) fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::StorageUnavailable(Box::new(err))
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
