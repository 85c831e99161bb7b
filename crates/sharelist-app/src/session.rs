//! The caller-owned session context.
//!
//! A [`Session`] is a plain value: whoever drives the façade keeps one per
//! signed-in person and passes it into every call. Nothing is global, so
//! any number of sessions can coexist in one process.

use serde::Serialize;
use sharelist_core::id::{ListId, UserId};

use crate::error::{AppError, Result};

/// Name shown for a session with nobody logged in.
pub const ANONYMOUS_NAME: &str = "Guest";

/// The signed-in user of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionUser {
  pub id:       UserId,
  pub username: String,
}

/// Answer to "who is using this session?".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CurrentUser {
  Anonymous,
  User(SessionUser),
}

impl CurrentUser {
  pub fn display_name(&self) -> &str {
    match self {
      Self::Anonymous => ANONYMOUS_NAME,
      Self::User(user) => &user.username,
    }
  }

  pub fn is_anonymous(&self) -> bool { matches!(self, Self::Anonymous) }
}

#[derive(Debug, Clone, Default)]
pub struct Session {
  user:         Option<SessionUser>,
  current_list: Option<ListId>,
}

impl Session {
  pub fn new() -> Self { Self::default() }

  pub fn user(&self) -> Option<&SessionUser> { self.user.as_ref() }

  pub fn current_list(&self) -> Option<ListId> { self.current_list }

  /// The signed-in user, or [`AppError::NotAuthenticated`].
  pub fn require_user(&self) -> Result<&SessionUser> {
    self.user.as_ref().ok_or(AppError::NotAuthenticated)
  }

  /// The selected list. Authentication is checked first.
  pub fn require_list(&self) -> Result<ListId> {
    self.require_user()?;
    self.current_list.ok_or(AppError::NoListSelected)
  }

  /// Replace whatever session was active. The list selection belonged to the
  /// previous user, so it goes too.
  pub(crate) fn sign_in(&mut self, user: SessionUser) {
    self.user = Some(user);
    self.current_list = None;
  }

  pub(crate) fn sign_out(&mut self) {
    self.user = None;
    self.current_list = None;
  }

  pub(crate) fn select(&mut self, list: ListId) { self.current_list = Some(list); }

  /// Drop the selection if it points at `list`.
  pub(crate) fn forget(&mut self, list: ListId) {
    if self.current_list == Some(list) {
      self.current_list = None;
    }
  }
}
