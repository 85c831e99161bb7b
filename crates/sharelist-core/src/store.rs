//! The `ListStore` trait and the outcome types it reports.
//!
//! The trait is implemented by storage backends (e.g.
//! `sharelist-store-sqlite`). The application layer depends on this
//! abstraction, not on any concrete backend.
//!
//! Outcomes decided by storage constraints (a taken username, an existing
//! membership, a missing row) are returned as values. `Self::Error` is
//! reserved for the store itself failing.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::{
  id::{ItemId, ListId, UserId},
  item::{Item, NewItem, PurchaseRecord, Suggestion},
  list::{ListSummary, Member, NewList, ShoppingList},
  share_code::ShareCode,
  user::{Credentials, NewUser, User},
};

// ─── Outcomes ────────────────────────────────────────────────────────────────

/// Result of [`ListStore::join_list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
  Joined(ShoppingList),
  /// No list carries the code.
  NotFound,
  /// The user was already a member of this list.
  AlreadyMember(ListId),
}

/// Result of [`ListStore::delete_list`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
  Deleted,
  NotFound,
  NotOwner,
}

/// What happened when a user left a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Departure {
  /// A non-owner left; nothing else changed.
  Left,
  /// The owner left and ownership passed to the earliest-joined remaining
  /// member.
  OwnershipTransferred { to: UserId },
  /// The last member left, so the list and everything under it was removed.
  ListDeleted,
  /// The user was not a member; nothing changed.
  NotMember,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a shopping-list store backend.
///
/// Every method is one self-contained transaction: either all of its writes
/// are committed or none are. Nothing is held open between calls.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes.
pub trait ListStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Persist a new user. Returns `None` if the username is already taken.
  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Look up a user and their password hash by exact username.
  fn find_credentials(
    &self,
    username: String,
  ) -> impl Future<Output = Result<Option<Credentials>, Self::Error>> + Send + '_;

  // ── Lists ─────────────────────────────────────────────────────────────

  /// Insert a list and its owner's membership row together.
  ///
  /// Returns `None` if the share code collides with an existing list; the
  /// caller decides whether to retry with a fresh code.
  fn create_list(
    &self,
    input: NewList,
  ) -> impl Future<Output = Result<Option<ShoppingList>, Self::Error>> + Send + '_;

  /// Add `user` to the list carrying `code` (compared case-insensitively).
  fn join_list(
    &self,
    code: ShareCode,
    user: UserId,
  ) -> impl Future<Output = Result<JoinOutcome, Self::Error>> + Send + '_;

  /// All lists `user` belongs to, newest first.
  fn lists_for(
    &self,
    user: UserId,
  ) -> impl Future<Output = Result<Vec<ListSummary>, Self::Error>> + Send + '_;

  /// List metadata, regardless of who is asking. `None` if absent.
  fn list_info(
    &self,
    list: ListId,
  ) -> impl Future<Output = Result<Option<ListSummary>, Self::Error>> + Send + '_;

  /// Members of a list in join order.
  fn members_of(
    &self,
    list: ListId,
  ) -> impl Future<Output = Result<Vec<Member>, Self::Error>> + Send + '_;

  /// Delete a list with its items, purchase log and memberships, provided
  /// `requester` owns it.
  fn delete_list(
    &self,
    list: ListId,
    requester: UserId,
  ) -> impl Future<Output = Result<DeleteOutcome, Self::Error>> + Send + '_;

  /// Remove `user` from a list, transferring ownership or deleting the list
  /// as needed. Returns `None` if the list does not exist.
  fn leave_list(
    &self,
    list: ListId,
    user: UserId,
  ) -> impl Future<Output = Result<Option<Departure>, Self::Error>> + Send + '_;

  // ── Items ─────────────────────────────────────────────────────────────

  /// Append an item after the current last position. Returns `None` if the
  /// list does not exist.
  fn add_item(
    &self,
    input: NewItem,
  ) -> impl Future<Output = Result<Option<Item>, Self::Error>> + Send + '_;

  /// Unpurchased items in ascending sort order.
  fn active_items(
    &self,
    list: ListId,
  ) -> impl Future<Output = Result<Vec<Item>, Self::Error>> + Send + '_;

  /// Flip an item between active and purchased, logging the purchase when
  /// it becomes purchased. Returns the updated item, or `None` if absent.
  fn toggle_purchased(
    &self,
    item: ItemId,
    actor: UserId,
  ) -> impl Future<Output = Result<Option<Item>, Self::Error>> + Send + '_;

  /// Delete one item. Returns `false` if nothing had that id.
  fn delete_item(
    &self,
    item: ItemId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Delete every active item of a list; returns how many were removed.
  fn clear_active_items(
    &self,
    list: ListId,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  // ── Purchase log ──────────────────────────────────────────────────────

  /// The purchase log of a list, most recent first.
  fn history_for(
    &self,
    list: ListId,
  ) -> impl Future<Output = Result<Vec<PurchaseRecord>, Self::Error>> + Send + '_;

  /// The most frequently purchased products of a list, at most
  /// [`crate::item::SUGGESTION_LIMIT`].
  fn suggestions_for(
    &self,
    list: ListId,
  ) -> impl Future<Output = Result<Vec<Suggestion>, Self::Error>> + Send + '_;

  /// Product name of the most recent purchase, if any.
  fn last_purchased(
    &self,
    list: ListId,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + '_;
}
