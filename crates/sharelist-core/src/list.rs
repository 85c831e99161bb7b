//! Shopping lists and their membership.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  id::{ListId, UserId},
  share_code::ShareCode,
};

/// A shared list. The owner is always one of its members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingList {
  pub id:         ListId,
  pub name:       String,
  pub owner_id:   UserId,
  pub share_code: ShareCode,
  pub created_at: DateTime<Utc>,
}

/// A list annotated with its owner's username, as shown in list pickers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSummary {
  pub id:         ListId,
  pub name:       String,
  pub owner_id:   UserId,
  pub owner_name: String,
  pub share_code: ShareCode,
  pub created_at: DateTime<Utc>,
}

/// One row of the membership relation, resolved to a username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
  pub user_id:   UserId,
  pub username:  String,
  pub joined_at: DateTime<Utc>,
}

/// Input to [`crate::store::ListStore::create_list`]. The owner becomes the
/// sole initial member.
#[derive(Debug, Clone)]
pub struct NewList {
  pub name:       String,
  pub owner_id:   UserId,
  pub share_code: ShareCode,
}
