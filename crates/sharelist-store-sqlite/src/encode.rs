//! Encoding and decoding helpers between Rust domain types and the plain
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings with
//! microsecond precision, so string order matches chronological order. Ids
//! are stored as `INTEGER` rowids.

use chrono::{DateTime, SecondsFormat, SubsecRound as _, Utc};
use sharelist_core::{
  id::{HistoryId, ItemId, ListId, UserId},
  item::{Item, Purchase, PurchaseRecord, Suggestion},
  list::{ListSummary, Member, ShoppingList},
  share_code::ShareCode,
  user::{Credentials, User},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

/// The current instant, truncated to the precision the store keeps.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw columns of a `users` row plus its password hash.
pub struct RawCredentials {
  pub id:            i64,
  pub username:      String,
  pub password_hash: String,
  pub created_at:    String,
}

impl RawCredentials {
  pub fn into_credentials(self) -> Result<Credentials> {
    Ok(Credentials {
      user:          User {
        id:         UserId(self.id),
        username:   self.username,
        created_at: decode_dt(&self.created_at)?,
      },
      password_hash: self.password_hash,
    })
  }
}

/// Raw columns of a `shopping_lists` row.
pub struct RawList {
  pub id:         i64,
  pub name:       String,
  pub owner_id:   i64,
  pub share_code: String,
  pub created_at: String,
}

impl RawList {
  pub fn into_list(self) -> Result<ShoppingList> {
    Ok(ShoppingList {
      id:         ListId(self.id),
      name:       self.name,
      owner_id:   UserId(self.owner_id),
      share_code: ShareCode::parse(&self.share_code)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// A `shopping_lists` row joined with its owner's username.
pub struct RawListSummary {
  pub id:         i64,
  pub name:       String,
  pub owner_id:   i64,
  pub owner_name: String,
  pub share_code: String,
  pub created_at: String,
}

impl RawListSummary {
  pub fn into_summary(self) -> Result<ListSummary> {
    Ok(ListSummary {
      id:         ListId(self.id),
      name:       self.name,
      owner_id:   UserId(self.owner_id),
      owner_name: self.owner_name,
      share_code: ShareCode::parse(&self.share_code)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// A `list_members` row joined with the member's username.
pub struct RawMember {
  pub user_id:   i64,
  pub username:  String,
  pub joined_at: String,
}

impl RawMember {
  pub fn into_member(self) -> Result<Member> {
    Ok(Member {
      user_id:   UserId(self.user_id),
      username:  self.username,
      joined_at: decode_dt(&self.joined_at)?,
    })
  }
}

/// Raw columns of a `shopping_items` row.
pub struct RawItem {
  pub id:           i64,
  pub list_id:      i64,
  pub product_name: String,
  pub category:     String,
  pub sort_order:   i64,
  pub created_by:   i64,
  pub created_at:   String,
  pub bought_by:    Option<i64>,
  pub bought_at:    Option<String>,
}

impl RawItem {
  pub fn into_item(self) -> Result<Item> {
    let purchase = match (self.bought_by, self.bought_at) {
      (None, None) => None,
      (Some(by), Some(at)) => Some(Purchase {
        by: UserId(by),
        at: decode_dt(&at)?,
      }),
      _ => {
        return Err(Error::CorruptRow(format!(
          "item {} has a purchaser without a timestamp or vice versa",
          self.id
        )));
      }
    };

    Ok(Item {
      id: ItemId(self.id),
      list_id: ListId(self.list_id),
      product_name: self.product_name,
      category: self.category,
      sort_order: self.sort_order,
      created_by: UserId(self.created_by),
      created_at: decode_dt(&self.created_at)?,
      purchase,
    })
  }
}

/// A `purchase_history` row left-joined with the purchaser's username.
pub struct RawPurchaseRecord {
  pub id:             i64,
  pub list_id:        i64,
  pub product_name:   String,
  pub category:       String,
  pub bought_by:      Option<i64>,
  pub purchaser_name: Option<String>,
  pub bought_at:      String,
}

impl RawPurchaseRecord {
  pub fn into_record(self) -> Result<PurchaseRecord> {
    Ok(PurchaseRecord {
      id:             HistoryId(self.id),
      list_id:        ListId(self.list_id),
      product_name:   self.product_name,
      category:       self.category,
      purchased_by:   self.bought_by.map(UserId),
      purchaser_name: self.purchaser_name,
      purchased_at:   decode_dt(&self.bought_at)?,
    })
  }
}

/// One group of the purchase-frequency aggregate.
pub struct RawSuggestion {
  pub product_name: String,
  pub count:        i64,
}

impl RawSuggestion {
  pub fn into_suggestion(self) -> Result<Suggestion> {
    let count = u64::try_from(self.count)
      .map_err(|_| Error::CorruptRow(format!("negative count {}", self.count)))?;
    Ok(Suggestion { product_name: self.product_name, count })
  }
}
