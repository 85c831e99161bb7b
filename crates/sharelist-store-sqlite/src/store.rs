//! [`SqliteStore`], the SQLite implementation of [`ListStore`].

use std::path::Path;

use rusqlite::{
  Connection, OptionalExtension as _, Transaction, TransactionBehavior,
};

use sharelist_core::{
  id::{ItemId, ListId, UserId},
  item::{Item, NewItem, PurchaseRecord, SUGGESTION_LIMIT, Suggestion},
  list::{ListSummary, Member, NewList, ShoppingList},
  share_code::ShareCode,
  store::{DeleteOutcome, Departure, JoinOutcome, ListStore},
  user::{Credentials, NewUser, User},
};

use crate::{
  Result,
  encode::{
    RawCredentials, RawItem, RawList, RawListSummary, RawMember,
    RawPurchaseRecord, RawSuggestion, encode_dt, now,
  },
  schema::SCHEMA,
};

const ITEM_COLUMNS: &str = "id, list_id, product_name, category, sort_order,
   created_by, created_at, bought_by, bought_at";

const SUMMARY_SELECT: &str = "SELECT sl.id, sl.name, sl.owner_id, u.username,
          sl.share_code, sl.created_at
   FROM shopping_lists sl
   JOIN users u ON u.id = sl.owner_id";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A shopping-list store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Helpers (run on the connection thread) ──────────────────────────────────

/// Begin a transaction that takes the write lock up front, so a concurrent
/// writer fails at `BEGIN` instead of midway through.
fn write_tx(conn: &mut Connection) -> rusqlite::Result<Transaction<'_>> {
  conn.transaction_with_behavior(TransactionBehavior::Immediate)
}

/// `true` for `UNIQUE` and `PRIMARY KEY` violations only; foreign-key and
/// check failures are genuine errors.
fn is_unique_violation(err: &rusqlite::Error) -> bool {
  matches!(
    err,
    rusqlite::Error::SqliteFailure(e, _)
      if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
  )
}

/// Remove a list and every row that hangs off it. Callers run this inside
/// the transaction that decided the list should go.
fn cascade_delete_list(conn: &Connection, list_id: i64) -> rusqlite::Result<()> {
  conn.execute("DELETE FROM shopping_items   WHERE list_id = ?1", [list_id])?;
  conn.execute("DELETE FROM purchase_history WHERE list_id = ?1", [list_id])?;
  conn.execute("DELETE FROM list_members     WHERE list_id = ?1", [list_id])?;
  conn.execute("DELETE FROM shopping_lists   WHERE id = ?1", [list_id])?;
  Ok(())
}

fn owner_of(conn: &Connection, list_id: i64) -> rusqlite::Result<Option<i64>> {
  conn
    .query_row(
      "SELECT owner_id FROM shopping_lists WHERE id = ?1",
      [list_id],
      |r| r.get(0),
    )
    .optional()
}

fn read_item(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawItem> {
  Ok(RawItem {
    id:           row.get(0)?,
    list_id:      row.get(1)?,
    product_name: row.get(2)?,
    category:     row.get(3)?,
    sort_order:   row.get(4)?,
    created_by:   row.get(5)?,
    created_at:   row.get(6)?,
    bought_by:    row.get(7)?,
    bought_at:    row.get(8)?,
  })
}

fn read_list(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawList> {
  Ok(RawList {
    id:         row.get(0)?,
    name:       row.get(1)?,
    owner_id:   row.get(2)?,
    share_code: row.get(3)?,
    created_at: row.get(4)?,
  })
}

fn read_summary(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawListSummary> {
  Ok(RawListSummary {
    id:         row.get(0)?,
    name:       row.get(1)?,
    owner_id:   row.get(2)?,
    owner_name: row.get(3)?,
    share_code: row.get(4)?,
    created_at: row.get(5)?,
  })
}

// ─── ListStore impl ──────────────────────────────────────────────────────────

impl ListStore for SqliteStore {
  type Error = crate::Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn create_user(&self, input: NewUser) -> Result<Option<User>> {
    let created_at = now();
    let at_str     = encode_dt(created_at);
    let username   = input.username.clone();

    let id: Option<i64> = self
      .conn
      .call(move |conn| {
        let inserted = conn.execute(
          "INSERT INTO users (username, password_hash, created_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![input.username, input.password_hash, at_str],
        );
        match inserted {
          Ok(_) => Ok(Some(conn.last_insert_rowid())),
          Err(e) if is_unique_violation(&e) => Ok(None),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    Ok(id.map(|id| User { id: UserId(id), username, created_at }))
  }

  async fn find_credentials(&self, username: String) -> Result<Option<Credentials>> {
    let raw: Option<RawCredentials> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT id, username, password_hash, created_at FROM users WHERE username = ?1",
            rusqlite::params![username],
            |row| {
              Ok(RawCredentials {
                id:            row.get(0)?,
                username:      row.get(1)?,
                password_hash: row.get(2)?,
                created_at:    row.get(3)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawCredentials::into_credentials).transpose()
  }

  // ── Lists ─────────────────────────────────────────────────────────────────

  async fn create_list(&self, input: NewList) -> Result<Option<ShoppingList>> {
    let created_at = now();
    let at_str     = encode_dt(created_at);
    let name       = input.name.clone();
    let code_str   = input.share_code.as_str().to_owned();
    let owner_id   = input.owner_id.0;

    let id: Option<i64> = self
      .conn
      .call(move |conn| {
        let tx = write_tx(conn)?;
        let inserted = tx.execute(
          "INSERT INTO shopping_lists (name, owner_id, share_code, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![name, owner_id, code_str, at_str],
        );
        match inserted {
          Ok(_) => {}
          Err(e) if is_unique_violation(&e) => return Ok(None),
          Err(e) => return Err(e.into()),
        }
        let list_id = tx.last_insert_rowid();

        tx.execute(
          "INSERT INTO list_members (list_id, user_id, joined_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![list_id, owner_id, at_str],
        )?;
        tx.commit()?;
        Ok(Some(list_id))
      })
      .await?;

    Ok(id.map(|id| ShoppingList {
      id: ListId(id),
      name: input.name,
      owner_id: input.owner_id,
      share_code: input.share_code,
      created_at,
    }))
  }

  async fn join_list(&self, code: ShareCode, user: UserId) -> Result<JoinOutcome> {
    let code_str = code.as_str().to_owned();
    let at_str   = encode_dt(now());

    // `None` if no list matched, else the list and whether a row was added.
    let found: Option<(RawList, bool)> = self
      .conn
      .call(move |conn| {
        let tx = write_tx(conn)?;
        let list = tx
          .query_row(
            "SELECT id, name, owner_id, share_code, created_at
             FROM shopping_lists WHERE UPPER(share_code) = UPPER(?1)",
            rusqlite::params![code_str],
            read_list,
          )
          .optional()?;
        let Some(list) = list else { return Ok(None) };

        let inserted = tx.execute(
          "INSERT INTO list_members (list_id, user_id, joined_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![list.id, user.0, at_str],
        );
        match inserted {
          Ok(_) => {}
          Err(e) if is_unique_violation(&e) => return Ok(Some((list, false))),
          Err(e) => return Err(e.into()),
        }
        tx.commit()?;
        Ok(Some((list, true)))
      })
      .await?;

    Ok(match found {
      None => JoinOutcome::NotFound,
      Some((list, true)) => JoinOutcome::Joined(list.into_list()?),
      Some((list, false)) => JoinOutcome::AlreadyMember(ListId(list.id)),
    })
  }

  async fn lists_for(&self, user: UserId) -> Result<Vec<ListSummary>> {
    let raws: Vec<RawListSummary> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "{SUMMARY_SELECT}
           JOIN list_members lm ON lm.list_id = sl.id
           WHERE lm.user_id = ?1
           ORDER BY sl.created_at DESC, sl.id DESC"
        ))?;
        let rows = stmt
          .query_map([user.0], read_summary)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawListSummary::into_summary).collect()
  }

  async fn list_info(&self, list: ListId) -> Result<Option<ListSummary>> {
    let raw: Option<RawListSummary> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("{SUMMARY_SELECT} WHERE sl.id = ?1"),
            [list.0],
            read_summary,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawListSummary::into_summary).transpose()
  }

  async fn members_of(&self, list: ListId) -> Result<Vec<Member>> {
    let raws: Vec<RawMember> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT lm.user_id, u.username, lm.joined_at
           FROM list_members lm
           JOIN users u ON u.id = lm.user_id
           WHERE lm.list_id = ?1
           ORDER BY lm.joined_at, lm.rowid",
        )?;
        let rows = stmt
          .query_map([list.0], |row| {
            Ok(RawMember {
              user_id:   row.get(0)?,
              username:  row.get(1)?,
              joined_at: row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMember::into_member).collect()
  }

  async fn delete_list(&self, list: ListId, requester: UserId) -> Result<DeleteOutcome> {
    let outcome = self
      .conn
      .call(move |conn| {
        let tx = write_tx(conn)?;
        match owner_of(&tx, list.0)? {
          None => return Ok(DeleteOutcome::NotFound),
          Some(owner) if owner != requester.0 => return Ok(DeleteOutcome::NotOwner),
          Some(_) => {}
        }
        cascade_delete_list(&tx, list.0)?;
        tx.commit()?;
        Ok(DeleteOutcome::Deleted)
      })
      .await?;
    Ok(outcome)
  }

  async fn leave_list(&self, list: ListId, user: UserId) -> Result<Option<Departure>> {
    let departure = self
      .conn
      .call(move |conn| {
        let tx = write_tx(conn)?;
        let Some(owner) = owner_of(&tx, list.0)? else { return Ok(None) };

        let removed = tx.execute(
          "DELETE FROM list_members WHERE list_id = ?1 AND user_id = ?2",
          [list.0, user.0],
        )?;
        if removed == 0 {
          return Ok(Some(Departure::NotMember));
        }

        let departure = if owner != user.0 {
          Departure::Left
        } else {
          let successor: Option<i64> = tx
            .query_row(
              "SELECT user_id FROM list_members
               WHERE list_id = ?1
               ORDER BY joined_at, rowid
               LIMIT 1",
              [list.0],
              |r| r.get(0),
            )
            .optional()?;

          match successor {
            Some(next) => {
              tx.execute(
                "UPDATE shopping_lists SET owner_id = ?1 WHERE id = ?2",
                [next, list.0],
              )?;
              Departure::OwnershipTransferred { to: UserId(next) }
            }
            None => {
              cascade_delete_list(&tx, list.0)?;
              Departure::ListDeleted
            }
          }
        };

        tx.commit()?;
        Ok(Some(departure))
      })
      .await?;
    Ok(departure)
  }

  // ── Items ─────────────────────────────────────────────────────────────────

  async fn add_item(&self, input: NewItem) -> Result<Option<Item>> {
    let created_at = now();
    let at_str     = encode_dt(created_at);
    let list_id    = input.list_id.0;
    let name       = input.product_name.clone();
    let category   = input.category.clone();
    let creator    = input.created_by.0;

    let inserted: Option<(i64, i64)> = self
      .conn
      .call(move |conn| {
        let tx = write_tx(conn)?;
        if owner_of(&tx, list_id)?.is_none() {
          return Ok(None);
        }

        let sort_order: i64 = tx.query_row(
          "SELECT COALESCE(MAX(sort_order), 0) + 1 FROM shopping_items WHERE list_id = ?1",
          [list_id],
          |r| r.get(0),
        )?;

        tx.execute(
          "INSERT INTO shopping_items
             (list_id, product_name, category, sort_order, created_by, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![list_id, name, category, sort_order, creator, at_str],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(Some((id, sort_order)))
      })
      .await?;

    Ok(inserted.map(|(id, sort_order)| Item {
      id: ItemId(id),
      list_id: input.list_id,
      product_name: input.product_name,
      category: input.category,
      sort_order,
      created_by: input.created_by,
      created_at,
      purchase: None,
    }))
  }

  async fn active_items(&self, list: ListId) -> Result<Vec<Item>> {
    let raws: Vec<RawItem> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ITEM_COLUMNS} FROM shopping_items
           WHERE list_id = ?1 AND bought_by IS NULL
           ORDER BY sort_order, id"
        ))?;
        let rows = stmt
          .query_map([list.0], read_item)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawItem::into_item).collect()
  }

  async fn toggle_purchased(&self, item: ItemId, actor: UserId) -> Result<Option<Item>> {
    // One instant for both the item and its log entry.
    let at_str = encode_dt(now());

    let raw: Option<RawItem> = self
      .conn
      .call(move |conn| {
        let tx = write_tx(conn)?;
        let select = format!("SELECT {ITEM_COLUMNS} FROM shopping_items WHERE id = ?1");
        let Some(current) = tx.query_row(&select, [item.0], read_item).optional()? else {
          return Ok(None);
        };

        if current.bought_by.is_none() {
          tx.execute(
            "UPDATE shopping_items SET bought_by = ?1, bought_at = ?2 WHERE id = ?3",
            rusqlite::params![actor.0, at_str, item.0],
          )?;
          tx.execute(
            "INSERT INTO purchase_history (list_id, product_name, category, bought_by, bought_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
              current.list_id,
              current.product_name,
              current.category,
              actor.0,
              at_str,
            ],
          )?;
        } else {
          tx.execute(
            "UPDATE shopping_items SET bought_by = NULL, bought_at = NULL WHERE id = ?1",
            [item.0],
          )?;
        }

        let updated = tx.query_row(&select, [item.0], read_item)?;
        tx.commit()?;
        Ok(Some(updated))
      })
      .await?;

    raw.map(RawItem::into_item).transpose()
  }

  async fn delete_item(&self, item: ItemId) -> Result<bool> {
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM shopping_items WHERE id = ?1", [item.0])?)
      })
      .await?;
    Ok(removed > 0)
  }

  async fn clear_active_items(&self, list: ListId) -> Result<usize> {
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM shopping_items WHERE list_id = ?1 AND bought_by IS NULL",
          [list.0],
        )?)
      })
      .await?;
    Ok(removed)
  }

  // ── Purchase log ──────────────────────────────────────────────────────────

  async fn history_for(&self, list: ListId) -> Result<Vec<PurchaseRecord>> {
    let raws: Vec<RawPurchaseRecord> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT ph.id, ph.list_id, ph.product_name, ph.category,
                  ph.bought_by, u.username, ph.bought_at
           FROM purchase_history ph
           LEFT JOIN users u ON u.id = ph.bought_by
           WHERE ph.list_id = ?1
           ORDER BY ph.bought_at DESC, ph.id DESC",
        )?;
        let rows = stmt
          .query_map([list.0], |row| {
            Ok(RawPurchaseRecord {
              id:             row.get(0)?,
              list_id:        row.get(1)?,
              product_name:   row.get(2)?,
              category:       row.get(3)?,
              bought_by:      row.get(4)?,
              purchaser_name: row.get(5)?,
              bought_at:      row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPurchaseRecord::into_record).collect()
  }

  async fn suggestions_for(&self, list: ListId) -> Result<Vec<Suggestion>> {
    let limit = SUGGESTION_LIMIT as i64;

    let raws: Vec<RawSuggestion> = self
      .conn
      .call(move |conn| {
        // Equal counts rank by whichever product was first bought earliest.
        let mut stmt = conn.prepare(
          "SELECT product_name, COUNT(*) AS times, MIN(id) AS first_id
           FROM purchase_history
           WHERE list_id = ?1
           GROUP BY product_name
           ORDER BY times DESC, first_id ASC
           LIMIT ?2",
        )?;
        let rows = stmt
          .query_map([list.0, limit], |row| {
            Ok(RawSuggestion {
              product_name: row.get(0)?,
              count:        row.get(1)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSuggestion::into_suggestion).collect()
  }

  async fn last_purchased(&self, list: ListId) -> Result<Option<String>> {
    let name: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT product_name FROM purchase_history
             WHERE list_id = ?1
             ORDER BY bought_at DESC, id DESC
             LIMIT 1",
            [list.0],
            |r| r.get(0),
          )
          .optional()?)
      })
      .await?;
    Ok(name)
  }
}
