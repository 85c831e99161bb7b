//! [`App`], the command/query façade the UI layer talks to.
//!
//! Every method checks its preconditions (signed in, list selected, sane
//! input) before touching the store, then runs exactly one store operation
//! per mutation. Store failures come back as
//! [`AppError::StorageUnavailable`] and are never retried here.

use std::sync::Arc;

use sharelist_core::{
  category::{DEFAULT_CATEGORY, QuickCategory, quick_categories},
  id::{ItemId, ListId},
  item::{Item, NewItem, PurchaseRecord, Suggestion},
  list::{ListSummary, Member, NewList, ShoppingList},
  share_code::ShareCode,
  store::{DeleteOutcome, Departure, JoinOutcome, ListStore},
  user::{NewUser, User},
};
use tracing::{debug, info, warn};

use crate::{
  auth::Hasher,
  config::AppConfig,
  error::{AppError, Result},
  session::{CurrentUser, Session, SessionUser},
};

pub struct App<S: ListStore> {
  store:               Arc<S>,
  hasher:              Hasher,
  share_code_attempts: u32,
}

impl<S: ListStore> Clone for App<S> {
  fn clone(&self) -> Self {
    Self {
      store:               Arc::clone(&self.store),
      hasher:              self.hasher.clone(),
      share_code_attempts: self.share_code_attempts,
    }
  }
}

/// Trim `value` and reject it if nothing is left.
fn non_empty<'a>(field: &str, value: &'a str) -> Result<&'a str> {
  let trimmed = value.trim();
  if trimmed.is_empty() {
    return Err(AppError::InvalidInput(format!("{field} must not be empty")));
  }
  Ok(trimmed)
}

impl<S: ListStore> App<S> {
  pub fn new(store: Arc<S>, config: &AppConfig) -> Result<Self> {
    Ok(Self {
      store,
      hasher: Hasher::new(&config.hashing)?,
      share_code_attempts: config.share_code_attempts.max(1),
    })
  }

  /// The fixed category catalog, default last.
  pub fn quick_categories() -> Vec<&'static str> { quick_categories() }

  // ── Identity ──────────────────────────────────────────────────────────────

  /// Create an account. Does not sign anyone in.
  pub async fn register(&self, username: &str, password: &str) -> Result<User> {
    let username = non_empty("username", username)?;
    if password.is_empty() {
      return Err(AppError::InvalidInput("password must not be empty".into()));
    }

    let password_hash = self.hasher.hash(password)?;
    let created = self
      .store
      .create_user(NewUser { username: username.to_owned(), password_hash })
      .await
      .map_err(AppError::storage)?;

    match created {
      Some(user) => {
        info!(user = %user.id, username = %user.username, "registered user");
        Ok(user)
      }
      None => Err(AppError::DuplicateUsername(username.to_owned())),
    }
  }

  /// Check credentials and make `session` belong to that user, replacing any
  /// previous sign-in.
  pub async fn login(
    &self,
    session: &mut Session,
    username: &str,
    password: &str,
  ) -> Result<SessionUser> {
    // Same normalisation as `register`.
    let username = username.trim();
    let credentials = self
      .store
      .find_credentials(username.to_owned())
      .await
      .map_err(AppError::storage)?;

    let Some(credentials) = credentials else {
      warn!(%username, "login for unknown user");
      return Err(AppError::InvalidCredentials);
    };
    if !self.hasher.verify(password, &credentials.password_hash) {
      warn!(%username, "login with wrong password");
      return Err(AppError::InvalidCredentials);
    }

    let user = SessionUser {
      id:       credentials.user.id,
      username: credentials.user.username,
    };
    info!(user = %user.id, username = %user.username, "logged in");
    session.sign_in(user.clone());
    Ok(user)
  }

  pub fn logout(&self, session: &mut Session) {
    if let Some(user) = session.user() {
      info!(user = %user.id, username = %user.username, "logged out");
    }
    session.sign_out();
  }

  pub fn current_user(&self, session: &Session) -> CurrentUser {
    session
      .user()
      .cloned()
      .map_or(CurrentUser::Anonymous, CurrentUser::User)
  }

  // ── Lists ─────────────────────────────────────────────────────────────────

  /// Create a list owned by the session user and select it.
  pub async fn create_list(&self, session: &mut Session, name: &str) -> Result<ShoppingList> {
    let owner = session.require_user()?.id;
    let name = non_empty("list name", name)?;

    for attempt in 1..=self.share_code_attempts {
      let input = NewList {
        name:       name.to_owned(),
        owner_id:   owner,
        share_code: ShareCode::generate(),
      };
      let created = self.store.create_list(input).await.map_err(AppError::storage)?;

      if let Some(list) = created {
        info!(list = %list.id, owner = %owner, code = %list.share_code, "created list");
        session.select(list.id);
        return Ok(list);
      }
      warn!(attempt, "share code collision");
    }

    Err(AppError::ShareCodeCollision(self.share_code_attempts))
  }

  /// Join the list carrying `code` (any letter case) and select it.
  pub async fn join_list(&self, session: &mut Session, code: &str) -> Result<ShoppingList> {
    let user = session.require_user()?.id;
    // A malformed code cannot belong to any list.
    let code = ShareCode::parse(code).map_err(|_| AppError::ListNotFound)?;

    let outcome = self.store.join_list(code, user).await.map_err(AppError::storage)?;
    match outcome {
      JoinOutcome::Joined(list) => {
        info!(list = %list.id, %user, "joined list");
        session.select(list.id);
        Ok(list)
      }
      JoinOutcome::NotFound => Err(AppError::ListNotFound),
      JoinOutcome::AlreadyMember(list) => Err(AppError::AlreadyMember(list)),
    }
  }

  /// Lists the session user belongs to, newest first.
  pub async fn lists(&self, session: &Session) -> Result<Vec<ListSummary>> {
    let user = session.require_user()?.id;
    self.store.lists_for(user).await.map_err(AppError::storage)
  }

  /// Make `list` the session's current list.
  pub async fn select_list(&self, session: &mut Session, list: ListId) -> Result<ListSummary> {
    let summary = self.list_info(session, list).await?;
    session.select(list);
    Ok(summary)
  }

  /// Metadata of any list; membership is not checked.
  pub async fn list_info(&self, session: &Session, list: ListId) -> Result<ListSummary> {
    session.require_user()?;
    self
      .store
      .list_info(list)
      .await
      .map_err(AppError::storage)?
      .ok_or(AppError::ListNotFound)
  }

  pub async fn current_list_info(&self, session: &Session) -> Result<ListSummary> {
    let list = session.require_list()?;
    self.list_info(session, list).await
  }

  /// Members of any list in join order; membership is not checked.
  pub async fn members_of(&self, session: &Session, list: ListId) -> Result<Vec<Member>> {
    session.require_user()?;
    self.store.members_of(list).await.map_err(AppError::storage)
  }

  /// Delete a list the session user owns, along with everything in it.
  pub async fn delete_list(&self, session: &mut Session, list: ListId) -> Result<()> {
    let user = session.require_user()?.id;
    let outcome = self
      .store
      .delete_list(list, user)
      .await
      .map_err(AppError::storage)?;

    match outcome {
      DeleteOutcome::Deleted => {
        info!(%list, %user, "deleted list");
        session.forget(list);
        Ok(())
      }
      DeleteOutcome::NotFound => Err(AppError::ListNotFound),
      DeleteOutcome::NotOwner => Err(AppError::NotOwner),
    }
  }

  /// Leave a list. An owner hands the list to the earliest-joined remaining
  /// member; the last member out deletes it.
  pub async fn leave_list(&self, session: &mut Session, list: ListId) -> Result<Departure> {
    let user = session.require_user()?.id;
    let departure = self
      .store
      .leave_list(list, user)
      .await
      .map_err(AppError::storage)?
      .ok_or(AppError::ListNotFound)?;

    match departure {
      Departure::Left => info!(%list, %user, "left list"),
      Departure::OwnershipTransferred { to } => {
        info!(%list, %user, new_owner = %to, "left list; ownership transferred");
      }
      Departure::ListDeleted => info!(%list, %user, "last member left; list deleted"),
      Departure::NotMember => debug!(%list, %user, "leave requested by non-member"),
    }
    session.forget(list);
    Ok(departure)
  }

  pub async fn leave_current_list(&self, session: &mut Session) -> Result<Departure> {
    let list = session.require_list()?;
    self.leave_list(session, list).await
  }

  // ── Items ─────────────────────────────────────────────────────────────────

  /// Append an item to the end of `list`. `category` defaults to
  /// [`DEFAULT_CATEGORY`]; catalog names are matched case-insensitively.
  pub async fn add_item(
    &self,
    session: &Session,
    list: ListId,
    product_name: &str,
    category: Option<&str>,
  ) -> Result<Item> {
    let user = session.require_user()?.id;
    let product_name = non_empty("product name", product_name)?;
    let category = category
      .map_or_else(|| DEFAULT_CATEGORY.to_owned(), QuickCategory::normalize);

    let item = self
      .store
      .add_item(NewItem::new(list, product_name, user).with_category(category))
      .await
      .map_err(AppError::storage)?
      .ok_or(AppError::ListNotFound)?;

    debug!(%list, item = %item.id, product = %item.product_name, "added item");
    Ok(item)
  }

  /// Put a suggested product back on the list under the default category.
  pub async fn add_suggestion(
    &self,
    session: &Session,
    list: ListId,
    product_name: &str,
  ) -> Result<Item> {
    self.add_item(session, list, product_name, None).await
  }

  /// Unpurchased items in display order.
  pub async fn active_items(&self, session: &Session, list: ListId) -> Result<Vec<Item>> {
    session.require_user()?;
    self.store.active_items(list).await.map_err(AppError::storage)
  }

  /// Mark an item bought by the session user, or un-mark it.
  pub async fn toggle_purchased(&self, session: &Session, item: ItemId) -> Result<Item> {
    let user = session.require_user()?.id;
    let updated = self
      .store
      .toggle_purchased(item, user)
      .await
      .map_err(AppError::storage)?
      .ok_or(AppError::ItemNotFound(item))?;

    debug!(%item, %user, purchased = !updated.is_active(), "toggled item");
    Ok(updated)
  }

  pub async fn delete_item(&self, session: &Session, item: ItemId) -> Result<()> {
    session.require_user()?;
    let removed = self.store.delete_item(item).await.map_err(AppError::storage)?;
    if !removed {
      return Err(AppError::ItemNotFound(item));
    }
    debug!(%item, "deleted item");
    Ok(())
  }

  /// Remove every unpurchased item; returns how many went.
  pub async fn clear_active_items(&self, session: &Session, list: ListId) -> Result<usize> {
    session.require_user()?;
    let removed = self
      .store
      .clear_active_items(list)
      .await
      .map_err(AppError::storage)?;
    debug!(%list, removed, "cleared active items");
    Ok(removed)
  }

  // ── Purchase log ──────────────────────────────────────────────────────────

  pub async fn history_for(&self, session: &Session, list: ListId) -> Result<Vec<PurchaseRecord>> {
    session.require_user()?;
    self.store.history_for(list).await.map_err(AppError::storage)
  }

  pub async fn suggestions_for(&self, session: &Session, list: ListId) -> Result<Vec<Suggestion>> {
    session.require_user()?;
    self.store.suggestions_for(list).await.map_err(AppError::storage)
  }

  pub async fn last_purchased(&self, session: &Session, list: ListId) -> Result<Option<String>> {
    session.require_user()?;
    self.store.last_purchased(list).await.map_err(AppError::storage)
  }
}
