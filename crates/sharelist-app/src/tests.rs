//! Façade tests against an in-memory SQLite store.

use std::sync::Arc;

use sharelist_core::{
  category::DEFAULT_CATEGORY,
  id::{ItemId, ListId, UserId},
  item::{Item, NewItem, PurchaseRecord, Suggestion},
  list::{ListSummary, Member, NewList, ShoppingList},
  share_code::ShareCode,
  store::{DeleteOutcome, Departure, JoinOutcome, ListStore},
  user::{Credentials, NewUser, User},
};
use sharelist_store_sqlite::SqliteStore;

use crate::{
  App, AppConfig, AppError, CurrentUser, Session,
  config::HashingConfig,
  shell,
};

fn config() -> AppConfig {
  AppConfig { hashing: HashingConfig::cheap(), ..AppConfig::default() }
}

async fn app() -> App<SqliteStore> {
  let store = SqliteStore::open_in_memory()
    .await
    .expect("in-memory store");
  App::new(Arc::new(store), &config()).unwrap()
}

/// Register `name` (password `pw-<name>`) and return a session signed in as
/// them.
async fn signed_in(app: &App<SqliteStore>, name: &str) -> Session {
  let password = format!("pw-{name}");
  app.register(name, &password).await.unwrap();
  let mut session = Session::new();
  app.login(&mut session, name, &password).await.unwrap();
  session
}

async fn active_names(app: &App<SqliteStore>, session: &Session, list: ListId) -> Vec<String> {
  app
    .active_items(session, list)
    .await
    .unwrap()
    .into_iter()
    .map(|i| i.product_name)
    .collect()
}

async fn buy(app: &App<SqliteStore>, session: &Session, list: ListId, name: &str) {
  let item = app.add_item(session, list, name, None).await.unwrap();
  app.toggle_purchased(session, item.id).await.unwrap();
}

// ─── Identity ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn registering_twice_is_a_duplicate() {
  let app = app().await;
  app.register("alice", "secret").await.unwrap();

  let err = app.register("alice", "other").await.unwrap_err();
  assert!(matches!(err, AppError::DuplicateUsername(ref n) if n == "alice"), "{err:?}");

  // Case-sensitive.
  app.register("Alice", "secret").await.unwrap();
}

#[tokio::test]
async fn register_rejects_empty_fields() {
  let app = app().await;
  assert!(matches!(app.register("  ", "secret").await, Err(AppError::InvalidInput(_))));
  assert!(matches!(app.register("alice", "").await, Err(AppError::InvalidInput(_))));
}

#[tokio::test]
async fn register_does_not_log_in() {
  let app = app().await;
  app.register("alice", "secret").await.unwrap();
  let session = Session::new();
  assert_eq!(app.current_user(&session), CurrentUser::Anonymous);
}

#[tokio::test]
async fn login_checks_credentials() {
  let app = app().await;
  app.register("alice", "secret").await.unwrap();
  let mut session = Session::new();

  let wrong = app.login(&mut session, "alice", "Secret").await;
  assert!(matches!(wrong, Err(AppError::InvalidCredentials)));
  let unknown = app.login(&mut session, "mallory", "secret").await;
  assert!(matches!(unknown, Err(AppError::InvalidCredentials)));
  assert!(session.user().is_none());

  let user = app.login(&mut session, "alice", "secret").await.unwrap();
  assert_eq!(user.username, "alice");
  assert_eq!(app.current_user(&session).display_name(), "alice");
}

#[tokio::test]
async fn padded_username_logs_in_as_registered() {
  let app = app().await;
  let user = app.register("  carol  ", "pw").await.unwrap();
  assert_eq!(user.username, "carol");

  let mut session = Session::new();
  let signed = app.login(&mut session, "  carol  ", "pw").await.unwrap();
  assert_eq!(signed.id, user.id);
  app.login(&mut session, "carol", "pw").await.unwrap();

  let again = app.register("carol ", "pw").await;
  assert!(matches!(again, Err(AppError::DuplicateUsername(ref n)) if n == "carol"));
}

#[tokio::test]
async fn login_replaces_session_and_logout_clears_it() {
  let app = app().await;
  let mut session = signed_in(&app, "alice").await;
  app.create_list(&mut session, "Groceries").await.unwrap();
  assert!(session.current_list().is_some());

  app.register("bob", "pw-bob").await.unwrap();
  app.login(&mut session, "bob", "pw-bob").await.unwrap();
  assert_eq!(app.current_user(&session).display_name(), "bob");
  assert_eq!(session.current_list(), None);

  app.logout(&mut session);
  assert!(app.current_user(&session).is_anonymous());
  assert_eq!(app.current_user(&session).display_name(), "Guest");
  // Logging out twice is harmless.
  app.logout(&mut session);
}

#[tokio::test]
async fn sessions_are_independent() {
  let app = app().await;
  let alice = signed_in(&app, "alice").await;
  let bob = signed_in(&app, "bob").await;
  assert_eq!(app.current_user(&alice).display_name(), "alice");
  assert_eq!(app.current_user(&bob).display_name(), "bob");
}

// ─── Preconditions ───────────────────────────────────────────────────────────

#[tokio::test]
async fn anonymous_sessions_are_rejected() {
  let app = app().await;
  let mut session = Session::new();
  let list = ListId(1);

  assert!(matches!(app.create_list(&mut session, "x").await, Err(AppError::NotAuthenticated)));
  assert!(matches!(app.join_list(&mut session, "ABCDEF12").await, Err(AppError::NotAuthenticated)));
  assert!(matches!(app.lists(&session).await, Err(AppError::NotAuthenticated)));
  assert!(matches!(app.list_info(&session, list).await, Err(AppError::NotAuthenticated)));
  assert!(matches!(app.members_of(&session, list).await, Err(AppError::NotAuthenticated)));
  assert!(matches!(app.delete_list(&mut session, list).await, Err(AppError::NotAuthenticated)));
  assert!(matches!(app.leave_list(&mut session, list).await, Err(AppError::NotAuthenticated)));
  assert!(matches!(app.add_item(&session, list, "Milk", None).await, Err(AppError::NotAuthenticated)));
  assert!(matches!(app.active_items(&session, list).await, Err(AppError::NotAuthenticated)));
  assert!(matches!(app.toggle_purchased(&session, ItemId(1)).await, Err(AppError::NotAuthenticated)));
  assert!(matches!(app.delete_item(&session, ItemId(1)).await, Err(AppError::NotAuthenticated)));
  assert!(matches!(app.clear_active_items(&session, list).await, Err(AppError::NotAuthenticated)));
  assert!(matches!(app.history_for(&session, list).await, Err(AppError::NotAuthenticated)));
  assert!(matches!(app.suggestions_for(&session, list).await, Err(AppError::NotAuthenticated)));
  assert!(matches!(app.last_purchased(&session, list).await, Err(AppError::NotAuthenticated)));
  assert!(matches!(app.current_list_info(&session).await, Err(AppError::NotAuthenticated)));
}

#[tokio::test]
async fn current_list_operations_need_a_selection() {
  let app = app().await;
  let mut session = signed_in(&app, "alice").await;
  assert!(matches!(app.current_list_info(&session).await, Err(AppError::NoListSelected)));
  assert!(matches!(app.leave_current_list(&mut session).await, Err(AppError::NoListSelected)));
}

// ─── Lists ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_list_makes_creator_sole_member_and_selects_it() {
  let app = app().await;
  let mut session = signed_in(&app, "alice").await;
  let alice = session.require_user().unwrap().id;

  let list = app.create_list(&mut session, "Groceries").await.unwrap();
  assert_eq!(list.name, "Groceries");
  assert_eq!(list.owner_id, alice);
  assert_eq!(list.share_code.as_str().len(), 8);
  assert_eq!(session.current_list(), Some(list.id));

  let members = app.members_of(&session, list.id).await.unwrap();
  assert_eq!(members.len(), 1);
  assert_eq!(members[0].user_id, alice);

  let info = app.current_list_info(&session).await.unwrap();
  assert_eq!(info.owner_name, "alice");
}

#[tokio::test]
async fn create_list_rejects_blank_name() {
  let app = app().await;
  let mut session = signed_in(&app, "alice").await;
  assert!(matches!(app.create_list(&mut session, " ").await, Err(AppError::InvalidInput(_))));
}

#[tokio::test]
async fn join_is_case_insensitive_and_once_only() {
  let app = app().await;
  let mut alice = signed_in(&app, "alice").await;
  let mut bob = signed_in(&app, "bob").await;
  let list = app.create_list(&mut alice, "Groceries").await.unwrap();

  let code = format!("  {}  ", list.share_code.as_str().to_lowercase());
  let joined = app.join_list(&mut bob, &code).await.unwrap();
  assert_eq!(joined.id, list.id);
  assert_eq!(bob.current_list(), Some(list.id));

  let again = app.join_list(&mut bob, list.share_code.as_str()).await;
  assert!(matches!(again, Err(AppError::AlreadyMember(id)) if id == list.id));

  let members: Vec<_> = app
    .members_of(&bob, list.id)
    .await
    .unwrap()
    .into_iter()
    .map(|m| m.username)
    .collect();
  assert_eq!(members, ["alice", "bob"]);
}

#[tokio::test]
async fn join_unknown_or_malformed_code() {
  let app = app().await;
  let mut bob = signed_in(&app, "bob").await;
  assert!(matches!(app.join_list(&mut bob, "ZZZZZZZZ").await, Err(AppError::ListNotFound)));
  assert!(matches!(app.join_list(&mut bob, "short").await, Err(AppError::ListNotFound)));
  assert_eq!(bob.current_list(), None);
}

#[tokio::test]
async fn lists_are_newest_first() {
  let app = app().await;
  let mut session = signed_in(&app, "alice").await;
  app.create_list(&mut session, "First").await.unwrap();
  app.create_list(&mut session, "Second").await.unwrap();

  let names: Vec<_> = app
    .lists(&session)
    .await
    .unwrap()
    .into_iter()
    .map(|l| l.name)
    .collect();
  assert_eq!(names, ["Second", "First"]);
}

#[tokio::test]
async fn select_list_requires_an_existing_list() {
  let app = app().await;
  let mut session = signed_in(&app, "alice").await;
  let first = app.create_list(&mut session, "First").await.unwrap();
  app.create_list(&mut session, "Second").await.unwrap();

  let summary = app.select_list(&mut session, first.id).await.unwrap();
  assert_eq!(summary.name, "First");
  assert_eq!(session.current_list(), Some(first.id));

  assert!(matches!(app.select_list(&mut session, ListId(999)).await, Err(AppError::ListNotFound)));
  assert_eq!(session.current_list(), Some(first.id));
}

#[tokio::test]
async fn list_info_is_readable_by_non_members() {
  let app = app().await;
  let mut alice = signed_in(&app, "alice").await;
  let bob = signed_in(&app, "bob").await;
  let list = app.create_list(&mut alice, "Groceries").await.unwrap();

  let info = app.list_info(&bob, list.id).await.unwrap();
  assert_eq!(info.name, "Groceries");
  assert_eq!(app.members_of(&bob, list.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn only_the_owner_can_delete() {
  let app = app().await;
  let mut alice = signed_in(&app, "alice").await;
  let mut bob = signed_in(&app, "bob").await;
  let list = app.create_list(&mut alice, "Groceries").await.unwrap();
  app.join_list(&mut bob, list.share_code.as_str()).await.unwrap();

  assert!(matches!(app.delete_list(&mut bob, list.id).await, Err(AppError::NotOwner)));
  assert_eq!(bob.current_list(), Some(list.id));
  assert!(matches!(app.delete_list(&mut alice, ListId(999)).await, Err(AppError::ListNotFound)));
}

#[tokio::test]
async fn delete_list_cascades() {
  let app = app().await;
  let mut session = signed_in(&app, "alice").await;
  let list = app.create_list(&mut session, "Groceries").await.unwrap();
  buy(&app, &session, list.id, "Milk").await;
  app.add_item(&session, list.id, "Bread", None).await.unwrap();

  app.delete_list(&mut session, list.id).await.unwrap();
  assert_eq!(session.current_list(), None);

  assert!(matches!(app.list_info(&session, list.id).await, Err(AppError::ListNotFound)));
  assert!(app.members_of(&session, list.id).await.unwrap().is_empty());
  assert!(app.active_items(&session, list.id).await.unwrap().is_empty());
  assert!(app.history_for(&session, list.id).await.unwrap().is_empty());
  assert!(app.lists(&session).await.unwrap().is_empty());
}

// ─── Leaving ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn owner_leaving_transfers_ownership() {
  let app = app().await;
  let mut alice = signed_in(&app, "alice").await;
  let mut bob = signed_in(&app, "bob").await;
  let bob_id = bob.require_user().unwrap().id;
  let list = app.create_list(&mut alice, "Groceries").await.unwrap();
  app.join_list(&mut bob, list.share_code.as_str()).await.unwrap();

  let departure = app.leave_current_list(&mut alice).await.unwrap();
  assert_eq!(departure, Departure::OwnershipTransferred { to: bob_id });
  assert_eq!(alice.current_list(), None);

  let info = app.list_info(&bob, list.id).await.unwrap();
  assert_eq!(info.owner_id, bob_id);
  let members = app.members_of(&bob, list.id).await.unwrap();
  assert!(members.iter().any(|m| m.user_id == info.owner_id));
  assert_eq!(members.len(), 1);
}

#[tokio::test]
async fn ownership_goes_to_the_earliest_joiner() {
  let app = app().await;
  let mut alice = signed_in(&app, "alice").await;
  let mut bob = signed_in(&app, "bob").await;
  let mut carol = signed_in(&app, "carol").await;
  let bob_id = bob.require_user().unwrap().id;
  let list = app.create_list(&mut alice, "Groceries").await.unwrap();
  app.join_list(&mut bob, list.share_code.as_str()).await.unwrap();
  app.join_list(&mut carol, list.share_code.as_str()).await.unwrap();

  let departure = app.leave_list(&mut alice, list.id).await.unwrap();
  assert_eq!(departure, Departure::OwnershipTransferred { to: bob_id });
}

#[tokio::test]
async fn last_member_leaving_deletes_the_list() {
  let app = app().await;
  let mut session = signed_in(&app, "alice").await;
  let list = app.create_list(&mut session, "Solo").await.unwrap();
  buy(&app, &session, list.id, "Milk").await;

  let departure = app.leave_list(&mut session, list.id).await.unwrap();
  assert_eq!(departure, Departure::ListDeleted);
  assert!(matches!(app.list_info(&session, list.id).await, Err(AppError::ListNotFound)));
  assert!(app.history_for(&session, list.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn member_leaving_keeps_the_owner() {
  let app = app().await;
  let mut alice = signed_in(&app, "alice").await;
  let mut bob = signed_in(&app, "bob").await;
  let alice_id = alice.require_user().unwrap().id;
  let list = app.create_list(&mut alice, "Groceries").await.unwrap();
  app.join_list(&mut bob, list.share_code.as_str()).await.unwrap();

  assert_eq!(app.leave_list(&mut bob, list.id).await.unwrap(), Departure::Left);
  assert_eq!(app.list_info(&alice, list.id).await.unwrap().owner_id, alice_id);
}

#[tokio::test]
async fn leaving_without_membership_or_list() {
  let app = app().await;
  let mut alice = signed_in(&app, "alice").await;
  let mut bob = signed_in(&app, "bob").await;
  let list = app.create_list(&mut alice, "Groceries").await.unwrap();

  assert_eq!(app.leave_list(&mut bob, list.id).await.unwrap(), Departure::NotMember);
  assert!(matches!(app.leave_list(&mut bob, ListId(999)).await, Err(AppError::ListNotFound)));
  assert_eq!(app.members_of(&alice, list.id).await.unwrap().len(), 1);
}

// ─── Items ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn items_keep_insertion_order_across_deletes() {
  let app = app().await;
  let mut session = signed_in(&app, "alice").await;
  let list = app.create_list(&mut session, "Groceries").await.unwrap().id;

  app.add_item(&session, list, "Milk", None).await.unwrap();
  let bread = app.add_item(&session, list, "Bread", None).await.unwrap();
  app.add_item(&session, list, "Eggs", None).await.unwrap();
  assert_eq!(active_names(&app, &session, list).await, ["Milk", "Bread", "Eggs"]);

  app.delete_item(&session, bread.id).await.unwrap();
  let cheese = app.add_item(&session, list, "Cheese", None).await.unwrap();
  assert_eq!(cheese.sort_order, 4);
  assert_eq!(active_names(&app, &session, list).await, ["Milk", "Eggs", "Cheese"]);
}

#[tokio::test]
async fn add_item_validates_input() {
  let app = app().await;
  let mut session = signed_in(&app, "alice").await;
  let list = app.create_list(&mut session, "Groceries").await.unwrap().id;

  assert!(matches!(app.add_item(&session, list, "  ", None).await, Err(AppError::InvalidInput(_))));
  assert!(matches!(
    app.add_item(&session, ListId(999), "Milk", None).await,
    Err(AppError::ListNotFound)
  ));

  let plain = app.add_item(&session, list, " Milk ", Some("")).await.unwrap();
  assert_eq!(plain.product_name, "Milk");
  assert_eq!(plain.category, DEFAULT_CATEGORY);

  let dairy = app.add_item(&session, list, "Yoghurt", Some("dairy")).await.unwrap();
  assert_eq!(dairy.category, "Dairy");

  let suggested = app.add_suggestion(&session, list, "Bread").await.unwrap();
  assert_eq!(suggested.category, DEFAULT_CATEGORY);
  assert_eq!(suggested.sort_order, 3);

  let custom = app.add_item(&session, list, "Pepper", Some(" Spices ")).await.unwrap();
  assert_eq!(custom.category, "Spices");
}

#[tokio::test]
async fn toggling_back_keeps_one_history_record() {
  let app = app().await;
  let mut session = signed_in(&app, "alice").await;
  let alice = session.require_user().unwrap().id;
  let list = app.create_list(&mut session, "Groceries").await.unwrap().id;
  let milk = app.add_item(&session, list, "Milk", None).await.unwrap();

  let bought = app.toggle_purchased(&session, milk.id).await.unwrap();
  assert_eq!(bought.purchase.as_ref().map(|p| p.by), Some(alice));
  assert!(active_names(&app, &session, list).await.is_empty());

  let back = app.toggle_purchased(&session, milk.id).await.unwrap();
  assert!(back.is_active());
  assert_eq!(active_names(&app, &session, list).await, ["Milk"]);

  let history = app.history_for(&session, list).await.unwrap();
  assert_eq!(history.len(), 1);
  assert_eq!(history[0].product_name, "Milk");
  assert_eq!(history[0].purchaser_name.as_deref(), Some("alice"));
}

#[tokio::test]
async fn missing_items_are_reported() {
  let app = app().await;
  let session = signed_in(&app, "alice").await;
  assert!(matches!(
    app.toggle_purchased(&session, ItemId(42)).await,
    Err(AppError::ItemNotFound(ItemId(42)))
  ));
  assert!(matches!(
    app.delete_item(&session, ItemId(42)).await,
    Err(AppError::ItemNotFound(ItemId(42)))
  ));
}

#[tokio::test]
async fn clear_removes_only_active_items() {
  let app = app().await;
  let mut session = signed_in(&app, "alice").await;
  let list = app.create_list(&mut session, "Groceries").await.unwrap().id;
  buy(&app, &session, list, "Milk").await;
  app.add_item(&session, list, "Bread", None).await.unwrap();
  app.add_item(&session, list, "Eggs", None).await.unwrap();

  assert_eq!(app.clear_active_items(&session, list).await.unwrap(), 2);
  assert!(active_names(&app, &session, list).await.is_empty());
  assert_eq!(app.history_for(&session, list).await.unwrap().len(), 1);
  assert_eq!(app.clear_active_items(&session, list).await.unwrap(), 0);
}

// ─── Purchase log ────────────────────────────────────────────────────────────

#[tokio::test]
async fn suggestions_rank_by_purchase_count() {
  let app = app().await;
  let mut session = signed_in(&app, "alice").await;
  let list = app.create_list(&mut session, "Groceries").await.unwrap().id;

  let milk = app.add_item(&session, list, "Milk", None).await.unwrap();
  for _ in 0..3 {
    app.toggle_purchased(&session, milk.id).await.unwrap();
    app.toggle_purchased(&session, milk.id).await.unwrap();
  }
  buy(&app, &session, list, "Bread").await;

  let suggestions = app.suggestions_for(&session, list).await.unwrap();
  let ranked: Vec<_> = suggestions
    .iter()
    .map(|s| (s.product_name.as_str(), s.count))
    .collect();
  assert_eq!(ranked, [("Milk", 3), ("Bread", 1)]);

  let again = app.add_suggestion(&session, list, &suggestions[1].product_name).await.unwrap();
  assert_eq!(again.product_name, "Bread");
}

#[tokio::test]
async fn last_purchased_is_most_recent() {
  let app = app().await;
  let mut session = signed_in(&app, "alice").await;
  let list = app.create_list(&mut session, "Groceries").await.unwrap().id;
  assert_eq!(app.last_purchased(&session, list).await.unwrap(), None);

  buy(&app, &session, list, "Eggs").await;
  buy(&app, &session, list, "Milk").await;
  assert_eq!(app.last_purchased(&session, list).await.unwrap().as_deref(), Some("Milk"));

  let names: Vec<_> = app
    .history_for(&session, list)
    .await
    .unwrap()
    .into_iter()
    .map(|r| r.product_name)
    .collect();
  assert_eq!(names, ["Milk", "Eggs"]);
}

#[test]
fn quick_categories_end_with_the_default() {
  let categories = App::<SqliteStore>::quick_categories();
  assert_eq!(categories.len(), 16);
  assert_eq!(categories[0], "Fruit");
  assert_eq!(categories.last().copied(), Some(DEFAULT_CATEGORY));
}

// ─── Storage failures ────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
#[error("disk unplugged")]
struct Unplugged;

/// A store whose every operation fails.
struct BrokenStore;

impl ListStore for BrokenStore {
  type Error = Unplugged;

  async fn create_user(&self, _: NewUser) -> Result<Option<User>, Unplugged> { Err(Unplugged) }

  async fn find_credentials(&self, _: String) -> Result<Option<Credentials>, Unplugged> {
    Err(Unplugged)
  }

  async fn create_list(&self, _: NewList) -> Result<Option<ShoppingList>, Unplugged> {
    Err(Unplugged)
  }

  async fn join_list(&self, _: ShareCode, _: UserId) -> Result<JoinOutcome, Unplugged> {
    Err(Unplugged)
  }

  async fn lists_for(&self, _: UserId) -> Result<Vec<ListSummary>, Unplugged> { Err(Unplugged) }

  async fn list_info(&self, _: ListId) -> Result<Option<ListSummary>, Unplugged> {
    Err(Unplugged)
  }

  async fn members_of(&self, _: ListId) -> Result<Vec<Member>, Unplugged> { Err(Unplugged) }

  async fn delete_list(&self, _: ListId, _: UserId) -> Result<DeleteOutcome, Unplugged> {
    Err(Unplugged)
  }

  async fn leave_list(&self, _: ListId, _: UserId) -> Result<Option<Departure>, Unplugged> {
    Err(Unplugged)
  }

  async fn add_item(&self, _: NewItem) -> Result<Option<Item>, Unplugged> { Err(Unplugged) }

  async fn active_items(&self, _: ListId) -> Result<Vec<Item>, Unplugged> { Err(Unplugged) }

  async fn toggle_purchased(&self, _: ItemId, _: UserId) -> Result<Option<Item>, Unplugged> {
    Err(Unplugged)
  }

  async fn delete_item(&self, _: ItemId) -> Result<bool, Unplugged> { Err(Unplugged) }

  async fn clear_active_items(&self, _: ListId) -> Result<usize, Unplugged> { Err(Unplugged) }

  async fn history_for(&self, _: ListId) -> Result<Vec<PurchaseRecord>, Unplugged> {
    Err(Unplugged)
  }

  async fn suggestions_for(&self, _: ListId) -> Result<Vec<Suggestion>, Unplugged> {
    Err(Unplugged)
  }

  async fn last_purchased(&self, _: ListId) -> Result<Option<String>, Unplugged> {
    Err(Unplugged)
  }
}

#[tokio::test]
async fn storage_failures_become_storage_unavailable() {
  let app = App::new(Arc::new(BrokenStore), &config()).unwrap();

  let err = app.register("alice", "secret").await.unwrap_err();
  assert!(matches!(err, AppError::StorageUnavailable(_)), "{err:?}");
  assert_eq!(err.to_string(), "storage unavailable: disk unplugged");

  let mut session = Session::new();
  assert!(matches!(
    app.login(&mut session, "alice", "secret").await,
    Err(AppError::StorageUnavailable(_))
  ));
}

#[tokio::test]
async fn preconditions_are_checked_before_storage() {
  let app = App::new(Arc::new(BrokenStore), &config()).unwrap();
  let mut session = Session::new();

  // The broken store would answer StorageUnavailable if it were reached.
  assert!(matches!(app.lists(&session).await, Err(AppError::NotAuthenticated)));
  assert!(matches!(app.register("", "secret").await, Err(AppError::InvalidInput(_))));
  assert!(matches!(app.leave_current_list(&mut session).await, Err(AppError::NotAuthenticated)));
}

// ─── Shell ───────────────────────────────────────────────────────────────────

async fn run_shell(app: &App<SqliteStore>, script: &str) -> String {
  let mut output = Vec::new();
  shell::run(app, script.as_bytes(), &mut output).await.unwrap();
  String::from_utf8(output).unwrap()
}

#[tokio::test]
async fn shell_session_round_trip() {
  let app = app().await;
  let script = "\
    whoami
    register alice secret
    login alice secret
    create Weekly shop
    add Whole milk --category Dairy
    add Bread
    items
    toggle 1
    last
    suggest
    quit
    items
  ";
  let out = run_shell(&app, script).await;
  let lines: Vec<_> = out.lines().collect();

  assert_eq!(lines[0], "Guest");
  assert_eq!(lines[1], "registered alice");
  assert_eq!(lines[2], "logged in as alice");
  assert!(lines[3].starts_with("created list 1 \"Weekly shop\""), "{out}");
  assert_eq!(lines[4], "added 1  Whole milk  [Dairy]");
  assert_eq!(lines[5], "added 2  Bread  [Other]");
  assert_eq!(&lines[6..8], ["1  Whole milk  [Dairy]", "2  Bread  [Other]"]);
  assert_eq!(lines[8], "Whole milk purchased");
  assert_eq!(lines[9], "Whole milk");
  assert_eq!(lines[10], "Whole milk (1x)");
  // Nothing after `quit` runs.
  assert_eq!(lines.len(), 11, "{out}");
}

#[tokio::test]
async fn shell_reports_errors_and_keeps_going() {
  let app = app().await;
  let out = run_shell(&app, "items\nfrobnicate\nregister bob pw\nlogin bob nope\nwhoami\n").await;

  assert!(out.contains("error: not logged in"), "{out}");
  assert!(out.contains("registered bob"), "{out}");
  assert!(out.contains("error: invalid username or password"), "{out}");
  assert_eq!(out.lines().last(), Some("Guest"));
}
