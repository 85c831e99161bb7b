//! Users: the actors who own, join and mutate lists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::UserId;

/// A registered account. Created once at registration and never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id:         UserId,
  /// Unique and case-sensitive.
  pub username:   String,
  pub created_at: DateTime<Utc>,
}

/// A user together with the stored password hash. Only the identity layer
/// ever sees this type.
#[derive(Debug, Clone)]
pub struct Credentials {
  pub user:          User,
  /// PHC string, e.g. `$argon2id$v=19$…`.
  pub password_hash: String,
}

/// Input to [`crate::store::ListStore::create_user`].
#[derive(Debug, Clone)]
pub struct NewUser {
  pub username:      String,
  pub password_hash: String,
}
