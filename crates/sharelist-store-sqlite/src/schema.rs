//! SQL schema for the shopping-list SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    username      TEXT NOT NULL UNIQUE,      -- case-sensitive
    password_hash TEXT NOT NULL,             -- argon2 PHC string
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS shopping_lists (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    owner_id    INTEGER NOT NULL REFERENCES users(id),
    share_code  TEXT NOT NULL UNIQUE,        -- always stored uppercase
    created_at  TEXT NOT NULL
);

-- The authority on who may see and act on a list.
CREATE TABLE IF NOT EXISTS list_members (
    list_id    INTEGER NOT NULL REFERENCES shopping_lists(id),
    user_id    INTEGER NOT NULL REFERENCES users(id),
    joined_at  TEXT NOT NULL,
    PRIMARY KEY (list_id, user_id)
);

-- bought_by and bought_at are either both NULL (active) or both set.
CREATE TABLE IF NOT EXISTS shopping_items (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    list_id       INTEGER NOT NULL REFERENCES shopping_lists(id),
    product_name  TEXT NOT NULL,
    category      TEXT NOT NULL DEFAULT 'Other',
    sort_order    INTEGER NOT NULL,
    created_by    INTEGER NOT NULL REFERENCES users(id),
    bought_by     INTEGER REFERENCES users(id),
    created_at    TEXT NOT NULL,
    bought_at     TEXT,
    CHECK ((bought_by IS NULL) = (bought_at IS NULL))
);

-- Append-only. Rows are only removed together with their list.
CREATE TABLE IF NOT EXISTS purchase_history (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    list_id       INTEGER NOT NULL REFERENCES shopping_lists(id),
    product_name  TEXT NOT NULL,
    category      TEXT NOT NULL DEFAULT 'Other',
    bought_by     INTEGER REFERENCES users(id),
    bought_at     TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS items_list_order_idx   ON shopping_items(list_id, sort_order);
CREATE INDEX IF NOT EXISTS history_list_time_idx  ON purchase_history(list_id, bought_at);
CREATE INDEX IF NOT EXISTS members_user_idx       ON list_members(user_id);

PRAGMA user_version = 1;
";
