//! Core types and trait definitions for the shared shopping-list store.
//!
//! This crate is deliberately free of database and runtime dependencies.
//! Every other crate depends on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod category;
pub mod error;
pub mod id;
pub mod item;
pub mod list;
pub mod share_code;
pub mod store;
pub mod user;

pub use error::{Error, Result};
