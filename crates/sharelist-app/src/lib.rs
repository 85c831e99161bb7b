//! Application logic for shared shopping lists.
//!
//! [`App`] is the command/query façade a UI layer calls into. It owns no
//! state besides its store handle: the signed-in user and the selected list
//! live in a caller-owned [`Session`] passed to every call. The `sharelist`
//! binary drives it through a line-oriented [`shell`].

mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod session;
pub mod shell;

pub use app::App;
pub use config::AppConfig;
pub use error::{AppError, Result};
pub use session::{CurrentUser, Session, SessionUser};

#[cfg(test)]
mod tests;
