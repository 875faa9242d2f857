//! # pointboard-store
//!
//! SQLite persistence for the leaderboard: the user table and the
//! append-only points history log.  The crate exposes a synchronous
//! [`Database`] handle that wraps a `rusqlite::Connection` and provides
//! typed helpers for every operation the service layer needs.
//!
//! All mutation goes through the service contracts; nothing else writes to
//! these tables.

pub mod database;
pub mod history;
pub mod migrations;
pub mod users;

mod error;

pub use database::Database;
pub use error::StoreError;
