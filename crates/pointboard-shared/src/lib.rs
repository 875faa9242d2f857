//! # pointboard-shared
//!
//! Domain types and pure logic shared by the store and server crates:
//! the user / history models, name validation, the ranking engine, and the
//! broadcast protocol payloads.

pub mod name;
pub mod protocol;
pub mod ranking;
pub mod types;

pub use types::*;
