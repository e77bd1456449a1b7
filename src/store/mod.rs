//!
//! # Persistence Layer
//!
//! All SQL lives here. Handlers and the auth gate receive a `PgPool` handle
//! and call these functions; nothing else in the crate touches the database
//! directly. Queries are runtime-checked with bound parameters throughout.

pub mod tasks;
pub mod users;
