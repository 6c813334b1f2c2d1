//! SQLite storage for sales representatives, products, targets and sales.
//!
//! # Intention
//!
//! - Provide one owned connection to a sales database file with small,
//!   auto-committing execution primitives.
//! - Keep SQLite errors intact; callers decide what is fatal.
//!
//! # Architectural Boundaries
//!
//! - Only SQLite/database code belongs here.
//! - No reporting queries, pooling or migrations.

pub mod error;
pub mod sales;
pub mod schema;
pub mod sqlite;

pub use error::{Error, Result};
pub use schema::SALES_SCHEMA;
pub use sqlite::{Cursor, DatabaseInstance, Params, SqliteConfig, Value};
