//! Repository layer for database persistence.
//!
//! All database access uses Diesel ORM with compile-time query checking
//! against a SQLite backend.

pub mod clients;
pub mod context;
pub mod documents;
pub mod models;
pub mod page;
pub mod pool;
pub mod priorities;
pub mod util;

pub use clients::ClientRepository;
pub use context::DbContext;
pub use documents::{DocumentRepository, InsertOutcome};
pub use page::{Page, DEFAULT_PER_PAGE};
pub use pool::{DbError, SqlitePool};
pub use priorities::{PriorityFilter, PriorityRepository};
