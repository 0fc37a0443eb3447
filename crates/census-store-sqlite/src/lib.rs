//! SQLite backend for the Census citizen registry.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime.

mod cancel;
mod encode;
mod functions;
mod query;
mod schema;
mod statistics;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use schema::BootstrapReport;
pub use store::SqliteStore;
