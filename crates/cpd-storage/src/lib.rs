//! # cpd-storage
//!
//! SQLite persistence for the cost-per-day tracker: a serialized
//! writer connection with WAL pragmas, versioned migrations, CRUD
//! query modules for assets/subscriptions/settings, and JSON backup.

pub mod backup;
pub mod connection;
pub mod migrations;
pub mod queries;

pub use connection::Database;

use cpd_core::errors::{CpdError, StorageError};

/// Wrap a SQLite error message into the workspace error type.
pub(crate) fn to_storage_err(message: impl Into<String>) -> CpdError {
    CpdError::StorageError(StorageError::SqliteError {
        message: message.into(),
    })
}
