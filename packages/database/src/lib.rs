#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Database access for crash and project component records.
//!
//! Crash records and project components live in two separate `PostgreSQL`
//! databases. Each is read with one fixed query through `switchy_database`.
//! [`source::RecordSource`] abstracts where the rows come from so the
//! statistics pipeline can be driven by something other than live
//! databases.

pub mod db;
pub mod queries;
pub mod source;

/// Errors that can occur during database operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Database query error.
    #[error("Database error: {0}")]
    Database(#[from] switchy_database::DatabaseError),

    /// Could not open a connection.
    #[error("Connection error: {message}")]
    Connection {
        /// Description of what went wrong.
        message: String,
    },

    /// Data conversion error.
    #[error("Data conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}
