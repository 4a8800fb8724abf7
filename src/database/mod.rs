/*!
 * SQLite persistence.
 *
 * - `schema`: table definitions and versioned migrations
 * - `connection`: connection wrapper running queries on the blocking pool
 * - `models`: row types and timestamp encoding
 * - `repository`: async queries plus the store trait implementations
 */

pub mod connection;
pub mod models;
pub mod repository;
pub mod schema;

pub use connection::{DatabaseConnection, DatabaseStats};
pub use repository::Repository;
