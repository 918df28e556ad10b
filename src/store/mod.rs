//! Persistence layer — libSQL-backed storage for the form state tree.

pub mod libsql_backend;
pub mod migrations;
pub mod traits;

pub use libsql_backend::LibSqlStorage;
pub use traits::StateStorage;
