//! Database module
//!
//! This module provides database connection management,
//! schema indexing, and query execution capabilities.

pub mod connection;
pub mod indexer;
pub mod manager;
pub mod render;
pub mod schema;

// Re-exports
pub use connection::{DatabaseBackend, DatabasePool};
pub use manager::DatabaseManager;
pub use schema::{Column, ForeignKeyReference, SchemaIndex, Table};
