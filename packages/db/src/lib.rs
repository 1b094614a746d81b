//! SurrealDB integration for the job board.
//!
//! This crate provides the owned database handle, the schema and the
//! repositories for companies, students, jobs and revoked tokens.
//!
//! # Features
//!
//! - `memory` (default): Use in-memory storage for testing
//! - `rocksdb`: Use RocksDB for persistent file-based storage

mod connection;
mod schema;
pub mod repositories;

pub use connection::{Client, DEFAULT_QUERY_TIMEOUT, Database, DbConfig, DbError};
pub use schema::init_schema;

/// Open the database with the given configuration and apply the schema.
///
/// This should be called once at application startup.
pub async fn init(config: &DbConfig) -> Result<Database, DbError> {
    let db = Database::connect(config).await?;
    init_schema(&db).await?;
    Ok(db)
}
