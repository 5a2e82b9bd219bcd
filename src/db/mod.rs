//! Database module: models, schema and storage for persistent state.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows and the column text codec
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `sqlite.rs`: `HotlineStorage`, typed CRUD over the pool

pub mod models;
pub mod schema;
pub mod sqlite;

pub use models::{
    AuditEntry, BlockedNumber, ColumnText, Hotline, HotlineAdmin, HotlineMember, Number,
    NumberFeatures,
};
pub use schema::SQLITE_INIT;
pub use sqlite::{HotlineStorage, SqlitePool};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;

use crate::error::HotlineError;

/// Open (creating if missing) the database at `database_url`, apply the DDL
/// and return the storage handle. Foreign key enforcement is switched on for
/// every pooled connection.
pub async fn connect(database_url: &str) -> Result<HotlineStorage, HotlineError> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new().connect_with(options).await?;
    let storage = HotlineStorage::new(pool);
    storage.init_schema().await?;
    Ok(storage)
}
