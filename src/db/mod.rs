// Database layer: read access to the influencer quote table.
//
// SQLite (rusqlite, bundled) is the default backend and is what the tests
// run against. PostgreSQL (sqlx) is behind the `postgres` feature and is what
// the shared research database speaks. Callers only see `Arc<dyn QuoteStore>`.

pub mod models;
pub mod query;
pub mod traits;

#[cfg(feature = "sqlite")]
pub mod queries;
#[cfg(feature = "sqlite")]
pub mod schema;
#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use traits::QuoteStore;

#[cfg(feature = "sqlite")]
use anyhow::Context;
use anyhow::Result;
use std::sync::Arc;

/// Open (or create) a SQLite database and make sure the quote table exists.
///
/// This is what `quotecoder init` calls; it's handy for working on a local
/// copy of the quote table.
#[cfg(feature = "sqlite")]
pub fn initialize_sqlite(db_path: &str, table: &str) -> Result<Arc<dyn QuoteStore>> {
    // Create parent directories if needed
    if let Some(parent) = std::path::Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory for database: {db_path}"))?;
        }
    }

    let conn = rusqlite::Connection::open(db_path)
        .with_context(|| format!("Failed to open database at {db_path}"))?;
    conn.pragma_update(None, "journal_mode", "WAL")?;
    schema::create_tables(&conn, table)?;

    Ok(Arc::new(sqlite::SqliteDatabase::new(conn)))
}

/// Open an existing SQLite database (fails if it doesn't exist yet).
#[cfg(feature = "sqlite")]
pub fn open_sqlite(db_path: &str) -> Result<Arc<dyn QuoteStore>> {
    if !std::path::Path::new(db_path).exists() {
        anyhow::bail!(
            "Database not found at {db_path}. Run `quotecoder init` first, \
             or set DATABASE_URL / QUOTECODER_DB_CONFIG for PostgreSQL."
        );
    }

    let conn = rusqlite::Connection::open(db_path)
        .with_context(|| format!("Failed to open database at {db_path}"))?;

    Ok(Arc::new(sqlite::SqliteDatabase::new(conn)))
}

/// Connect to the PostgreSQL quote database.
#[cfg(feature = "postgres")]
pub async fn connect_postgres(database_url: &str) -> Result<Arc<dyn QuoteStore>> {
    let db = postgres::PgDatabase::connect(database_url).await?;
    Ok(Arc::new(db))
}
