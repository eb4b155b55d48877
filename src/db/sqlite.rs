// SqliteDatabase: rusqlite backend implementing the QuoteStore trait.
//
// The Connection is wrapped in tokio::sync::Mutex because Connection is !Sync.
// Trait methods lock the mutex, do synchronous rusqlite work, and return.
// The lock is never held across .await points.

use anyhow::Result;
use async_trait::async_trait;
use rusqlite::Connection;
use tokio::sync::Mutex;
use tracing::info;

use super::models::{QuoteTweet, TableSummary};
use super::query::{Dialect, QuoteQuery};
use super::traits::QuoteStore;

pub struct SqliteDatabase {
    conn: Mutex<Connection>,
}

impl SqliteDatabase {
    /// Wrap an already-opened rusqlite Connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

#[async_trait]
impl QuoteStore for SqliteDatabase {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    async fn fetch_quote_tweets(&self, query: &QuoteQuery) -> Result<Vec<QuoteTweet>> {
        let composed = query.compose(Dialect::Sqlite)?;
        info!(sql = %composed.sql, params = composed.params.len(), "Running quote query");
        let conn = self.conn.lock().await;
        super::queries::fetch_quote_tweets(&conn, &composed)
    }

    async fn table_summary(&self, table: &str) -> Result<TableSummary> {
        let conn = self.conn.lock().await;
        super::queries::table_summary(&conn, table)
    }
}
