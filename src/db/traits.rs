// QuoteStore trait: backend-agnostic async interface to the quote table.
//
// Implementors: SqliteDatabase (wraps rusqlite), PgDatabase (wraps sqlx).
// All methods are async so both sync (rusqlite via Mutex) and native async
// (sqlx) backends fit behind a single interface.

use anyhow::Result;
use async_trait::async_trait;

use super::models::{QuoteTweet, TableSummary};
use super::query::QuoteQuery;

#[async_trait]
pub trait QuoteStore: Send + Sync {
    /// Short backend name for log lines and status output.
    fn backend(&self) -> &'static str;

    /// Run the filtered quote query and return every matching row,
    /// ordered by `created_at`.
    async fn fetch_quote_tweets(&self, query: &QuoteQuery) -> Result<Vec<QuoteTweet>>;

    /// Row count, date span and per-cluster counts for a quote table.
    async fn table_summary(&self, table: &str) -> Result<TableSummary>;
}
