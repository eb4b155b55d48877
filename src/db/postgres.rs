// PgDatabase: PostgreSQL backend implementing the QuoteStore trait.
//
// Uses sqlx PgPool for native async queries. All queries use runtime
// parameter binding (not compile-time macros) to avoid requiring
// DATABASE_URL at compile time.
//
// The quote table is owned upstream, so unlike the SQLite backend nothing
// here creates or migrates tables. Timestamps come back through `to_char` and
// ids through `::text` so the row shape matches SQLite exactly.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx_core::pool::Pool;
use sqlx_core::row::Row;
use sqlx_postgres::Postgres;
use tracing::info;

use super::models::{parse_timestamp, QuoteTweet, TableSummary};
use super::query::{validate_table_name, Dialect, QuoteQuery, SqlParam};
use super::traits::QuoteStore;

/// Type alias for the PostgreSQL connection pool.
pub type PgPool = Pool<Postgres>;

pub struct PgDatabase {
    pool: PgPool,
}

impl PgDatabase {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url)
            .await
            .with_context(|| {
                format!(
                    "Failed to connect to PostgreSQL at {}",
                    crate::config::redact_url(database_url)
                )
            })?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl QuoteStore for PgDatabase {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn fetch_quote_tweets(&self, query: &QuoteQuery) -> Result<Vec<QuoteTweet>> {
        let composed = query.compose(Dialect::Postgres)?;
        info!(sql = %composed.sql, params = composed.params.len(), "Running quote query");

        let mut q = sqlx_core::query::query::<Postgres>(&composed.sql);
        for param in &composed.params {
            q = match param {
                SqlParam::Text(s) => q.bind(s.clone()),
                SqlParam::Int(i) => q.bind(*i),
            };
        }
        let rows = q
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("Quote query against {} failed", query.table))?;

        let mut tweets = Vec::with_capacity(rows.len());
        for row in rows {
            let id: String = row.try_get(0)?;
            let created_at: String = row.try_get(2)?;
            let created_at = parse_timestamp(&created_at)
                .with_context(|| format!("Bad created_at on tweet {id}"))?;
            tweets.push(QuoteTweet {
                tweet: row.try_get::<Option<String>, _>(1)?.unwrap_or_default(),
                created_at,
                user_id: row.try_get(3)?,
                quoted_status_user_id: row.try_get(4)?,
                user_screen_name: row.try_get::<Option<String>, _>(5)?.unwrap_or_default(),
                quoted_status_user_screen_name: row
                    .try_get::<Option<String>, _>(6)?
                    .unwrap_or_default(),
                quoting_cluster: row.try_get(7)?,
                quoted_cluster: row.try_get(8)?,
                id,
            });
        }
        Ok(tweets)
    }

    async fn table_summary(&self, table: &str) -> Result<TableSummary> {
        validate_table_name(table)?;

        let row = sqlx_core::query::query::<Postgres>(&format!(
            "SELECT COUNT(*)::bigint,
                    to_char(MIN(created_at), 'YYYY-MM-DD HH24:MI:SS'),
                    to_char(MAX(created_at), 'YYYY-MM-DD HH24:MI:SS')
             FROM {table}"
        ))
        .fetch_one(&self.pool)
        .await
        .with_context(|| format!("Failed to summarize {table}"))?;

        let cluster_rows = sqlx_core::query::query::<Postgres>(&format!(
            "SELECT quoting_cluster::integer, COUNT(*)::bigint FROM {table}
             WHERE quoting_cluster IS NOT NULL
             GROUP BY quoting_cluster
             ORDER BY quoting_cluster"
        ))
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("Failed to count clusters in {table}"))?;

        let mut clusters = Vec::with_capacity(cluster_rows.len());
        for r in &cluster_rows {
            clusters.push((r.try_get::<i32, _>(0)?, r.try_get::<i64, _>(1)?));
        }

        Ok(TableSummary {
            table: table.to_string(),
            rows: row.try_get(0)?,
            earliest: row.try_get(1)?,
            latest: row.try_get(2)?,
            clusters,
        })
    }
}
