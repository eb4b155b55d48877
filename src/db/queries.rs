// SQLite queries: every rusqlite interaction goes through this module.
//
// The free functions take a Connection so they can be exercised directly,
// and SqliteDatabase wraps them behind the QuoteStore trait.

use anyhow::{Context, Result};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};

use super::models::{parse_timestamp, QuoteTweet, TableSummary};
use super::query::{validate_table_name, ComposedQuery, SqlParam};

/// Columns as rusqlite hands them back, before timestamp parsing.
struct RawQuoteRow {
    id: String,
    tweet: Option<String>,
    created_at: String,
    user_id: String,
    quoted_status_user_id: String,
    user_screen_name: Option<String>,
    quoted_status_user_screen_name: Option<String>,
    quoting_cluster: i32,
    quoted_cluster: i32,
}

impl RawQuoteRow {
    fn into_quote_tweet(self) -> Result<QuoteTweet> {
        let created_at = parse_timestamp(&self.created_at)
            .with_context(|| format!("Bad created_at on tweet {}", self.id))?;
        Ok(QuoteTweet {
            id: self.id,
            tweet: self.tweet.unwrap_or_default(),
            created_at,
            user_id: self.user_id,
            quoted_status_user_id: self.quoted_status_user_id,
            user_screen_name: self.user_screen_name.unwrap_or_default(),
            quoted_status_user_screen_name: self.quoted_status_user_screen_name.unwrap_or_default(),
            quoting_cluster: self.quoting_cluster,
            quoted_cluster: self.quoted_cluster,
        })
    }
}

/// Execute a composed quote query (SQLite dialect).
pub fn fetch_quote_tweets(conn: &Connection, composed: &ComposedQuery) -> Result<Vec<QuoteTweet>> {
    let values: Vec<Value> = composed
        .params
        .iter()
        .map(|p| match p {
            SqlParam::Text(s) => Value::Text(s.clone()),
            SqlParam::Int(i) => Value::Integer(*i),
        })
        .collect();

    let mut stmt = conn
        .prepare(&composed.sql)
        .context("Failed to prepare quote query")?;
    let rows = stmt.query_map(params_from_iter(values.iter()), |row| {
        Ok(RawQuoteRow {
            id: row.get(0)?,
            tweet: row.get(1)?,
            created_at: row.get(2)?,
            user_id: row.get(3)?,
            quoted_status_user_id: row.get(4)?,
            user_screen_name: row.get(5)?,
            quoted_status_user_screen_name: row.get(6)?,
            quoting_cluster: row.get(7)?,
            quoted_cluster: row.get(8)?,
        })
    })?;

    let mut tweets = Vec::new();
    for row in rows {
        tweets.push(row?.into_quote_tweet()?);
    }
    Ok(tweets)
}

/// Summarize a quote table for `quotecoder status`.
pub fn table_summary(conn: &Connection, table: &str) -> Result<TableSummary> {
    validate_table_name(table)?;

    let (rows, earliest, latest) = conn
        .query_row(
            &format!("SELECT COUNT(*), MIN(created_at), MAX(created_at) FROM {table}"),
            [],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, Option<String>>(2)?,
                ))
            },
        )
        .with_context(|| format!("Failed to summarize {table}"))?;

    let mut stmt = conn.prepare(&format!(
        "SELECT quoting_cluster, COUNT(*) FROM {table}
         WHERE quoting_cluster IS NOT NULL
         GROUP BY quoting_cluster
         ORDER BY quoting_cluster"
    ))?;
    let clusters = stmt
        .query_map([], |row| Ok((row.get::<_, i32>(0)?, row.get::<_, i64>(1)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(TableSummary {
        table: table.to_string(),
        rows,
        earliest,
        latest,
        clusters,
    })
}
