// SQLite schema for a local copy of the quote table.
//
// The production table lives in PostgreSQL and is owned upstream; this
// mirrors the columns the extraction query reads so a local database (or an
// in-memory one in tests) behaves the same way.

use anyhow::{Context, Result};
use rusqlite::{params, Connection};

use super::models::{format_timestamp, QuoteTweet};
use super::query::validate_table_name;

/// Create the quote table and its index if they don't exist yet.
///
/// Idempotent; safe to call on every startup.
pub fn create_tables(conn: &Connection, table: &str) -> Result<()> {
    validate_table_name(table)?;
    if table.contains('.') {
        anyhow::bail!("SQLite quote tables can't be schema-qualified: {table}");
    }

    conn.execute_batch(&format!(
        "
        CREATE TABLE IF NOT EXISTS {table} (
            id TEXT PRIMARY KEY,
            tweet TEXT NOT NULL,                       -- quote text || ' QT ' || original text
            created_at TEXT NOT NULL,                  -- YYYY-MM-DD HH:MM:SS
            user_id TEXT NOT NULL,                     -- quoting account
            quoted_status_user_id TEXT,                -- quoted account
            user_screen_name TEXT NOT NULL,
            quoted_status_user_screen_name TEXT,
            user_followers_count INTEGER NOT NULL DEFAULT 0,
            quoted_status_user_followers_count INTEGER NOT NULL DEFAULT 0,
            quoting_cluster INTEGER,
            quoted_cluster INTEGER                     -- null unless the quoted account is an influencer
        );

        CREATE INDEX IF NOT EXISTS idx_{table}_created_at ON {table}(created_at);
        "
    ))
    .with_context(|| format!("Failed to create quote table {table}"))?;

    Ok(())
}

/// Insert one quote row with the follower counts the query filters on.
pub fn insert_quote_tweet(
    conn: &Connection,
    table: &str,
    tweet: &QuoteTweet,
    user_followers: i64,
    quoted_user_followers: i64,
) -> Result<()> {
    validate_table_name(table)?;
    conn.execute(
        &format!(
            "INSERT INTO {table}
                (id, tweet, created_at, user_id, quoted_status_user_id,
                 user_screen_name, quoted_status_user_screen_name,
                 user_followers_count, quoted_status_user_followers_count,
                 quoting_cluster, quoted_cluster)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
        ),
        params![
            tweet.id,
            tweet.tweet,
            format_timestamp(&tweet.created_at),
            tweet.user_id,
            tweet.quoted_status_user_id,
            tweet.user_screen_name,
            tweet.quoted_status_user_screen_name,
            user_followers,
            quoted_user_followers,
            tweet.quoting_cluster,
            tweet.quoted_cluster,
        ],
    )
    .with_context(|| format!("Failed to insert tweet {} into {table}", tweet.id))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_tables_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn, "influencer_quote_tweets").unwrap();
        create_tables(&conn, "influencer_quote_tweets").unwrap();
        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 1);
    }

    #[test]
    fn test_create_tables_rejects_qualified_names() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(create_tables(&conn, "public.quotes").is_err());
    }
}
