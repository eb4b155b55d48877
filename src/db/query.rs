// Quote query composition.
//
// Builds the filtered SELECT against the influencer quote table. Every value
// is a bound parameter; the table name is the only spliced fragment and it
// must pass identifier validation first. Both backends share this builder so
// the filter semantics can't drift between SQLite and PostgreSQL.

use anyhow::Result;
use chrono::NaiveDateTime;

use super::models::{format_timestamp, SPAM_CLUSTERS};

pub const DEFAULT_TABLE: &str = "influencer_quote_tweets";

/// Both the quoting and the quoted account need at least this many followers.
pub const DEFAULT_FOLLOWER_LIMIT: i64 = 200_000;

/// Spam clusters.
pub const DEFAULT_EXCLUDED_CLUSTERS: [i32; 2] = SPAM_CLUSTERS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Sqlite,
    Postgres,
}

impl Dialect {
    fn placeholder(self, n: usize) -> String {
        match self {
            Dialect::Sqlite => format!("?{n}"),
            Dialect::Postgres => format!("${n}"),
        }
    }

    fn timestamp_placeholder(self, n: usize) -> String {
        match self {
            Dialect::Sqlite => self.placeholder(n),
            Dialect::Postgres => format!("${n}::timestamp"),
        }
    }

    fn select_list(self) -> &'static str {
        match self {
            Dialect::Sqlite => {
                "CAST(id AS TEXT) AS id, tweet, created_at,
       CAST(user_id AS TEXT) AS user_id,
       CAST(quoted_status_user_id AS TEXT) AS quoted_status_user_id,
       user_screen_name, quoted_status_user_screen_name,
       quoting_cluster, quoted_cluster"
            }
            Dialect::Postgres => {
                "id::text AS id, tweet,
       to_char(created_at, 'YYYY-MM-DD HH24:MI:SS') AS created_at,
       user_id::text AS user_id,
       quoted_status_user_id::text AS quoted_status_user_id,
       user_screen_name, quoted_status_user_screen_name,
       quoting_cluster::integer AS quoting_cluster,
       quoted_cluster::integer AS quoted_cluster"
            }
        }
    }
}

/// A value bound to a composed query, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Int(i64),
}

/// SQL text plus its positional parameters.
#[derive(Debug, Clone)]
pub struct ComposedQuery {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

/// Filters for one extraction run.
#[derive(Debug, Clone)]
pub struct QuoteQuery {
    pub table: String,
    /// Inclusive lower bound on `created_at`.
    pub start: NaiveDateTime,
    /// Exclusive upper bound on `created_at`.
    pub end: NaiveDateTime,
    pub follower_limit: i64,
    pub excluded_clusters: Vec<i32>,
}

impl QuoteQuery {
    pub fn new(table: impl Into<String>, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            table: table.into(),
            start,
            end,
            follower_limit: DEFAULT_FOLLOWER_LIMIT,
            excluded_clusters: DEFAULT_EXCLUDED_CLUSTERS.to_vec(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_table_name(&self.table)?;
        if self.start >= self.end {
            anyhow::bail!(
                "Empty date range: start {} is not before end {}",
                format_timestamp(&self.start),
                format_timestamp(&self.end)
            );
        }
        if self.follower_limit < 0 {
            anyhow::bail!("Follower limit must be non-negative, got {}", self.follower_limit);
        }
        Ok(())
    }

    /// Render the query for the given backend.
    pub fn compose(&self, dialect: Dialect) -> Result<ComposedQuery> {
        self.validate()?;

        let mut params = Vec::new();
        let mut bind = |param: SqlParam| {
            params.push(param);
            params.len()
        };

        let start = dialect.timestamp_placeholder(bind(SqlParam::Text(format_timestamp(&self.start))));
        let end = dialect.timestamp_placeholder(bind(SqlParam::Text(format_timestamp(&self.end))));
        let followers = dialect.placeholder(bind(SqlParam::Int(self.follower_limit)));

        let mut conditions = vec![
            format!("created_at >= {start}"),
            format!("created_at < {end}"),
            // Only quotes between two influencers carry a quoted cluster.
            "quoted_cluster IS NOT NULL".to_string(),
        ];

        if !self.excluded_clusters.is_empty() {
            for column in ["quoting_cluster", "quoted_cluster"] {
                let list: Vec<String> = self
                    .excluded_clusters
                    .iter()
                    .map(|&code| dialect.placeholder(bind(SqlParam::Int(code as i64))))
                    .collect();
                conditions.push(format!("{column} NOT IN ({})", list.join(", ")));
            }
        }

        conditions.push(format!("user_followers_count >= {followers}"));
        conditions.push(format!("quoted_status_user_followers_count >= {followers}"));
        // Self-quotes
        conditions.push("quoted_status_user_id != user_id".to_string());

        // On Postgres these resolve to the text output aliases, which sort the
        // same as the source columns for the fixed-width timestamp format.
        let sql = format!(
            "SELECT {select}\nFROM {table}\nWHERE {conditions}\nORDER BY created_at, id",
            select = dialect.select_list(),
            table = self.table,
            conditions = conditions.join("\n  AND "),
        );

        Ok(ComposedQuery { sql, params })
    }
}

/// Accept `name` or `schema.name`, each part a plain SQL identifier.
pub fn validate_table_name(name: &str) -> Result<()> {
    let parts: Vec<&str> = name.split('.').collect();
    if parts.len() > 2 || !parts.iter().all(|p| is_identifier(p)) {
        anyhow::bail!(
            "Invalid table name {name:?}: expected an identifier like influencer_quote_tweets \
             or schema.table"
        );
    }
    Ok(())
}

fn is_identifier(part: &str) -> bool {
    let mut chars = part.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn query() -> QuoteQuery {
        QuoteQuery::new(DEFAULT_TABLE, day(2021, 4, 10), day(2021, 6, 26))
    }

    #[test]
    fn test_postgres_composition() {
        let composed = query().compose(Dialect::Postgres).unwrap();
        assert!(composed.sql.contains("FROM influencer_quote_tweets"));
        assert!(composed.sql.contains("created_at >= $1::timestamp"));
        assert!(composed.sql.contains("created_at < $2::timestamp"));
        assert!(composed.sql.contains("user_followers_count >= $3"));
        assert!(composed.sql.contains("quoting_cluster NOT IN ($4, $5)"));
        assert!(composed.sql.contains("quoted_cluster NOT IN ($6, $7)"));
        assert!(composed.sql.contains("quoted_status_user_id != user_id"));
        assert_eq!(
            composed.params,
            vec![
                SqlParam::Text("2021-04-10 00:00:00".to_string()),
                SqlParam::Text("2021-06-26 00:00:00".to_string()),
                SqlParam::Int(200_000),
                SqlParam::Int(1),
                SqlParam::Int(4),
                SqlParam::Int(1),
                SqlParam::Int(4),
            ]
        );
    }

    #[test]
    fn test_sqlite_placeholders() {
        let composed = query().compose(Dialect::Sqlite).unwrap();
        assert!(composed.sql.contains("created_at >= ?1"));
        assert!(composed.sql.contains("quoted_cluster NOT IN (?6, ?7)"));
        assert!(!composed.sql.contains('$'));
    }

    #[test]
    fn test_empty_exclusion_list_drops_clause() {
        let mut q = query();
        q.excluded_clusters.clear();
        let composed = q.compose(Dialect::Sqlite).unwrap();
        assert!(!composed.sql.contains("NOT IN"));
        assert_eq!(composed.params.len(), 3);
    }

    #[test]
    fn test_rejects_bad_table_names() {
        for bad in ["", "1table", "quotes; DROP TABLE x", "a.b.c", "quo-tes", "a."] {
            assert!(validate_table_name(bad).is_err(), "{bad:?} should be rejected");
        }
        for good in ["influencer_quote_tweets", "public.quotes", "_t2"] {
            assert!(validate_table_name(good).is_ok(), "{good:?} should be accepted");
        }
    }

    #[test]
    fn test_rejects_empty_range() {
        let q = QuoteQuery::new(DEFAULT_TABLE, day(2021, 6, 26), day(2021, 6, 26));
        assert!(q.compose(Dialect::Postgres).is_err());
    }
}
