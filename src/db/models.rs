// Data models: Rust structs that map to quote-table rows.
//
// These are the types that flow through the application. They're separate
// from the database queries so the sampling, worksheet and topic code can use
// them without depending on rusqlite or sqlx.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Literal separator between the quoting text and the quoted text in `tweet`.
pub const QT_SEPARATOR: &str = " QT ";

/// Timestamp layout used in every CSV this crate writes.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Column order of the full-data CSV (matches the query's SELECT list).
pub const FULL_DATA_HEADER: [&str; 9] = [
    "id",
    "tweet",
    "created_at",
    "user_id",
    "quoted_status_user_id",
    "user_screen_name",
    "quoted_status_user_screen_name",
    "quoting_cluster",
    "quoted_cluster",
];

/// One observed quote-tweet event.
///
/// Ids are kept as strings: they only ever end up in URLs and CSV cells, and
/// the upstream table is free to store them as text or bigint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteTweet {
    pub id: String,
    /// Quote text and original text joined by [`QT_SEPARATOR`].
    pub tweet: String,
    #[serde(with = "timestamp")]
    pub created_at: NaiveDateTime,
    pub user_id: String,
    pub quoted_status_user_id: String,
    pub user_screen_name: String,
    pub quoted_status_user_screen_name: String,
    pub quoting_cluster: i32,
    pub quoted_cluster: i32,
}

impl QuoteTweet {
    /// Quoting and quoted accounts sit in different clusters.
    pub fn is_cross_cluster(&self) -> bool {
        self.quoting_cluster != self.quoted_cluster
    }

    /// Split `tweet` into (quote, original).
    ///
    /// Exactly one separator must be present; anything else means the row
    /// was assembled upstream in a way we can't attribute reliably.
    pub fn split_text(&self) -> Result<(&str, &str)> {
        let mut parts = self.tweet.split(QT_SEPARATOR);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(quote), Some(original), None) => Ok((quote, original)),
            _ => anyhow::bail!(
                "Tweet {} does not contain exactly one {:?} separator",
                self.id,
                QT_SEPARATOR
            ),
        }
    }
}

/// Spam clusters. They carry no label, so a worksheet can only be built from
/// a query that excludes them.
pub const SPAM_CLUSTERS: [i32; 2] = [1, 4];

/// The political-leaning clusters that appear in coding worksheets.
///
/// Codes 1 and 4 are spam clusters and are filtered out by the query, so
/// they have no label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cluster {
    LeanTrump,
    LeanSocialist,
    LeanBiden,
}

impl Cluster {
    pub const ALL: [Cluster; 3] = [Cluster::LeanTrump, Cluster::LeanSocialist, Cluster::LeanBiden];

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Cluster::LeanTrump),
            2 => Some(Cluster::LeanSocialist),
            3 => Some(Cluster::LeanBiden),
            _ => None,
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            Cluster::LeanTrump => 0,
            Cluster::LeanSocialist => 2,
            Cluster::LeanBiden => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Cluster::LeanTrump => "Lean-Trump",
            Cluster::LeanSocialist => "Lean-Socialist",
            Cluster::LeanBiden => "Lean-Biden",
        }
    }
}

impl std::fmt::Display for Cluster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Look up the readable label for a cluster code, failing on unknown codes.
pub fn cluster_label(code: i32) -> Result<&'static str> {
    Cluster::from_code(code)
        .map(|c| c.as_str())
        .with_context(|| format!("No label for cluster code {code}"))
}

/// Aggregate view of the quote table, shown by `quotecoder status`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TableSummary {
    pub table: String,
    pub rows: i64,
    pub earliest: Option<String>,
    pub latest: Option<String>,
    /// (quoting_cluster code, row count), ascending by code
    pub clusters: Vec<(i32, i64)>,
}

/// Parse the timestamp shapes we see from SQLite, Postgres `to_char` and
/// pandas-written CSVs. Offset-bearing values are normalized to UTC.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    let trimmed = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.naive_utc());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"] {
        if let Ok(dt) = DateTime::parse_from_str(trimmed, fmt) {
            return Ok(dt.naive_utc());
        }
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(ts);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .with_context(|| format!("Invalid midnight for {date}"));
    }

    anyhow::bail!("Unrecognized timestamp: {raw:?}")
}

/// Format a timestamp the way every output file renders it.
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// serde adapter so CSV cells use [`TIMESTAMP_FORMAT`] instead of ISO-8601.
pub mod timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        ts: &NaiveDateTime,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_timestamp(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }
}
