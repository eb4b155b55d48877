// Coding worksheet: the sampled quotes reshaped for human annotation.
//
// Each row carries empty Stance / Notes cells for coders to fill in, links to
// the tweet and both profiles, and readable cluster labels in place of codes.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::db::models::{cluster_label, format_timestamp, QuoteTweet, SPAM_CLUSTERS};

/// Coder column value for worksheets shared by the whole team.
pub const COLLABORATIVE_CODER: &str = "Collab.";

pub const CODING_HEADER: [&str; 13] = [
    "Coder",
    "Stance",
    "Notes",
    "URL",
    "Quote",
    "Original",
    "Date",
    "Quote User",
    "Quote User Cluster",
    "Quote User Profile",
    "Original User",
    "Original User Cluster",
    "Original User Profile",
];

/// One worksheet row. Field order matches [`CODING_HEADER`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodingRow {
    #[serde(rename = "Coder")]
    pub coder: String,
    #[serde(rename = "Stance")]
    pub stance: String,
    #[serde(rename = "Notes")]
    pub notes: String,
    #[serde(rename = "URL")]
    pub url: String,
    #[serde(rename = "Quote")]
    pub quote: String,
    #[serde(rename = "Original")]
    pub original: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Quote User")]
    pub quote_user: String,
    #[serde(rename = "Quote User Cluster")]
    pub quote_user_cluster: String,
    #[serde(rename = "Quote User Profile")]
    pub quote_user_profile: String,
    #[serde(rename = "Original User")]
    pub original_user: String,
    #[serde(rename = "Original User Cluster")]
    pub original_user_cluster: String,
    #[serde(rename = "Original User Profile")]
    pub original_user_profile: String,
}

impl CodingRow {
    pub fn from_quote(tweet: &QuoteTweet) -> Result<Self> {
        let (quote, original) = tweet.split_text()?;
        let quote_user_cluster = cluster_label(tweet.quoting_cluster)
            .with_context(|| format!("Quoting user of tweet {}", tweet.id))?;
        let original_user_cluster = cluster_label(tweet.quoted_cluster)
            .with_context(|| format!("Quoted user of tweet {}", tweet.id))?;

        Ok(Self {
            coder: COLLABORATIVE_CODER.to_string(),
            stance: String::new(),
            notes: String::new(),
            url: status_url(&tweet.id),
            quote: quote.to_string(),
            original: original.to_string(),
            date: format_timestamp(&tweet.created_at),
            quote_user: tweet.user_screen_name.clone(),
            quote_user_cluster: quote_user_cluster.to_string(),
            quote_user_profile: profile_url(&tweet.user_id),
            original_user: tweet.quoted_status_user_screen_name.clone(),
            original_user_cluster: original_user_cluster.to_string(),
            original_user_profile: profile_url(&tweet.quoted_status_user_id),
        })
    }
}

/// Fail unless every unlabeled cluster is in `excluded`.
///
/// Checked before querying so an impossible worksheet is rejected before any
/// file is written.
pub fn ensure_labelable(excluded: &[i32]) -> Result<()> {
    let kept: Vec<i32> = SPAM_CLUSTERS
        .iter()
        .copied()
        .filter(|code| !excluded.contains(code))
        .collect();
    if !kept.is_empty() {
        anyhow::bail!(
            "Cluster codes {kept:?} have no worksheet label and must stay excluded \
             (excluded: {excluded:?})"
        );
    }
    Ok(())
}

/// Build worksheet rows in input order, failing on the first bad row.
pub fn build_worksheet(tweets: &[&QuoteTweet]) -> Result<Vec<CodingRow>> {
    tweets.iter().map(|t| CodingRow::from_quote(t)).collect()
}

/// The status path doesn't matter to twitter.com; the id is what resolves.
pub fn status_url(tweet_id: &str) -> String {
    format!("https://twitter.com/test/status/{tweet_id}")
}

pub fn profile_url(user_id: &str) -> String {
    format!("https://twitter.com/intent/user?user_id={user_id}")
}
