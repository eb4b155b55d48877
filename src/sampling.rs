// Stratified sampling of quote tweets for human coding.
//
// The full result set is split into cross-cluster quotes (quoting and quoted
// accounts in different clusters) and same-cluster quotes. Each pool is
// sampled without replacement according to the plan's ratio, then the two
// draws are merged and ordered by time so coders read them chronologically.

use anyhow::Result;
use rand::seq::index;
use rand::Rng;
use tracing::info;

use crate::db::models::QuoteTweet;

pub const DEFAULT_SAMPLE_NUM: usize = 500;
pub const DEFAULT_CROSS_RATIO: f64 = 0.5;

/// How many rows to draw, and what share should be cross-cluster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePlan {
    total: usize,
    cross_ratio: f64,
}

impl SamplePlan {
    pub fn new(total: usize, cross_ratio: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&cross_ratio) {
            anyhow::bail!("Cross-cluster ratio must be between 0 and 1, got {cross_ratio}");
        }
        Ok(Self { total, cross_ratio })
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn cross_ratio(&self) -> f64 {
        self.cross_ratio
    }

    /// Truncated, so `cross_count + same_count` can fall one short of `total`.
    pub fn cross_count(&self) -> usize {
        (self.total as f64 * self.cross_ratio) as usize
    }

    pub fn same_count(&self) -> usize {
        (self.total as f64 * (1.0 - self.cross_ratio)) as usize
    }
}

/// The outcome of one stratified draw.
#[derive(Debug, Clone)]
pub struct Sample<'a> {
    /// Sampled rows, ordered by `created_at`
    pub rows: Vec<&'a QuoteTweet>,
    pub cross_available: usize,
    pub same_available: usize,
    pub cross_drawn: usize,
    pub same_drawn: usize,
}

/// Draw a stratified sample without replacement.
///
/// Fails if either pool has fewer rows than the plan asks for.
pub fn stratified_sample<'a, R: Rng + ?Sized>(
    tweets: &'a [QuoteTweet],
    plan: &SamplePlan,
    rng: &mut R,
) -> Result<Sample<'a>> {
    let (cross, same): (Vec<&QuoteTweet>, Vec<&QuoteTweet>) =
        tweets.iter().partition(|t| t.is_cross_cluster());

    let cross_rows = draw(&cross, plan.cross_count(), "cross-cluster", rng)?;
    let same_rows = draw(&same, plan.same_count(), "same-cluster", rng)?;

    let cross_drawn = cross_rows.len();
    let same_drawn = same_rows.len();

    let mut rows = cross_rows;
    rows.extend(same_rows);
    rows.sort_by_key(|t| t.created_at);

    info!(
        cross_available = cross.len(),
        same_available = same.len(),
        cross_drawn,
        same_drawn,
        "Drew stratified sample"
    );

    Ok(Sample {
        rows,
        cross_available: cross.len(),
        same_available: same.len(),
        cross_drawn,
        same_drawn,
    })
}

fn draw<'a, R: Rng + ?Sized>(
    pool: &[&'a QuoteTweet],
    amount: usize,
    pool_name: &str,
    rng: &mut R,
) -> Result<Vec<&'a QuoteTweet>> {
    if amount > pool.len() {
        anyhow::bail!(
            "Cannot sample {amount} {pool_name} quotes: only {} available. \
             Lower --sample-num, adjust --cross-ratio, or widen the date range.",
            pool.len()
        );
    }
    Ok(index::sample(rng, pool.len(), amount)
        .into_iter()
        .map(|i| pool[i])
        .collect())
}
