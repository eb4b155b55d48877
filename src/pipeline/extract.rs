// Extraction pipeline: quote table -> full-data CSV -> stratified sample ->
// coding worksheet CSV.
//
// The full result is written before sampling so a failed draw (too few rows
// in one pool) still leaves the raw data on disk for `quotecoder resample`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rand::Rng;
use tracing::info;

use crate::db::models::QuoteTweet;
use crate::db::query::QuoteQuery;
use crate::db::QuoteStore;
use crate::output::files;
use crate::sampling::{self, SamplePlan};
use crate::worksheet::{self, CodingRow};

/// Rows kept on the report for the terminal preview.
const PREVIEW_ROWS: usize = 5;

/// Sample size and split for one worksheet.
#[derive(Debug, Clone, Copy)]
pub struct SampleParams {
    pub sample_num: usize,
    pub cross_ratio: f64,
}

/// Everything one `quotecoder extract` run needs.
#[derive(Debug, Clone)]
pub struct ExtractParams {
    pub query: QuoteQuery,
    pub sample: SampleParams,
    pub full_data_file: PathBuf,
    pub sample_data_file: PathBuf,
}

/// What an extraction or resample run produced.
#[derive(Debug, Clone)]
pub struct ExtractionReport {
    /// Rows in the full-data file
    pub full_rows: usize,
    pub cross_available: usize,
    pub same_available: usize,
    pub cross_sampled: usize,
    pub same_sampled: usize,
    pub full_data_file: PathBuf,
    pub sample_data_file: PathBuf,
    /// First few worksheet rows, for display
    pub preview: Vec<CodingRow>,
}

impl ExtractionReport {
    pub fn sampled(&self) -> usize {
        self.cross_sampled + self.same_sampled
    }
}

/// Run the query, save the full result, then sample and save the worksheet.
pub async fn create_coding_files<R: Rng + ?Sized>(
    store: &dyn QuoteStore,
    params: &ExtractParams,
    rng: &mut R,
) -> Result<ExtractionReport> {
    let plan = SamplePlan::new(params.sample.sample_num, params.sample.cross_ratio)?;
    params.query.validate()?;
    worksheet::ensure_labelable(&params.query.excluded_clusters)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("  {spinner} {msg} ({elapsed})")?);
    spinner.set_message(format!("Querying {} ({})", params.query.table, store.backend()));
    spinner.enable_steady_tick(Duration::from_millis(120));

    let fetched = store.fetch_quote_tweets(&params.query).await;
    spinner.finish_and_clear();
    let tweets = fetched.with_context(|| format!("Quote query on {} failed", params.query.table))?;

    info!(rows = tweets.len(), "Query finished");

    let full_rows = files::write_full_data(&params.full_data_file, &tweets)?;
    info!(
        rows = full_rows,
        path = %params.full_data_file.display(),
        "Wrote full data"
    );

    sample_to_worksheet(
        &tweets,
        &plan,
        &params.full_data_file,
        &params.sample_data_file,
        rng,
    )
}

/// Draw a fresh worksheet from a previously written full-data CSV.
pub fn resample_from_csv<R: Rng + ?Sized>(
    full_data_file: &Path,
    sample: &SampleParams,
    sample_data_file: &Path,
    rng: &mut R,
) -> Result<ExtractionReport> {
    let plan = SamplePlan::new(sample.sample_num, sample.cross_ratio)?;
    let tweets = files::read_full_data(full_data_file)?;
    info!(
        rows = tweets.len(),
        path = %full_data_file.display(),
        "Loaded full data"
    );
    sample_to_worksheet(&tweets, &plan, full_data_file, sample_data_file, rng)
}

fn sample_to_worksheet<R: Rng + ?Sized>(
    tweets: &[QuoteTweet],
    plan: &SamplePlan,
    full_data_file: &Path,
    sample_data_file: &Path,
    rng: &mut R,
) -> Result<ExtractionReport> {
    let sample = sampling::stratified_sample(tweets, plan, rng)?;

    let rows = worksheet::build_worksheet(&sample.rows)?;

    files::write_worksheet(sample_data_file, &rows)?;
    info!(
        rows = rows.len(),
        path = %sample_data_file.display(),
        "Wrote coding worksheet"
    );

    Ok(ExtractionReport {
        full_rows: tweets.len(),
        cross_available: sample.cross_available,
        same_available: sample.same_available,
        cross_sampled: sample.cross_drawn,
        same_sampled: sample.same_drawn,
        full_data_file: full_data_file.to_path_buf(),
        sample_data_file: sample_data_file.to_path_buf(),
        preview: rows.into_iter().take(PREVIEW_ROWS).collect(),
    })
}
