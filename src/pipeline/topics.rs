// Topic pipeline: full-data CSV -> cleaned tweets -> TF-IDF topics ->
// topics-over-time HTML.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::db::models::timestamp;
use crate::output::{files, html};
use crate::topics::clean::clean_tweet;
use crate::topics::model::TopicModel;
use crate::topics::over_time::{self, TopicsOverTime, DEFAULT_NR_BINS, DEFAULT_TOP_N_TOPICS};
use crate::topics::tfidf::TfIdfExtractor;
use crate::topics::traits::TopicExtractor;

#[derive(Debug, Clone)]
pub struct TopicParams {
    pub nr_bins: usize,
    pub top_n_topics: usize,
    pub max_topics: usize,
    /// Page title; defaults to one derived from the input file name
    pub title: Option<String>,
    /// Also save the fitted model and per-bin counts as JSON here
    pub json_out: Option<PathBuf>,
}

impl Default for TopicParams {
    fn default() -> Self {
        Self {
            nr_bins: DEFAULT_NR_BINS,
            top_n_topics: DEFAULT_TOP_N_TOPICS,
            max_topics: TfIdfExtractor::default().max_topics,
            title: None,
            json_out: None,
        }
    }
}

/// The two columns topic modeling needs; anything else in the CSV is ignored.
#[derive(Debug, Deserialize)]
struct TopicDocument {
    #[serde(default)]
    tweet: String,
    #[serde(with = "timestamp")]
    created_at: NaiveDateTime,
}

/// What `--json-out` writes.
#[derive(Serialize)]
struct TopicSnapshot<'a> {
    model: &'a TopicModel,
    over_time: &'a TopicsOverTime,
}

pub struct TopicReport {
    pub model: TopicModel,
    pub over_time: TopicsOverTime,
    pub output_html: PathBuf,
}

pub fn run(input_csv: &Path, output_html: &Path, params: &TopicParams) -> Result<TopicReport> {
    let rows: Vec<TopicDocument> = files::read_csv(input_csv)?;
    if rows.is_empty() {
        anyhow::bail!("{} has no rows to model", input_csv.display());
    }

    let (documents, timestamps): (Vec<String>, Vec<NaiveDateTime>) = rows
        .into_iter()
        .map(|r| (clean_tweet(&r.tweet), r.created_at))
        .unzip();
    info!(documents = documents.len(), "Cleaned tweet text");

    let extractor = TfIdfExtractor {
        max_topics: params.max_topics,
        ..TfIdfExtractor::default()
    };
    let model = extractor.extract(&documents)?;

    let assignments = model.assign_all(&documents);
    let over_time = over_time::topics_over_time(
        &model,
        &assignments,
        &timestamps,
        params.nr_bins,
        params.top_n_topics,
    )?;
    info!(
        topics = model.topics.len(),
        charted = over_time.series.len(),
        outliers = over_time.outliers,
        "Fitted topics"
    );

    let title = params.title.clone().unwrap_or_else(|| {
        let stem = input_csv
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "tweets".to_string());
        format!("Topics over time: {stem}")
    });
    html::write_topics_html(output_html, &over_time, &title)?;
    info!(path = %output_html.display(), "Wrote topics HTML");

    if let Some(json_path) = &params.json_out {
        let snapshot = TopicSnapshot {
            model: &model,
            over_time: &over_time,
        };
        let json = serde_json::to_string_pretty(&snapshot)?;
        files::ensure_parent_dir(json_path)?;
        std::fs::write(json_path, json)
            .with_context(|| format!("Failed to write {}", json_path.display()))?;
        info!(path = %json_path.display(), "Wrote topic snapshot");
    }

    Ok(TopicReport {
        model,
        over_time,
        output_html: output_html.to_path_buf(),
    })
}
