// Topics over time: per-topic document counts across equal-width time bins.

use anyhow::Result;
use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

use super::model::TopicModel;

pub const DEFAULT_NR_BINS: usize = 15;
pub const DEFAULT_TOP_N_TOPICS: usize = 20;

/// One time bin, `[start, end)` except the last which includes `end`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeBin {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Document counts for one topic, one entry per bin.
#[derive(Debug, Clone, Serialize)]
pub struct TopicSeries {
    pub topic_id: usize,
    pub label: String,
    pub keywords: Vec<String>,
    pub counts: Vec<usize>,
}

impl TopicSeries {
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TopicsOverTime {
    pub bins: Vec<TimeBin>,
    /// The most frequent topics, most frequent first
    pub series: Vec<TopicSeries>,
    pub documents: usize,
    /// Documents that matched no topic
    pub outliers: usize,
}

/// Count topic assignments per time bin.
///
/// `assignments[i]` is the topic of the document stamped `timestamps[i]`.
/// Only the `top_n` topics with the most documents are kept; topics with no
/// documents are dropped.
pub fn topics_over_time(
    model: &TopicModel,
    assignments: &[Option<usize>],
    timestamps: &[NaiveDateTime],
    nr_bins: usize,
    top_n: usize,
) -> Result<TopicsOverTime> {
    if assignments.len() != timestamps.len() {
        anyhow::bail!(
            "Got {} topic assignments but {} timestamps",
            assignments.len(),
            timestamps.len()
        );
    }
    if nr_bins == 0 {
        anyhow::bail!("Number of time bins must be at least 1");
    }
    let (Some(&min), Some(&max)) = (timestamps.iter().min(), timestamps.iter().max()) else {
        anyhow::bail!("No documents to bin");
    };

    let span_ms = (max - min).num_milliseconds();
    let bins = if span_ms == 0 {
        vec![TimeBin {
            start: min,
            end: max,
        }]
    } else {
        let width = span_ms as f64 / nr_bins as f64;
        (0..nr_bins)
            .map(|i| TimeBin {
                start: min + Duration::milliseconds((width * i as f64) as i64),
                end: if i + 1 == nr_bins {
                    max
                } else {
                    min + Duration::milliseconds((width * (i + 1) as f64) as i64)
                },
            })
            .collect()
    };

    let bin_of = |ts: &NaiveDateTime| -> usize {
        if span_ms == 0 {
            return 0;
        }
        let offset = (*ts - min).num_milliseconds() as f64;
        ((offset / span_ms as f64 * nr_bins as f64) as usize).min(nr_bins - 1)
    };

    let mut counts = vec![vec![0usize; bins.len()]; model.topics.len()];
    let mut outliers = 0;
    for (assignment, ts) in assignments.iter().zip(timestamps) {
        match assignment.and_then(|id| counts.get_mut(id)) {
            Some(row) => row[bin_of(ts)] += 1,
            None => outliers += 1,
        }
    }

    let mut series: Vec<TopicSeries> = model
        .topics
        .iter()
        .zip(counts)
        .map(|(topic, counts)| TopicSeries {
            topic_id: topic.id,
            label: topic.label.clone(),
            keywords: topic.keywords.clone(),
            counts,
        })
        .filter(|s| s.total() > 0)
        .collect();
    // Stable: equal totals stay in topic-id order
    series.sort_by(|a, b| b.total().cmp(&a.total()));
    series.truncate(top_n);

    Ok(TopicsOverTime {
        bins,
        series,
        documents: assignments.len(),
        outliers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topics::model::Topic;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 5, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn model(n: usize) -> TopicModel {
        TopicModel {
            topics: (0..n)
                .map(|id| Topic {
                    id,
                    label: format!("topic {id}"),
                    keywords: vec![format!("kw{id}")],
                    weight: 1.0 / n as f64,
                })
                .collect(),
            doc_count: 0,
        }
    }

    #[test]
    fn test_bins_span_range() {
        let ts = vec![at(1, 0), at(1, 12), at(2, 0), at(3, 0)];
        let assignments = vec![Some(0), Some(0), Some(1), None];
        let tot = topics_over_time(&model(2), &assignments, &ts, 4, 20).unwrap();

        assert_eq!(tot.bins.len(), 4);
        assert_eq!(tot.bins[0].start, at(1, 0));
        assert_eq!(tot.bins[3].end, at(3, 0));
        assert_eq!(tot.outliers, 1);
        assert_eq!(tot.documents, 4);

        let topic0 = tot.series.iter().find(|s| s.topic_id == 0).unwrap();
        // 12:00 on day one is exactly the second bin's lower edge
        assert_eq!(topic0.counts, vec![1, 1, 0, 0]);
        let topic1 = tot.series.iter().find(|s| s.topic_id == 1).unwrap();
        assert_eq!(topic1.counts, vec![0, 0, 1, 0]);
    }

    #[test]
    fn test_latest_timestamp_lands_in_last_bin() {
        let ts = vec![at(1, 0), at(11, 0)];
        let tot = topics_over_time(&model(1), &[Some(0), Some(0)], &ts, 15, 20).unwrap();
        assert_eq!(tot.series[0].counts[0], 1);
        assert_eq!(tot.series[0].counts[14], 1);
    }

    #[test]
    fn test_equal_timestamps_collapse_to_one_bin() {
        let ts = vec![at(4, 9); 3];
        let tot = topics_over_time(&model(1), &[Some(0); 3], &ts, 15, 20).unwrap();
        assert_eq!(tot.bins.len(), 1);
        assert_eq!(tot.series[0].counts, vec![3]);
    }

    #[test]
    fn test_top_n_keeps_most_frequent() {
        let ts = vec![at(1, 0), at(1, 1), at(1, 2), at(1, 3)];
        let assignments = vec![Some(2), Some(2), Some(1), Some(0)];
        let tot = topics_over_time(&model(3), &assignments, &ts, 2, 2).unwrap();
        assert_eq!(tot.series.len(), 2);
        assert_eq!(tot.series[0].topic_id, 2);
        assert_eq!(tot.series[1].topic_id, 0);
    }

    #[test]
    fn test_rejects_mismatched_lengths_and_empty_input() {
        assert!(topics_over_time(&model(1), &[Some(0)], &[], 15, 20).is_err());
        assert!(topics_over_time(&model(1), &[], &[], 15, 20).is_err());
        assert!(topics_over_time(&model(1), &[Some(0)], &[at(1, 0)], 0, 20).is_err());
    }
}
