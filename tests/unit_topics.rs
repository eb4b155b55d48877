// Unit tests for topic modeling: cleaning, TF-IDF extraction, document
// assignment, binning over time, and the HTML page built from them.

use chrono::{NaiveDate, NaiveDateTime};
use quotecoder::output::html::{escape_html, render_topics_over_time};
use quotecoder::topics::clean::clean_tweet;
use quotecoder::topics::model::{Topic, TopicModel};
use quotecoder::topics::over_time::topics_over_time;
use quotecoder::topics::tfidf::TfIdfExtractor;
use quotecoder::topics::traits::TopicExtractor;

fn at(day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2021, 5, day)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

fn raw_tweets() -> Vec<&'static str> {
    vec![
        "@GovAbbott the vaccine mandate is a disaster QT Vaccine mandate starts Monday https://t.co/x1",
        "Vaccine mandate lawsuits everywhere QT @CDCgov: new vaccine mandate guidance",
        "Finally, a vaccine mandate! QT Employers weigh vaccine mandate options",
        "The border wall was never finished QT Border wall funding cut https://t.co/x2",
        "@DHSgov border wall contracts cancelled QT Border wall construction paused",
        "Build the border wall QT Border wall crisis, again",
        "Stimulus checks now QT Senate stalls stimulus checks",
        "Where are the stimulus checks? QT @Treasury: stimulus checks sent",
    ]
}

// ============================================================
// Cleaning
// ============================================================

#[test]
fn cleaning_produces_lowercase_letter_tokens() {
    for raw in raw_tweets() {
        let cleaned = clean_tweet(raw);
        assert!(!cleaned.contains("http"), "URL survived in {cleaned:?}");
        assert!(cleaned
            .chars()
            .all(|c| c.is_ascii_lowercase() || c == ' '));
        assert!(!cleaned.contains("  "));
    }
}

#[test]
fn cleaning_masks_every_mention() {
    let cleaned = clean_tweet("@a and @b.c said hi to @d_e");
    assert_eq!(cleaned, "username and username said hi to username");
}

// ============================================================
// TF-IDF extraction and assignment
// ============================================================

#[test]
fn extracted_topics_cover_the_corpus_themes() {
    let docs: Vec<String> = raw_tweets().into_iter().map(clean_tweet).collect();
    let extractor = TfIdfExtractor {
        top_n_keywords: 40,
        max_topics: 10,
        ..TfIdfExtractor::default()
    };
    let model = extractor.extract(&docs).unwrap();

    let all_keywords: Vec<&str> = model
        .topics
        .iter()
        .flat_map(|t| t.keywords.iter().map(|k| k.as_str()))
        .collect();
    for theme in ["vaccine", "border", "stimulus"] {
        assert!(
            all_keywords.contains(&theme),
            "{theme} missing from {all_keywords:?}"
        );
    }

    // A keyword belongs to at most one topic
    let mut seen = std::collections::HashSet::new();
    for kw in &all_keywords {
        assert!(seen.insert(*kw), "{kw} appears in two topics");
    }
}

#[test]
fn documents_sharing_a_theme_land_in_the_same_topic() {
    let docs: Vec<String> = raw_tweets().into_iter().map(clean_tweet).collect();
    let model = TfIdfExtractor::default().extract(&docs).unwrap();
    let assignments = model.assign_all(&docs);

    assert_eq!(assignments.len(), docs.len());
    assert!(assignments.iter().all(|a| a.is_some()));
    assert_eq!(assignments[0], assignments[1]);
    assert_eq!(assignments[3], assignments[4]);
    assert_eq!(assignments[6], assignments[7]);
}

#[test]
fn max_topics_caps_the_model() {
    let docs: Vec<String> = raw_tweets().into_iter().map(clean_tweet).collect();
    let extractor = TfIdfExtractor {
        max_topics: 2,
        ..TfIdfExtractor::default()
    };
    let model = extractor.extract(&docs).unwrap();
    assert!(model.topics.len() <= 2);
}

// ============================================================
// Topics over time
// ============================================================

fn two_topic_model() -> TopicModel {
    TopicModel {
        topics: vec![
            Topic {
                id: 0,
                label: "vaccine / mandate".to_string(),
                keywords: vec!["vaccine".to_string(), "mandate".to_string()],
                weight: 0.5,
            },
            Topic {
                id: 1,
                label: "border / wall".to_string(),
                keywords: vec!["border".to_string(), "wall".to_string()],
                weight: 0.5,
            },
        ],
        doc_count: 6,
    }
}

#[test]
fn counts_sum_to_assigned_documents() {
    let model = two_topic_model();
    let assignments = vec![Some(0), Some(1), Some(1), None, Some(1), Some(0)];
    let timestamps = vec![at(1), at(3), at(9), at(12), at(20), at(31)];

    let tot = topics_over_time(&model, &assignments, &timestamps, 5, 20).unwrap();

    assert_eq!(tot.bins.len(), 5);
    assert_eq!(tot.documents, 6);
    assert_eq!(tot.outliers, 1);
    let charted: usize = tot.series.iter().map(|s| s.total()).sum();
    assert_eq!(charted, 5);

    // Border/wall has more documents so it's listed first
    assert_eq!(tot.series[0].topic_id, 1);
    assert_eq!(tot.series[0].total(), 3);
    assert_eq!(tot.bins.first().unwrap().start, at(1));
    assert_eq!(tot.bins.last().unwrap().end, at(31));
    // The latest document falls into the last bin
    assert_eq!(*tot.series[1].counts.last().unwrap(), 1);
}

#[test]
fn top_n_limits_series() {
    let model = two_topic_model();
    let assignments = vec![Some(0), Some(1), Some(1)];
    let timestamps = vec![at(1), at(2), at(3)];

    let tot = topics_over_time(&model, &assignments, &timestamps, 3, 1).unwrap();
    assert_eq!(tot.series.len(), 1);
    assert_eq!(tot.series[0].topic_id, 1);
}

#[test]
fn mismatched_lengths_fail() {
    let model = two_topic_model();
    assert!(topics_over_time(&model, &[Some(0)], &[at(1), at(2)], 3, 5).is_err());
    assert!(topics_over_time(&model, &[], &[], 3, 5).is_err());
    assert!(topics_over_time(&model, &[Some(0)], &[at(1)], 0, 5).is_err());
}

// ============================================================
// HTML rendering
// ============================================================

#[test]
fn html_page_lists_charted_topics() {
    let model = two_topic_model();
    let assignments = vec![Some(0), Some(1), Some(1)];
    let timestamps = vec![at(1), at(10), at(20)];
    let tot = topics_over_time(&model, &assignments, &timestamps, 4, 20).unwrap();

    let html = render_topics_over_time(&tot, "Quotes <April>");

    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<svg"));
    assert!(html.contains("Quotes &lt;April&gt;"));
    assert!(html.contains("vaccine / mandate"));
    assert!(html.contains("border / wall"));
}

#[test]
fn escape_html_handles_all_special_characters() {
    assert_eq!(
        escape_html(r#"<a href="x">Tom & Jerry's</a>"#),
        "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
    );
}
