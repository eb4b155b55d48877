// Unit tests for stratified sampling.
//
// Uses a seeded StdRng so every draw is reproducible. Checks the properties
// coders rely on: counts per pool, no duplicates, rows drawn only from the
// input, chronological order, and a clear error when a pool is too small.

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime};
use quotecoder::db::models::QuoteTweet;
use quotecoder::sampling::{stratified_sample, SamplePlan};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2021, 5, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

fn tweet(id: usize, created_at: NaiveDateTime, quoting: i32, quoted: i32) -> QuoteTweet {
    QuoteTweet {
        id: id.to_string(),
        tweet: format!("quote {id} QT original {id}"),
        created_at,
        user_id: format!("u{id}"),
        quoted_status_user_id: format!("q{id}"),
        user_screen_name: format!("quoter{id}"),
        quoted_status_user_screen_name: format!("quoted{id}"),
        quoting_cluster: quoting,
        quoted_cluster: quoted,
    }
}

/// 20 cross-cluster and 30 same-cluster rows, deliberately out of time order.
fn corpus() -> Vec<QuoteTweet> {
    let mut rows = Vec::new();
    for i in 0..20 {
        rows.push(tweet(i, at(20 - (i as u32 % 19), (i % 24) as u32), 0, 3));
    }
    for i in 20..50 {
        rows.push(tweet(i, at(1 + (i as u32 % 27), (i % 24) as u32), 2, 2));
    }
    rows
}

// ============================================================
// Counts and membership
// ============================================================

#[test]
fn draws_requested_count_from_each_pool() {
    let rows = corpus();
    let plan = SamplePlan::new(20, 0.5).unwrap();
    let mut rng = StdRng::seed_from_u64(7);

    let sample = stratified_sample(&rows, &plan, &mut rng).unwrap();

    assert_eq!(sample.cross_available, 20);
    assert_eq!(sample.same_available, 30);
    assert_eq!(sample.cross_drawn, 10);
    assert_eq!(sample.same_drawn, 10);
    assert_eq!(sample.rows.len(), 20);

    let cross = sample.rows.iter().filter(|t| t.is_cross_cluster()).count();
    assert_eq!(cross, 10);
}

#[test]
fn sample_is_a_subset_without_duplicates() {
    let rows = corpus();
    let plan = SamplePlan::new(30, 0.4).unwrap();
    let mut rng = StdRng::seed_from_u64(11);

    let sample = stratified_sample(&rows, &plan, &mut rng).unwrap();

    let input_ids: HashSet<&str> = rows.iter().map(|t| t.id.as_str()).collect();
    let sampled_ids: HashSet<&str> = sample.rows.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(sampled_ids.len(), sample.rows.len(), "Duplicate rows drawn");
    assert!(sampled_ids.is_subset(&input_ids));
}

#[test]
fn sample_is_sorted_by_created_at() {
    let rows = corpus();
    let plan = SamplePlan::new(40, 0.5).unwrap();
    let mut rng = StdRng::seed_from_u64(3);

    let sample = stratified_sample(&rows, &plan, &mut rng).unwrap();

    assert!(sample
        .rows
        .windows(2)
        .all(|w| w[0].created_at <= w[1].created_at));
}

#[test]
fn odd_total_truncates_each_pool() {
    let rows = corpus();
    let plan = SamplePlan::new(5, 0.5).unwrap();
    let mut rng = StdRng::seed_from_u64(1);

    let sample = stratified_sample(&rows, &plan, &mut rng).unwrap();
    assert_eq!(sample.cross_drawn, 2);
    assert_eq!(sample.same_drawn, 2);
    assert_eq!(sample.rows.len(), 4);
}

#[test]
fn ratio_extremes_draw_from_one_pool() {
    let rows = corpus();
    let mut rng = StdRng::seed_from_u64(5);

    let all_cross = stratified_sample(&rows, &SamplePlan::new(20, 1.0).unwrap(), &mut rng).unwrap();
    assert!(all_cross.rows.iter().all(|t| t.is_cross_cluster()));
    assert_eq!(all_cross.rows.len(), 20);

    let all_same = stratified_sample(&rows, &SamplePlan::new(30, 0.0).unwrap(), &mut rng).unwrap();
    assert!(all_same.rows.iter().all(|t| !t.is_cross_cluster()));
    assert_eq!(all_same.rows.len(), 30);
}

#[test]
fn same_seed_same_sample() {
    let rows = corpus();
    let plan = SamplePlan::new(16, 0.5).unwrap();

    let ids = |seed: u64| -> Vec<String> {
        let mut rng = StdRng::seed_from_u64(seed);
        stratified_sample(&rows, &plan, &mut rng)
            .unwrap()
            .rows
            .iter()
            .map(|t| t.id.clone())
            .collect()
    };

    assert_eq!(ids(42), ids(42));
}

// ============================================================
// Error cases
// ============================================================

#[test]
fn oversized_pool_request_fails() {
    let rows = corpus();
    // 30 cross-cluster requested, only 20 exist
    let plan = SamplePlan::new(60, 0.5).unwrap();
    let mut rng = StdRng::seed_from_u64(9);

    let err = stratified_sample(&rows, &plan, &mut rng).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("cross-cluster"), "unexpected error: {msg}");
    assert!(msg.contains("only 20 available"), "unexpected error: {msg}");
}

#[test]
fn empty_input_with_zero_plan_is_empty() {
    let plan = SamplePlan::new(0, 0.5).unwrap();
    let mut rng = StdRng::seed_from_u64(0);

    let sample = stratified_sample(&[], &plan, &mut rng).unwrap();
    assert!(sample.rows.is_empty());
    assert_eq!(sample.cross_available, 0);
    assert_eq!(sample.same_available, 0);
}

#[test]
fn empty_input_with_nonzero_plan_fails() {
    let plan = SamplePlan::new(10, 0.5).unwrap();
    let mut rng = StdRng::seed_from_u64(0);
    assert!(stratified_sample(&[], &plan, &mut rng).is_err());
}
