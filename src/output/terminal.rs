// Colored terminal output for extraction runs, topic runs and table status.
//
// main.rs delegates all multi-line display here.

use colored::Colorize;

use crate::db::models::{Cluster, TableSummary};
use crate::pipeline::extract::ExtractionReport;
use crate::pipeline::topics::TopicReport;

/// Summarize an extraction or resample run.
pub fn display_extraction_report(report: &ExtractionReport) {
    println!("\n{}", "=== Coding worksheet ===".bold());
    println!(
        "  Full data:  {} rows -> {}",
        report.full_rows,
        report.full_data_file.display()
    );
    println!(
        "  Pools:      {} cross-cluster, {} same-cluster",
        report.cross_available, report.same_available
    );
    println!(
        "  Sampled:    {} ({} cross, {} same) -> {}",
        report.sampled().to_string().bold(),
        report.cross_sampled,
        report.same_sampled,
        report.sample_data_file.display()
    );

    if report.preview.is_empty() {
        return;
    }

    println!("\n  {}", "First rows:".dimmed());
    for row in &report.preview {
        println!(
            "  {}  @{} ({}) -> @{} ({})",
            row.date.dimmed(),
            row.quote_user,
            colorize_cluster(&row.quote_user_cluster),
            row.original_user,
            colorize_cluster(&row.original_user_cluster),
        );
        println!("      \"{}\"", super::truncate_chars(&row.quote, 100).dimmed());
    }
}

/// Summarize a topic-modeling run.
pub fn display_topic_report(report: &TopicReport) {
    report.model.display();

    let tot = &report.over_time;
    println!(
        "  {} tweets across {} time bins, {} without a topic",
        tot.documents,
        tot.bins.len(),
        tot.outliers
    );
    println!(
        "  Charted {} topics -> {}",
        tot.series.len(),
        report.output_html.display()
    );
}

/// Display the quote table summary for `quotecoder status`.
pub fn display_table_summary(summary: &TableSummary) {
    println!("Quote table: {}", summary.table);
    println!("  Rows: {}", summary.rows);
    match (&summary.earliest, &summary.latest) {
        (Some(first), Some(last)) => println!("  Span: {first} to {last}"),
        _ => println!("  Span: {}", "empty".dimmed()),
    }

    if summary.clusters.is_empty() {
        return;
    }
    println!("  Quoting clusters:");
    for (code, count) in &summary.clusters {
        let label = match Cluster::from_code(*code) {
            Some(c) => colorize_cluster(c.as_str()).to_string(),
            None => format!("cluster {code} (unlabeled)").dimmed().to_string(),
        };
        println!("    {:>3}  {:<28} {:>8}", code, label, count);
    }
}

/// Colorize a cluster label.
fn colorize_cluster(label: &str) -> colored::ColoredString {
    match label {
        "Lean-Trump" => label.red(),
        "Lean-Biden" => label.blue(),
        "Lean-Socialist" => label.magenta(),
        _ => label.dimmed(),
    }
}
