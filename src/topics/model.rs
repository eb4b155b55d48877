// TopicModel: the fitted topics for a corpus of quote tweets.
//
// A model is a list of topics, each with a label, a set of keywords, and a
// weight indicating how prominent that topic is across the corpus. Documents
// are assigned to topics by keyword hits; documents with no hits are
// outliers.

use std::collections::HashSet;

use colored::Colorize;
use serde::{Deserialize, Serialize};

/// A fitted topic model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicModel {
    /// Topics ranked by weight (highest first); `topics[i].id == i`
    pub topics: Vec<Topic>,
    /// Number of documents the model was fitted on
    pub doc_count: u32,
}

/// A single topic: a group of co-occurring keywords with a label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    pub id: usize,
    /// Human-readable label, built from the leading keywords
    pub label: String,
    /// Keywords in descending TF-IDF score order
    pub keywords: Vec<String>,
    /// Normalized weight (0.0 to 1.0); weights across a model sum to 1
    pub weight: f64,
}

impl TopicModel {
    /// Assign a cleaned document to the topic whose keywords it hits most.
    ///
    /// Ties go to the heavier topic. Returns `None` when no keyword appears.
    pub fn assign(&self, document: &str) -> Option<usize> {
        let tokens: Vec<&str> = document.split_whitespace().collect();
        let mut best: Option<(usize, usize)> = None;

        for topic in &self.topics {
            let keywords: HashSet<&str> = topic.keywords.iter().map(|k| k.as_str()).collect();
            let hits = tokens.iter().filter(|t| keywords.contains(*t)).count();
            let better = match best {
                Some((_, best_hits)) => hits > best_hits,
                None => hits > 0,
            };
            if better {
                best = Some((topic.id, hits));
            }
        }

        best.map(|(id, _)| id)
    }

    pub fn assign_all(&self, documents: &[String]) -> Vec<Option<usize>> {
        documents.iter().map(|d| self.assign(d)).collect()
    }

    /// Display the topics as a formatted bar chart in the terminal.
    pub fn display(&self) {
        println!(
            "\n{}",
            format!(
                "=== {} topics (fitted on {} tweets) ===",
                self.topics.len(),
                self.doc_count
            )
            .bold()
        );
        println!();

        let bar_width: usize = 20;

        for topic in &self.topics {
            let filled = (topic.weight * bar_width as f64).round() as usize;
            let empty = bar_width.saturating_sub(filled);
            let bar = format!("[{}{}]", "=".repeat(filled), " ".repeat(empty));

            let colored_bar = if topic.weight >= 0.10 {
                bar.bright_green()
            } else if topic.weight >= 0.04 {
                bar.bright_yellow()
            } else {
                bar.bright_blue()
            };

            println!(
                "  {:>2}. {:<40} {} {:.2}",
                topic.id,
                topic.label.bold(),
                colored_bar,
                topic.weight
            );
            println!("      Keywords: {}", topic.keywords.join(", ").dimmed());
        }
        println!();
    }
}
