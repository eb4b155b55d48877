// TF-IDF topic extraction.
//
// Uses the `keyword_extraction` crate to rank keywords across the corpus,
// then groups co-occurring keywords into topics.
//
// Each tweet is a separate document for IDF computation: words that appear
// in nearly every tweet (the mention placeholder, the quote separator) get
// downweighted, while words distinctive to a subset of tweets get boosted.

use std::collections::HashSet;

use anyhow::Result;
use keyword_extraction::tf_idf::{TfIdf, TfIdfParams};
use stop_words::{get, LANGUAGE};
use tracing::info;

use super::model::{Topic, TopicModel};
use super::traits::TopicExtractor;

/// Tokens that survive cleaning but say nothing about the topic: the mention
/// placeholder, the quote separator and retweet boilerplate.
pub const TWEET_STOP_WORDS: [&str; 5] = ["username", "qt", "rt", "amp", "via"];

/// Most keywords any one topic can hold (the seed plus its neighbors).
const MAX_KEYWORDS_PER_TOPIC: usize = 6;

pub struct TfIdfExtractor {
    /// How many top keywords to extract before grouping
    pub top_n_keywords: usize,
    /// Upper bound on the number of topics produced
    pub max_topics: usize,
    /// Stop words applied on top of the English list
    pub extra_stop_words: Vec<String>,
}

impl Default for TfIdfExtractor {
    fn default() -> Self {
        Self {
            top_n_keywords: 150,
            max_topics: 30,
            extra_stop_words: TWEET_STOP_WORDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl TopicExtractor for TfIdfExtractor {
    fn extract(&self, documents: &[String]) -> Result<TopicModel> {
        if documents.iter().all(|d| d.trim().is_empty()) {
            anyhow::bail!("No tweet text to model: every document is empty after cleaning");
        }

        let mut stop_words: Vec<String> = get(LANGUAGE::English);
        stop_words.extend(self.extra_stop_words.iter().cloned());

        let params = TfIdfParams::UnprocessedDocuments(documents, &stop_words, None);
        let tfidf = TfIdf::new(params);

        let stop_set: HashSet<&str> = stop_words.iter().map(|s| s.as_str()).collect();
        let ranked: Vec<(String, f32)> = tfidf
            .get_ranked_word_scores(self.top_n_keywords)
            .into_iter()
            .filter(|(word, _)| !stop_set.contains(word.as_str()))
            .collect();

        if ranked.is_empty() {
            anyhow::bail!(
                "TF-IDF produced no keywords from {} tweets: texts may be too short or uniform",
                documents.len()
            );
        }

        info!(
            keywords = ranked.len(),
            top_keyword = &ranked[0].0,
            top_score = ranked[0].1,
            "Extracted TF-IDF keywords"
        );

        let topics = group_keywords(&ranked, documents, self.max_topics);

        Ok(TopicModel {
            topics,
            doc_count: documents.len() as u32,
        })
    }
}

/// Group keywords into topics based on co-occurrence in documents.
///
/// Seeds are taken in score order; each seed pulls in the unassigned keywords
/// it shares the most documents with. Keywords with no co-occurring partner
/// become single-keyword topics.
fn group_keywords(ranked: &[(String, f32)], documents: &[String], max_topics: usize) -> Vec<Topic> {
    let keywords: Vec<&str> = ranked.iter().map(|(w, _)| w.as_str()).collect();

    // For each document, the indices of the keywords it contains as tokens
    let doc_keywords: Vec<Vec<usize>> = documents
        .iter()
        .map(|doc| {
            let tokens: HashSet<&str> = doc.split_whitespace().collect();
            keywords
                .iter()
                .enumerate()
                .filter(|(_, kw)| tokens.contains(*kw))
                .map(|(i, _)| i)
                .collect()
        })
        .collect();

    let n = keywords.len();
    let mut cooccurrence = vec![vec![0u32; n]; n];
    for dk in &doc_keywords {
        for &i in dk {
            for &j in dk {
                if i != j {
                    cooccurrence[i][j] += 1;
                }
            }
        }
    }

    let mut assigned = vec![false; n];
    let mut grouped: Vec<(Vec<usize>, f32)> = Vec::new();

    for seed in 0..n {
        if grouped.len() >= max_topics {
            break;
        }
        if assigned[seed] {
            continue;
        }

        assigned[seed] = true;
        let mut members = vec![seed];
        let mut score = ranked[seed].1;

        let mut candidates: Vec<(usize, u32)> = (0..n)
            .filter(|&i| !assigned[i] && cooccurrence[seed][i] > 0)
            .map(|i| (i, cooccurrence[seed][i]))
            .collect();
        // Stable sort keeps score order among equal co-occurrence counts
        candidates.sort_by(|a, b| b.1.cmp(&a.1));

        for (idx, _) in candidates.into_iter().take(MAX_KEYWORDS_PER_TOPIC - 1) {
            assigned[idx] = true;
            score += ranked[idx].1;
            members.push(idx);
        }

        grouped.push((members, score));
    }

    let score_sum: f32 = grouped.iter().map(|(_, s)| s).sum();

    grouped.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    grouped
        .into_iter()
        .enumerate()
        .map(|(id, (members, score))| {
            let keywords: Vec<String> = members.iter().map(|&i| ranked[i].0.clone()).collect();
            Topic {
                id,
                label: topic_label(&keywords),
                keywords,
                weight: if score_sum > 0.0 {
                    (score / score_sum) as f64
                } else {
                    0.0
                },
            }
        })
        .collect()
}

/// Label a topic with its first three keywords joined by " / ".
fn topic_label(keywords: &[String]) -> String {
    keywords
        .iter()
        .take(3)
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(" / ")
}
