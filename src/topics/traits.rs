// Topic extractor trait.
//
// The default implementation uses TF-IDF keyword clusters. An embeddings-based
// clusterer could replace it without touching the topics pipeline.

use super::model::TopicModel;
use anyhow::Result;

/// Trait for fitting a topic model to a collection of cleaned documents.
pub trait TopicExtractor {
    fn extract(&self, documents: &[String]) -> Result<TopicModel>;
}
