// Topic modeling: tweet cleaning, TF-IDF topics and topics over time.

pub mod clean;
pub mod model;
pub mod over_time;
pub mod tfidf;
pub mod traits;
