// Tweet text normalization ahead of topic modeling.
//
// URLs are dropped, mentions collapse to a single placeholder token, and
// everything that isn't an ASCII letter becomes whitespace. The result is a
// lowercase, single-spaced string of alphabetic tokens.

use std::sync::OnceLock;

use regex_lite::Regex;

/// What every @mention turns into (lowercased by the time cleaning finishes).
pub const MENTION_PLACEHOLDER: &str = "@USERNAME";

fn url_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"http\S+").expect("URL pattern is valid"))
}

fn mention_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"@\S+").expect("mention pattern is valid"))
}

fn non_alpha_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-zA-Z]+").expect("non-alpha pattern is valid"))
}

/// Normalize one tweet for topic modeling.
pub fn clean_tweet(text: &str) -> String {
    let without_urls = url_pattern().replace_all(text, "").to_lowercase();
    let masked = mention_pattern()
        .replace_all(&without_urls, MENTION_PLACEHOLDER)
        .to_lowercase();
    let letters_only = non_alpha_pattern().replace_all(&masked, " ");
    letters_only.split_whitespace().collect::<Vec<_>>().join(" ")
}
