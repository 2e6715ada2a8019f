use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crisissafe_common::TextSignals;

use crate::subjectivity::SubjectivityScorer;

static PANIC_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"!!+|\?\?+").expect("valid regex"));
static SHOUT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z]{4,}\b").expect("valid regex"));
static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+").expect("valid regex"));

/// Shouting needs at least this many long all-caps tokens.
const SHOUT_TOKEN_THRESHOLD: usize = 3;
/// More than this fraction of fully-uppercase words counts as excessive caps.
const CAPS_RATIO_THRESHOLD: f32 = 0.5;

/// Compute the deterministic text signals for a claim. Always returns a
/// complete struct: a scorer failure degrades to a subjectivity of 0.
pub async fn extract(text: &str, scorer: &dyn SubjectivityScorer) -> TextSignals {
    let subjectivity_score = match scorer.score(text).await {
        Ok(score) => score.clamp(0.0, 1.0),
        Err(e) => {
            warn!(error = %e, "Subjectivity scoring failed, assuming objective");
            0.0
        }
    };

    TextSignals {
        subjectivity_score,
        is_subjective: subjectivity_score > 0.5,
        has_panic_pattern: has_panic_pattern(text),
        has_shouting: shouting_token_count(text) >= SHOUT_TOKEN_THRESHOLD,
        has_excessive_caps: caps_ratio(text) > CAPS_RATIO_THRESHOLD,
        url: first_url(text),
    }
}

/// Two or more consecutive `!` or `?`.
pub fn has_panic_pattern(text: &str) -> bool {
    PANIC_RE.is_match(text)
}

/// Count of tokens made of 4+ consecutive uppercase letters.
pub fn shouting_token_count(text: &str) -> usize {
    SHOUT_RE.find_iter(text).count()
}

/// Fraction of whitespace-delimited tokens that are fully uppercase
/// (length > 1). Zero when there are no tokens.
pub fn caps_ratio(text: &str) -> f32 {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.is_empty() {
        return 0.0;
    }
    let upper = tokens
        .iter()
        .filter(|t| t.chars().count() > 1 && is_all_uppercase(t))
        .count();
    upper as f32 / tokens.len() as f32
}

/// First http(s) URL in the text, if any.
pub fn first_url(text: &str) -> Option<String> {
    URL_RE.find(text).map(|m| m.as_str().to_string())
}

// A token is "all uppercase" when it has at least one cased character and no
// lowercase ones, so "DIE!" and "100%" behave like their spelled-out forms.
fn is_all_uppercase(token: &str) -> bool {
    let mut has_cased = false;
    for c in token.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            has_cased = true;
        }
    }
    has_cased
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subjectivity::LexiconScorer;

    #[test]
    fn panic_needs_consecutive_marks() {
        assert!(has_panic_pattern("Really??"));
        assert!(has_panic_pattern("No way!!"));
        assert!(has_panic_pattern("What?! No!!"));
        assert!(!has_panic_pattern("Really?"));
        assert!(!has_panic_pattern("No way!"));
    }

    #[test]
    fn shouting_counts_long_caps_tokens() {
        assert_eq!(shouting_token_count("BREAKING NEWS EVERYONE MUST EVACUATE"), 5);
        assert_eq!(shouting_token_count("STOP the FIRE now"), 2);
        assert_eq!(shouting_token_count("all lower case"), 0);
    }

    #[test]
    fn caps_ratio_ignores_single_letters() {
        assert!(caps_ratio("I am a banana") < 0.5);
        assert!(caps_ratio("THIS IS BAD ok") > 0.5);
        assert_eq!(caps_ratio(""), 0.0);
    }

    #[test]
    fn first_url_returns_first_match_only() {
        let text = "see https://example.com/a and https://example.com/b";
        assert_eq!(first_url(text).as_deref(), Some("https://example.com/a"));
        assert_eq!(first_url("no links here"), None);
    }

    #[tokio::test]
    async fn empty_input_yields_complete_signals() {
        let signals = extract("", &LexiconScorer).await;
        assert!(!signals.is_subjective);
        assert!(!signals.has_panic_pattern);
        assert!(!signals.has_shouting);
        assert!(!signals.has_excessive_caps);
        assert!(signals.url.is_none());
    }

    #[tokio::test]
    async fn breaking_news_example_trips_all_style_rules() {
        let signals = extract("BREAKING!!! EVERYONE WILL DIE TOMORROW??", &LexiconScorer).await;
        assert!(signals.has_panic_pattern);
        assert!(signals.has_shouting);
        assert!(signals.has_excessive_caps);
    }
}
