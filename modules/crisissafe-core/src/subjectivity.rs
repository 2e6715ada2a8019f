use std::collections::HashSet;
use std::sync::LazyLock;

use anyhow::Result;
use async_trait::async_trait;

// --- SubjectivityScorer trait ---

#[async_trait]
pub trait SubjectivityScorer: Send + Sync {
    /// Subjectivity of the text in [0, 1].
    async fn score(&self, text: &str) -> Result<f32>;
}

// --- Lexicon scorer ---

/// Opinion cues: evaluative adjectives, hedges, and absolutist terms.
static OPINION_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "think", "believe", "feel", "felt", "opinion", "amazing", "awesome", "terrible",
        "horrible", "awful", "best", "worst", "beautiful", "ugly", "love", "hate", "great",
        "good", "bad", "incredible", "unbelievable", "disgusting", "wonderful", "fantastic",
        "stupid", "ridiculous", "absurd", "obviously", "clearly", "definitely", "probably",
        "maybe", "perhaps", "should", "must", "always", "never", "outrageous", "shocking",
    ]
    .into_iter()
    .collect()
});

/// Deterministic subjectivity scorer: the fraction of tokens found in the
/// opinion lexicon, scaled so a couple of cues in a short claim cross the
/// subjective threshold. Stands in for an external sentiment service.
pub struct LexiconScorer;

#[async_trait]
impl SubjectivityScorer for LexiconScorer {
    async fn score(&self, text: &str) -> Result<f32> {
        let mut total = 0usize;
        let mut hits = 0usize;
        for token in text.split_whitespace() {
            total += 1;
            let word: String = token
                .chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
                .to_lowercase();
            if OPINION_WORDS.contains(word.as_str()) {
                hits += 1;
            }
        }
        if total == 0 {
            return Ok(0.0);
        }
        Ok((hits as f32 / total as f32 * 2.5).clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn factual_text_scores_low() {
        let score = LexiconScorer.score("Water boils at 100 degrees Celsius").await.unwrap();
        assert!(score <= 0.5, "score was {score}");
    }

    #[tokio::test]
    async fn opinionated_text_scores_high() {
        let score = LexiconScorer
            .score("I think this is the best and most amazing idea")
            .await
            .unwrap();
        assert!(score > 0.5, "score was {score}");
    }

    #[tokio::test]
    async fn empty_text_scores_zero() {
        assert_eq!(LexiconScorer.score("").await.unwrap(), 0.0);
    }

    #[tokio::test]
    async fn punctuation_does_not_hide_cues() {
        let plain = LexiconScorer.score("this is terrible news").await.unwrap();
        let marked = LexiconScorer.score("this is terrible! news").await.unwrap();
        assert_eq!(plain, marked);
    }
}
