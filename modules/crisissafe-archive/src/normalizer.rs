use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Mutex};

use ai_client::util::strip_code_blocks;
use ai_client::{OpenAi, PromptBuilder};
use anyhow::Result;
use regex::Regex;
use tracing::{debug, warn};

// Longest variant first so "covid-19" is not half-matched as "covid".
static SYNONYM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(covid-19|covid|coronavirus|sars-cov-2)\b").expect("valid regex")
});
static FILLER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(the|a|an|is|are|was|were)\b").expect("valid regex"));
static PUNCT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s]").expect("valid regex"));

const NORMALIZE_SYSTEM_PROMPT: &str = "You are a text normalizer. Convert the given claim or \
question to a canonical, standardized form. Remove filler words, normalize terminology \
(e.g. 'covid', 'covid-19', 'coronavirus' -> 'COVID-19'), and standardize phrasing. \
Return ONLY the normalized text, nothing else.";

/// Maps raw claim text to a canonical string used as the archive cache key.
///
/// With an AI handle the canonical form comes from a low-temperature rewrite;
/// without one, or when the rewrite fails or looks implausible, the
/// rule-based [`basic_normalize`] is used. Identical raw input (trimmed,
/// case-insensitive) within a process run is served from a local memo cache
/// without re-invoking the model.
pub struct Normalizer {
    ai: Option<Arc<OpenAi>>,
    cache: Mutex<HashMap<String, String>>,
}

impl Normalizer {
    pub fn new(ai: Option<Arc<OpenAi>>) -> Self {
        Self {
            ai,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Rule-based normalizer only, no AI calls. Used by tests and keyless
    /// deployments.
    pub fn rule_based() -> Self {
        Self::new(None)
    }

    /// Canonical form of a claim. Never fails.
    pub async fn canonicalize(&self, text: &str) -> String {
        let cache_key = text.trim().to_lowercase();
        if let Some(hit) = self
            .cache
            .lock()
            .expect("normalizer cache poisoned")
            .get(&cache_key)
        {
            return hit.clone();
        }

        let normalized = match self.ai {
            None => basic_normalize(text),
            Some(ref ai) => match self.ai_normalize(ai, text).await {
                Ok(rewritten) if plausible(&rewritten) => rewritten,
                Ok(rewritten) => {
                    debug!(
                        chars = rewritten.chars().count(),
                        "Implausible normalizer reply, using rule-based form"
                    );
                    basic_normalize(text)
                }
                Err(e) => {
                    warn!(error = %e, "AI normalization failed, using rule-based form");
                    basic_normalize(text)
                }
            },
        };

        self.cache
            .lock()
            .expect("normalizer cache poisoned")
            .insert(cache_key, normalized.clone());
        normalized
    }

    async fn ai_normalize(&self, ai: &OpenAi, text: &str) -> Result<String> {
        let snippet: String = text.chars().take(500).collect();
        let reply = ai
            .prompt(format!("Normalize this claim to canonical form:\n{snippet}"))
            .preamble(NORMALIZE_SYSTEM_PROMPT)
            .temperature(0.1)
            .max_tokens(100)
            .send()
            .await?;
        Ok(strip_code_blocks(&reply).to_string())
    }
}

/// A rewrite shorter than 3 or longer than 500 characters is treated as the
/// model misbehaving and discarded.
fn plausible(normalized: &str) -> bool {
    let chars = normalized.chars().count();
    (3..=500).contains(&chars)
}

/// Rule-based normalization: lower-case, collapse known synonym spellings,
/// drop common filler words, strip punctuation, collapse whitespace.
pub fn basic_normalize(text: &str) -> String {
    let lower = text.to_lowercase();
    let collapsed = SYNONYM_RE.replace_all(&lower, "covid-19");
    let unfilled = FILLER_RE.replace_all(&collapsed, "");
    let spaced = unfilled.split_whitespace().collect::<Vec<_>>().join(" ");
    let stripped = PUNCT_RE.replace_all(&spaced, "");
    stripped.trim().to_string()
}
