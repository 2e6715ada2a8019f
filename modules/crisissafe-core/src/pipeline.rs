use std::sync::LazyLock;

use regex::Regex;
use tracing::{info, warn};

use crisissafe_archive::ArchiveEntry;
use crisissafe_common::{Analysis, AnalysisResult, CheckStatus, Checklist, Verdict};

use crate::deps::Deps;
use crate::{related, signals};

const PANIC_PENALTY: i32 = 25;
const SHOUTING_PENALTY: i32 = 20;
const FALSE_PENALTY: i32 = 70;
const UNCERTAIN_PENALTY: i32 = 25;
const UNAVAILABLE_PENALTY: i32 = 30;
const FALSE_CLAIM_CAP: i32 = 20;
const EXAGGERATION_CAP: i32 = 30;
/// How much extracted article body goes into the verification context.
const ARTICLE_CONTEXT_CHARS: usize = 1500;

/// Known-false literal, matched case-insensitively regardless of the AI
/// outcome.
const KNOWN_FALSE_CLAIM: &str = "india is not a country";

static EXAGGERATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(will kill everyone|kill everyone|everyone will die|everyone dies|everyone is going to die|all will die|end the world|world will end|end of the world|world ends|100% fatal|100% death rate)\b",
    )
    .expect("valid regex")
});

/// The credibility pipeline. Consults the archive first, otherwise runs the
/// full sequence of deterministic and AI-assisted checks and persists the
/// result. Every external failure degrades; the pipeline always returns a
/// fully-formed analysis.
pub struct Analyzer {
    deps: Deps,
}

impl Analyzer {
    pub fn new(deps: Deps) -> Self {
        Self { deps }
    }

    pub async fn analyze(&self, text: &str) -> Analysis {
        // --- 0. Archive first ---
        if let Some(entry) = self.deps.archive.lookup(text).await {
            info!("Serving analysis from archive");
            let result = self.backfill(text, entry).await;
            return Analysis {
                result,
                from_archive: true,
            };
        }

        info!(chars = text.chars().count(), "Analyzing claim");

        let mut score: i32 = 100;
        let mut flags: Vec<String> = Vec::new();
        let mut checklist = Checklist::default();
        let mut context = text.to_string();

        // --- 1. Text signals ---
        let signals = signals::extract(text, self.deps.subjectivity.as_ref()).await;
        let is_objective = !(signals.is_subjective
            || signals.has_panic_pattern
            || signals.has_shouting
            || signals.has_excessive_caps);
        checklist.objective_language = CheckStatus::from_bool(is_objective);
        if signals.is_subjective {
            flags.push(format!(
                "Subjective language detected (score {:.2}).",
                signals.subjectivity_score
            ));
        }

        // --- 2. URL extraction ---
        if let Some(ref url) = signals.url {
            match self.deps.fetcher.fetch(url).await {
                Ok(body) => {
                    let snippet: String = body.chars().take(ARTICLE_CONTEXT_CHARS).collect();
                    context = format!("URL: {url}\nArticle Content: {snippet}");
                    flags.push("Extracted article content from URL.".to_string());
                    checklist.url_extraction = CheckStatus::Pass;
                }
                Err(e) => {
                    warn!(url, error = %e, "Article extraction failed");
                    flags.push("Could not extract article content from URL.".to_string());
                    checklist.url_extraction = CheckStatus::Fail;
                }
            }
        } else {
            checklist.url_extraction = CheckStatus::NotApplicable;
        }

        // --- 3. Panic / style rules ---
        checklist.no_panic_pattern = CheckStatus::from_bool(!signals.has_panic_pattern);
        if signals.has_panic_pattern {
            score -= PANIC_PENALTY;
            flags.push("Panic pattern: excessive punctuation detected.".to_string());
        }

        let shouting = signals.has_shouting || signals.has_excessive_caps;
        checklist.no_shouting = CheckStatus::from_bool(!shouting);
        if shouting {
            score -= SHOUTING_PENALTY;
            flags.push("Shouting pattern: excessive uppercase usage detected.".to_string());
        }

        // --- 4. AI fact verification ---
        let verdict_result = self.deps.verdicts.classify(&context).await;
        checklist.ai_verification = match verdict_result.verdict {
            Verdict::True => CheckStatus::Pass,
            Verdict::False => CheckStatus::Fail,
            Verdict::Uncertain => CheckStatus::Uncertain,
            Verdict::Unavailable => CheckStatus::NotApplicable,
        };
        match verdict_result.verdict {
            Verdict::False => {
                score -= FALSE_PENALTY;
                flags.push("AI verdict: claim is factually false.".to_string());
            }
            Verdict::Uncertain => {
                score -= UNCERTAIN_PENALTY;
                flags.push("AI verdict: claim cannot be verified confidently.".to_string());
            }
            Verdict::Unavailable => {
                score -= UNAVAILABLE_PENALTY;
                flags.push(verdict_result.explanation.clone());
            }
            Verdict::True => {}
        }

        // --- 5. Deterministic sanity checks ---
        let lower = text.to_lowercase();
        let has_false_claim = lower.contains(KNOWN_FALSE_CLAIM);
        let has_exaggerated_claim = EXAGGERATION_RE.is_match(&lower);
        let ai_says_false = verdict_result.verdict == Verdict::False;
        checklist.sanity_check =
            CheckStatus::from_bool(!(has_false_claim || has_exaggerated_claim || ai_says_false));

        if has_false_claim {
            score = score.min(FALSE_CLAIM_CAP);
            flags.push("Deterministic check: India is a sovereign country.".to_string());
        } else if has_exaggerated_claim {
            score = score.min(EXAGGERATION_CAP);
            flags.push("Sanity check: detected obviously false or exaggerated claim.".to_string());
        } else if ai_says_false {
            flags.push("Sanity check: AI verification indicates a false claim.".to_string());
        }

        // --- 6. Final score ---
        let score = score.clamp(0, 100) as u8;

        // --- 7. Discussion pointers (uncertain verdicts only) ---
        let pointers = if verdict_result.verdict == Verdict::Uncertain {
            verdict_result.pointers.clone()
        } else {
            Vec::new()
        };

        // --- 8. Related articles ---
        let related_articles = related::gather(
            text,
            verdict_result.verdict,
            self.deps.searcher.as_ref(),
            self.deps.highlighter.as_deref(),
        )
        .await;

        let result = AnalysisResult {
            score,
            flags,
            ai_report: verdict_result.report,
            is_subjective: signals.is_subjective,
            checklist,
            related_articles,
            pointers,
        };

        // --- 9. Store in archive ---
        self.deps.archive.store(text, &result).await;

        Analysis {
            result,
            from_archive: false,
        }
    }

    /// Entries stored before related_articles/pointers existed get both
    /// computed on the fly; the archived copy stays untouched.
    async fn backfill(&self, text: &str, entry: ArchiveEntry) -> AnalysisResult {
        let mut result = entry.result;
        if !result.related_articles.is_empty() || !result.pointers.is_empty() {
            return result;
        }

        let verdict = verdict_from_score(result.score);
        result.related_articles = related::gather(
            text,
            verdict,
            self.deps.searcher.as_ref(),
            self.deps.highlighter.as_deref(),
        )
        .await;
        if verdict == Verdict::Uncertain {
            result.pointers = default_pointers();
        }
        result
    }
}

/// Display-tier thresholds; the only verdict signal a legacy archive entry
/// reliably carries.
fn verdict_from_score(score: u8) -> Verdict {
    if score > 80 {
        Verdict::True
    } else if score > 40 {
        Verdict::Uncertain
    } else {
        Verdict::False
    }
}

fn default_pointers() -> Vec<String> {
    vec![
        "Who originally made this claim, and do they cite a primary source?".to_string(),
        "Has a major fact-checking outlet or subject-matter expert weighed in?".to_string(),
        "Would the claim still hold if the most alarming word were removed?".to_string(),
    ]
}
