use std::sync::{Arc, LazyLock};

use ai_client::util::truncate_to_char_boundary;
use ai_client::{OpenAi, PromptBuilder};
use async_trait::async_trait;
use regex::Regex;
use tracing::warn;

use crisissafe_common::{Verdict, VerdictResult};

const VERDICT_SYSTEM_PROMPT: &str = "You are a crisis fact-checker. Classify the claim strictly \
as one of TRUE, FALSE, or UNCERTAIN. Reply ONLY in this format:\n\
VERDICT: <TRUE/FALSE/UNCERTAIN>\n\
EXPLANATION: <one short sentence>\n\
POINTERS: <only when the verdict is UNCERTAIN: a short bulleted list of questions a careful \
reader should ask about this claim>";

/// Max length of an error message surfaced to the user.
const ERROR_PREVIEW_BYTES: usize = 100;

static VERDICT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)VERDICT:\s*(TRUE|FALSE|UNCERTAIN)").expect("valid regex"));
static EXPLANATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)EXPLANATION:\s*(.*?)\s*(?:POINTERS:|$)").expect("valid regex")
});
static POINTERS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)POINTERS:\s*(.*)$").expect("valid regex"));

// --- VerdictService trait ---

/// Classifies a claim (or URL-expanded context) into a verdict. Never fails
/// at the domain level: external errors come back as `Verdict::Unavailable`
/// with a diagnostic explanation.
#[async_trait]
pub trait VerdictService: Send + Sync {
    async fn classify(&self, context: &str) -> VerdictResult;
}

// --- LLM-backed engine ---

pub struct AiVerdictEngine {
    ai: Arc<OpenAi>,
}

impl AiVerdictEngine {
    pub fn new(ai: Arc<OpenAi>) -> Self {
        Self { ai }
    }
}

#[async_trait]
impl VerdictService for AiVerdictEngine {
    async fn classify(&self, context: &str) -> VerdictResult {
        let reply = self
            .ai
            .prompt(format!("CLAIM:\n{context}"))
            .preamble(VERDICT_SYSTEM_PROMPT)
            .temperature(0.1)
            .max_tokens(300)
            .send()
            .await;

        match reply {
            Ok(text) => from_reply(&text),
            Err(e) => {
                warn!(error = %e, "AI verification unavailable");
                let message = e.to_string();
                let diagnostic = format!(
                    "AI verification failed: {}",
                    truncate_to_char_boundary(&message, ERROR_PREVIEW_BYTES)
                );
                VerdictResult {
                    verdict: Verdict::Unavailable,
                    explanation: diagnostic.clone(),
                    report: diagnostic,
                    pointers: Vec::new(),
                }
            }
        }
    }
}

// --- Reply parsing ---

/// Result of parsing one raw reply. `Unparseable` (no `VERDICT:` marker at
/// all) is kept distinct from a reply that parsed to an uncertain verdict.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyOutcome {
    Parsed {
        verdict: Verdict,
        explanation: String,
        pointers: Vec<String>,
    },
    Unparseable {
        raw: String,
    },
}

/// Permissive split on the literal field markers. Markers are matched
/// case-insensitively; `EXPLANATION:` falls back to the whole reply and
/// `POINTERS:` to an empty list when absent.
pub fn parse_reply(text: &str) -> ReplyOutcome {
    let trimmed = text.trim();

    let Some(caps) = VERDICT_RE.captures(trimmed) else {
        return ReplyOutcome::Unparseable {
            raw: trimmed.to_string(),
        };
    };
    let verdict = match caps[1].to_uppercase().as_str() {
        "TRUE" => Verdict::True,
        "FALSE" => Verdict::False,
        _ => Verdict::Uncertain,
    };

    let explanation = EXPLANATION_RE
        .captures(trimmed)
        .map(|c| c[1].trim().to_string())
        .unwrap_or_else(|| trimmed.to_string());

    let pointers = POINTERS_RE
        .captures(trimmed)
        .map(|c| parse_pointer_lines(&c[1]))
        .unwrap_or_default();

    ReplyOutcome::Parsed {
        verdict,
        explanation,
        pointers,
    }
}

/// Map a raw reply to the engine's result. Pointers survive only for
/// uncertain verdicts; an unparseable reply scores as uncertain with the
/// whole reply as explanation.
pub fn from_reply(text: &str) -> VerdictResult {
    match parse_reply(text) {
        ReplyOutcome::Parsed {
            verdict,
            explanation,
            mut pointers,
        } => {
            if verdict != Verdict::Uncertain {
                pointers.clear();
            }
            VerdictResult {
                verdict,
                explanation,
                report: text.trim().to_string(),
                pointers,
            }
        }
        ReplyOutcome::Unparseable { raw } => VerdictResult {
            verdict: Verdict::Uncertain,
            explanation: raw.clone(),
            report: raw,
            pointers: Vec::new(),
        },
    }
}

fn parse_pointer_lines(section: &str) -> Vec<String> {
    section
        .lines()
        .map(strip_bullet)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

// Tolerate "-", "*", "•", and "1." / "1)" list styles.
fn strip_bullet(line: &str) -> &str {
    let line = line.trim().trim_start_matches(['-', '*', '•']);
    let line = line.trim_start();
    let after_digits = line.trim_start_matches(|c: char| c.is_ascii_digit());
    if after_digits.len() < line.len() {
        after_digits.trim_start_matches(['.', ')']).trim()
    } else {
        line.trim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_uncertain_reply() {
        let reply = "VERDICT: UNCERTAIN\nEXPLANATION: No reliable source confirms this.\nPOINTERS:\n- Who reported it first?\n- Is there a primary document?";
        match parse_reply(reply) {
            ReplyOutcome::Parsed {
                verdict,
                explanation,
                pointers,
            } => {
                assert_eq!(verdict, Verdict::Uncertain);
                assert_eq!(explanation, "No reliable source confirms this.");
                assert_eq!(
                    pointers,
                    vec!["Who reported it first?", "Is there a primary document?"]
                );
            }
            other => panic!("expected parsed reply, got {other:?}"),
        }
    }

    #[test]
    fn parses_lowercase_markers() {
        let reply = "verdict: false\nexplanation: Contradicted by official records.";
        match parse_reply(reply) {
            ReplyOutcome::Parsed {
                verdict,
                explanation,
                pointers,
            } => {
                assert_eq!(verdict, Verdict::False);
                assert_eq!(explanation, "Contradicted by official records.");
                assert!(pointers.is_empty());
            }
            other => panic!("expected parsed reply, got {other:?}"),
        }
    }

    #[test]
    fn missing_verdict_marker_is_unparseable_not_uncertain() {
        let reply = "I cannot classify this claim.";
        assert_eq!(
            parse_reply(reply),
            ReplyOutcome::Unparseable {
                raw: reply.to_string()
            }
        );
    }

    #[test]
    fn unknown_verdict_word_is_unparseable() {
        let reply = "VERDICT: MAYBE\nEXPLANATION: Hard to say.";
        assert!(matches!(
            parse_reply(reply),
            ReplyOutcome::Unparseable { .. }
        ));
    }

    #[test]
    fn missing_explanation_falls_back_to_whole_reply() {
        let reply = "VERDICT: TRUE";
        match parse_reply(reply) {
            ReplyOutcome::Parsed { explanation, .. } => assert_eq!(explanation, reply),
            other => panic!("expected parsed reply, got {other:?}"),
        }
    }

    #[test]
    fn numbered_pointers_are_stripped() {
        let reply = "VERDICT: UNCERTAIN\nEXPLANATION: Unclear.\nPOINTERS:\n1. First question\n2) Second question";
        match parse_reply(reply) {
            ReplyOutcome::Parsed { pointers, .. } => {
                assert_eq!(pointers, vec!["First question", "Second question"]);
            }
            other => panic!("expected parsed reply, got {other:?}"),
        }
    }

    #[test]
    fn from_reply_clears_pointers_on_resolved_verdicts() {
        let reply = "VERDICT: TRUE\nEXPLANATION: Well documented.\nPOINTERS:\n- Should not survive";
        let result = from_reply(reply);
        assert_eq!(result.verdict, Verdict::True);
        assert!(result.pointers.is_empty());
        assert_eq!(result.report, reply);
    }

    #[test]
    fn from_reply_keeps_pointers_when_uncertain() {
        let reply = "VERDICT: UNCERTAIN\nEXPLANATION: Unclear.\nPOINTERS:\n- Check the date";
        let result = from_reply(reply);
        assert_eq!(result.verdict, Verdict::Uncertain);
        assert_eq!(result.pointers, vec!["Check the date"]);
    }

    #[test]
    fn from_reply_maps_unparseable_to_uncertain() {
        let result = from_reply("complete nonsense");
        assert_eq!(result.verdict, Verdict::Uncertain);
        assert_eq!(result.explanation, "complete nonsense");
        assert!(result.pointers.is_empty());
    }
}
