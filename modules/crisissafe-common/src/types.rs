use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// --- Verdict ---

/// Outcome of the external fact-check classification.
/// `Unavailable` means the external call failed; it is scored differently
/// from `False` and is never persisted as a checklist value of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    True,
    False,
    Uncertain,
    Unavailable,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::True => write!(f, "true"),
            Verdict::False => write!(f, "false"),
            Verdict::Uncertain => write!(f, "uncertain"),
            Verdict::Unavailable => write!(f, "unavailable"),
        }
    }
}

// --- Checklist ---

/// Status of one verification check. Four states, all explicit: the archive
/// wire format is `true` / `false` / `"uncertain"` / `null`, so the custom
/// serde below keeps stored files readable by anything that expects that
/// shape while the enum keeps `NotApplicable` visible in the type system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckStatus {
    Pass,
    Fail,
    Uncertain,
    #[default]
    NotApplicable,
}

impl CheckStatus {
    pub fn from_bool(pass: bool) -> Self {
        if pass {
            CheckStatus::Pass
        } else {
            CheckStatus::Fail
        }
    }
}

impl Serialize for CheckStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CheckStatus::Pass => serializer.serialize_bool(true),
            CheckStatus::Fail => serializer.serialize_bool(false),
            CheckStatus::Uncertain => serializer.serialize_str("uncertain"),
            CheckStatus::NotApplicable => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for CheckStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Option::<serde_json::Value>::deserialize(deserializer)?;
        match value {
            None | Some(serde_json::Value::Null) => Ok(CheckStatus::NotApplicable),
            Some(serde_json::Value::Bool(true)) => Ok(CheckStatus::Pass),
            Some(serde_json::Value::Bool(false)) => Ok(CheckStatus::Fail),
            Some(serde_json::Value::String(ref s)) if s == "uncertain" => {
                Ok(CheckStatus::Uncertain)
            }
            Some(other) => Err(D::Error::custom(format!(
                "invalid check status: {other}"
            ))),
        }
    }
}

/// Per-criterion breakdown shown alongside the score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Checklist {
    #[serde(default)]
    pub objective_language: CheckStatus,
    #[serde(default)]
    pub url_extraction: CheckStatus,
    #[serde(default)]
    pub no_panic_pattern: CheckStatus,
    #[serde(default)]
    pub no_shouting: CheckStatus,
    #[serde(default)]
    pub ai_verification: CheckStatus,
    #[serde(default)]
    pub sanity_check: CheckStatus,
}

impl Checklist {
    /// Checks in display order.
    pub fn entries(&self) -> [(&'static str, CheckStatus); 6] {
        [
            ("objective_language", self.objective_language),
            ("url_extraction", self.url_extraction),
            ("no_panic_pattern", self.no_panic_pattern),
            ("no_shouting", self.no_shouting),
            ("ai_verification", self.ai_verification),
            ("sanity_check", self.sanity_check),
        ]
    }
}

// --- Text Signals ---

/// Deterministic textual signals computed once per request.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSignals {
    /// Subjectivity in [0, 1] from the sentiment collaborator.
    pub subjectivity_score: f32,
    pub is_subjective: bool,
    pub has_panic_pattern: bool,
    pub has_shouting: bool,
    pub has_excessive_caps: bool,
    /// First http(s) URL found in the text, if any.
    pub url: Option<String>,
}

// --- Verdict Engine Output ---

#[derive(Debug, Clone, PartialEq)]
pub struct VerdictResult {
    pub verdict: Verdict,
    /// One-sentence explanation parsed from the reply (or a diagnostic when
    /// the external call failed).
    pub explanation: String,
    /// Raw reply text as received, for the user-facing AI report.
    pub report: String,
    /// Discussion pointers; non-empty only when the verdict is `Uncertain`.
    pub pointers: Vec<String>,
}

// --- Related Articles ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRef {
    pub title: String,
    pub url: String,
    pub body: String,
    /// Body with at most one sentence wrapped in `<mark>…</mark>`.
    pub highlighted_body: String,
}

// --- Analysis Result ---

/// The unit persisted in the archive and returned to callers.
/// `related_articles` and `pointers` default to empty so entries written
/// before those fields existed still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub score: u8,
    pub flags: Vec<String>,
    pub ai_report: String,
    pub is_subjective: bool,
    pub checklist: Checklist,
    #[serde(default)]
    pub related_articles: Vec<ArticleRef>,
    #[serde(default)]
    pub pointers: Vec<String>,
}

/// Pipeline output: the analysis plus the transient served-from-cache
/// marker, which is never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub result: AnalysisResult,
    pub from_archive: bool,
}
