use std::sync::LazyLock;

use ai_client::OpenAi;
use regex::Regex;
use tracing::{debug, warn};

use crisissafe_common::{ArticleRef, Verdict};

use crate::search::WebSearcher;

/// At most this many related articles per analysis.
const MAX_RELATED: usize = 3;
/// How many raw results to request before script filtering.
const SEARCH_POOL: usize = 5;
/// A highlighted snippet may not drift from the original by more than this
/// many characters once the markers are removed.
const HIGHLIGHT_DRIFT_LIMIT: usize = 100;

const HIGHLIGHT_SYSTEM_PROMPT: &str = "You copy text verbatim, wrapping exactly one sentence, \
the one most relevant to the reader's claim, in <mark> and </mark>. Do not rewrite, add, or \
remove anything else. Output only the text.";

static CJK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\p{Han}\p{Hiragana}\p{Katakana}\p{Hangul}]").expect("valid regex")
});

/// True when the text contains CJK-script characters.
pub fn has_cjk(text: &str) -> bool {
    CJK_RE.is_match(text)
}

/// Search query biased toward the resolved verdict for relevance ranking.
pub fn biased_query(claim: &str, verdict: Verdict) -> String {
    match verdict {
        Verdict::False => format!("{claim} debunked fact check"),
        Verdict::True => format!("{claim} evidence sources"),
        Verdict::Uncertain | Verdict::Unavailable => format!("{claim} fact check"),
    }
}

/// Accept a marked snippet only if it wraps exactly one span and did not
/// drift from the original text (the external call may rewrite instead of
/// mark; that drift is what the length guard rejects).
pub fn validate_highlight(original: &str, marked: &str) -> Option<String> {
    let opens = marked.matches("<mark>").count();
    let closes = marked.matches("</mark>").count();
    if opens != 1 || closes != 1 {
        return None;
    }
    let stripped = marked.replace("<mark>", "").replace("</mark>", "");
    let drift = stripped
        .chars()
        .count()
        .abs_diff(original.chars().count());
    (drift <= HIGHLIGHT_DRIFT_LIMIT).then(|| marked.trim().to_string())
}

/// Gather up to three related articles for a claim. Search failure degrades
/// to an empty list; a failed or rejected highlight pass falls back to the
/// unmarked snippet.
pub async fn gather(
    claim: &str,
    verdict: Verdict,
    searcher: &dyn WebSearcher,
    highlighter: Option<&OpenAi>,
) -> Vec<ArticleRef> {
    let query = biased_query(claim, verdict);
    let results = match searcher.search(&query, SEARCH_POOL).await {
        Ok(results) => results,
        Err(e) => {
            warn!(error = %e, "Related-article search failed");
            return Vec::new();
        }
    };

    let mut articles = Vec::new();
    for result in results {
        if has_cjk(&result.title) || has_cjk(&result.snippet) {
            debug!(url = result.url, "Skipping CJK-script result");
            continue;
        }

        let highlighted_body = match highlighter {
            Some(ai) => highlight(ai, claim, &result.snippet)
                .await
                .unwrap_or_else(|| result.snippet.clone()),
            None => result.snippet.clone(),
        };

        articles.push(ArticleRef {
            title: result.title,
            url: result.url,
            body: result.snippet,
            highlighted_body,
        });

        if articles.len() >= MAX_RELATED {
            break;
        }
    }
    articles
}

async fn highlight(ai: &OpenAi, claim: &str, snippet: &str) -> Option<String> {
    let reply = ai
        .chat_completion(
            HIGHLIGHT_SYSTEM_PROMPT,
            format!("CLAIM: {claim}\n\nTEXT:\n{snippet}"),
        )
        .await;
    match reply {
        Ok(marked) => validate_highlight(snippet, &marked),
        Err(e) => {
            warn!(error = %e, "Highlight pass failed, using unmarked snippet");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{NoopSearcher, SearchResult};
    use anyhow::Result;
    use async_trait::async_trait;

    struct StaticSearcher(Vec<SearchResult>);

    #[async_trait]
    impl WebSearcher for StaticSearcher {
        async fn search(&self, _query: &str, _max: usize) -> Result<Vec<SearchResult>> {
            Ok(self.0.clone())
        }
    }

    fn result(title: &str, snippet: &str) -> SearchResult {
        SearchResult {
            url: format!("https://example.com/{}", title.to_lowercase()),
            title: title.to_string(),
            snippet: snippet.to_string(),
        }
    }

    #[test]
    fn detects_cjk_scripts() {
        assert!(has_cjk("新型コロナウイルス"));
        assert!(has_cjk("코로나 바이러스"));
        assert!(has_cjk("新冠病毒"));
        assert!(!has_cjk("plain latin text"));
        assert!(!has_cjk("кириллица"));
    }

    #[test]
    fn query_is_biased_by_verdict() {
        assert!(biased_query("claim", Verdict::False).contains("debunked"));
        assert!(biased_query("claim", Verdict::True).contains("evidence"));
        assert!(biased_query("claim", Verdict::Uncertain).ends_with("fact check"));
    }

    #[test]
    fn highlight_with_one_span_is_accepted() {
        let original = "First sentence. Second sentence.";
        let marked = "First sentence. <mark>Second sentence.</mark>";
        assert_eq!(
            validate_highlight(original, marked).as_deref(),
            Some(marked)
        );
    }

    #[test]
    fn highlight_with_two_spans_is_rejected() {
        let original = "One. Two.";
        let marked = "<mark>One.</mark> <mark>Two.</mark>";
        assert!(validate_highlight(original, marked).is_none());
    }

    #[test]
    fn highlight_without_markers_is_rejected() {
        assert!(validate_highlight("Some text.", "Some text.").is_none());
    }

    #[test]
    fn rewritten_highlight_is_rejected() {
        let original = "Short snippet.";
        let rewritten = format!("<mark>{}</mark>", "x".repeat(200));
        assert!(validate_highlight(original, &rewritten).is_none());
    }

    #[tokio::test]
    async fn keeps_at_most_three_and_filters_cjk() {
        let searcher = StaticSearcher(vec![
            result("First", "About the claim."),
            result("新冠病毒", "中文内容"),
            result("Second", "More about the claim."),
            result("Third", "Even more."),
            result("Fourth", "Past the cap."),
        ]);

        let articles = gather("some claim", Verdict::Uncertain, &searcher, None).await;

        assert_eq!(articles.len(), 3);
        assert!(articles.iter().all(|a| !has_cjk(&a.title)));
        // Without a highlighter, the body is carried over unmarked.
        assert!(articles.iter().all(|a| a.highlighted_body == a.body));
    }

    #[tokio::test]
    async fn empty_search_yields_no_articles() {
        let articles = gather("some claim", Verdict::True, &NoopSearcher, None).await;
        assert!(articles.is_empty());
    }
}
