use std::sync::Arc;

use ai_client::OpenAi;
use tracing::info;

use crisissafe_archive::{Archive, Normalizer};
use crisissafe_common::Config;

use crate::fetch::{ArticleFetcher, HttpFetcher};
use crate::search::{NoopSearcher, SerperSearcher, WebSearcher};
use crate::subjectivity::{LexiconScorer, SubjectivityScorer};
use crate::verdict::{AiVerdictEngine, VerdictService};

/// Dependency container passed into the pipeline. Built once by the
/// composition root; collaborators are injected rather than reached for as
/// globals, so tests can swap any of them.
pub struct Deps {
    pub verdicts: Arc<dyn VerdictService>,
    pub fetcher: Arc<dyn ArticleFetcher>,
    pub searcher: Arc<dyn WebSearcher>,
    pub subjectivity: Arc<dyn SubjectivityScorer>,
    /// LLM handle for the related-article highlight pass; `None` disables
    /// highlighting (snippets stay unmarked).
    pub highlighter: Option<Arc<OpenAi>>,
    pub archive: Archive,
}

impl Deps {
    pub fn from_config(config: &Config) -> Self {
        let mut ai = OpenAi::new(&config.openai_api_key, &config.ai_model);
        if let Some(ref base_url) = config.ai_base_url {
            ai = ai.with_base_url(base_url);
        }
        let ai = Arc::new(ai);

        let searcher: Arc<dyn WebSearcher> = match config.serper_api_key {
            Some(ref key) => Arc::new(SerperSearcher::new(key)),
            None => {
                info!("No SERPER_API_KEY configured, related-article search disabled");
                Arc::new(NoopSearcher)
            }
        };

        Self {
            verdicts: Arc::new(AiVerdictEngine::new(ai.clone())),
            fetcher: Arc::new(HttpFetcher::new()),
            searcher,
            subjectivity: Arc::new(LexiconScorer),
            highlighter: Some(ai.clone()),
            archive: Archive::new(&config.archive_path, Normalizer::new(Some(ai))),
        }
    }
}
