use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use spider_transformations::transformation::content::{
    transform_content_input, ReturnFormat, TransformConfig, TransformInput,
};
use tracing::{info, warn};

use crisissafe_common::CrisisSafeError;

// --- ArticleFetcher trait ---

#[async_trait]
pub trait ArticleFetcher: Send + Sync {
    /// Fetch the readable plain-text body of a page, or fail.
    async fn fetch(&self, url: &str) -> Result<String>;
}

// --- HTTP + Readability fetcher ---

/// Fetches a page over plain HTTP and runs Readability extraction to get the
/// main article content. Claims rarely point at JS-only pages, so no browser
/// is involved.
pub struct HttpFetcher {
    http: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArticleFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let parsed = url::Url::parse(url).context("Invalid URL")?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(CrisisSafeError::Fetch(format!(
                "Only http/https URLs are allowed, got: {}",
                parsed.scheme()
            ))
            .into());
        }

        info!(url, "Fetching article");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .context("Article request failed")?;

        if !response.status().is_success() {
            return Err(CrisisSafeError::Fetch(format!(
                "Article request returned {}",
                response.status()
            ))
            .into());
        }

        let html = response.text().await.context("Failed to read article body")?;

        let config = TransformConfig {
            readability: true,
            main_content: true,
            return_format: ReturnFormat::Markdown,
            filter_images: true,
            filter_svg: true,
            clean_html: true,
        };
        let input = TransformInput {
            url: Some(&parsed),
            content: html.as_bytes(),
            screenshot_bytes: None,
            encoding: None,
            selector_config: None,
            ignore_tags: None,
        };

        let text = transform_content_input(input, &config);

        if text.trim().is_empty() {
            warn!(url, "Empty content after readability extraction");
            return Err(CrisisSafeError::Fetch("Empty article body".to_string()).into());
        }

        info!(url, bytes = text.len(), "Article extracted");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rejects_non_http_schemes() {
        let fetcher = HttpFetcher::new();
        let err = fetcher.fetch("ftp://example.com/file").await.unwrap_err();
        assert!(err.to_string().contains("http/https"));
    }

    #[tokio::test]
    async fn rejects_unparseable_urls() {
        let fetcher = HttpFetcher::new();
        assert!(fetcher.fetch("not a url").await.is_err());
    }
}
