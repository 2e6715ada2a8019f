use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // AI provider
    pub openai_api_key: String,
    pub ai_base_url: Option<String>,
    pub ai_model: String,

    // Related-article search (optional; missing key disables search)
    pub serper_api_key: Option<String>,

    // Archive
    pub archive_path: String,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        Self {
            openai_api_key: required_env("OPENAI_API_KEY"),
            ai_base_url: env::var("AI_BASE_URL").ok(),
            ai_model: env::var("AI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            serper_api_key: env::var("SERPER_API_KEY").ok(),
            archive_path: env::var("ARCHIVE_PATH")
                .unwrap_or_else(|_| "analysis_archive.json".to_string()),
        }
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}
