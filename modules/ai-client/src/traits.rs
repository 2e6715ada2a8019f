use anyhow::Result;
use async_trait::async_trait;

// =============================================================================
// PromptBuilder Trait
// =============================================================================

/// Builder for a single text completion request. Providers implement this so
/// callers can compose a prompt without knowing the wire format.
#[async_trait]
pub trait PromptBuilder: Send + Sized {
    fn preamble(self, preamble: impl Into<String>) -> Self;
    fn temperature(self, temperature: f32) -> Self;
    fn max_tokens(self, max_tokens: u32) -> Self;
    async fn send(self) -> Result<String>;
}
