use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::traits::PromptBuilder;

use super::types::*;
use super::OpenAi;

pub struct OpenAiPromptBuilder {
    agent: OpenAi,
    input: String,
    preamble: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl OpenAiPromptBuilder {
    pub(crate) fn new(agent: OpenAi, input: String) -> Self {
        Self {
            agent,
            input,
            preamble: None,
            temperature: None,
            max_tokens: None,
        }
    }
}

#[async_trait]
impl PromptBuilder for OpenAiPromptBuilder {
    fn preamble(mut self, preamble: impl Into<String>) -> Self {
        self.preamble = Some(preamble.into());
        self
    }

    fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    async fn send(self) -> Result<String> {
        let client = self.agent.client();

        let mut messages = Vec::new();
        if let Some(ref preamble) = self.preamble {
            messages.push(WireMessage::system(preamble));
        }
        messages.push(WireMessage::user(&self.input));

        let mut request = ChatRequest::new(&self.agent.model).messages(messages);
        if let Some(temp) = self.temperature {
            request = request.temperature(temp);
        }
        if let Some(max) = self.max_tokens {
            request = request.max_tokens(max);
        }

        let response = client.chat(&request).await?;
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("No choices in response"))?;

        Ok(choice.message.content.unwrap_or_default())
    }
}
