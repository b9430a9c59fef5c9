use std::time::Duration;

use async_trait::async_trait;
use chatgpt::prelude::*;
use chatgpt::types::CompletionResponse;

use super::{ProviderError, SamplingConfig, TextProvider};

/// OpenAI chat completions through `chatgpt_rs`.
///
/// The client bakes its sampling settings in at construction, so the
/// per-call `SamplingConfig` is only checked against what we were built with.
pub struct ChatGptProvider {
    chat_gpt: ChatGPT,
    sampling: SamplingConfig,
}

impl ChatGptProvider {
    pub fn new(
        api_key: String,
        sampling: SamplingConfig,
        timeout: Duration,
    ) -> std::result::Result<Self, ProviderError> {
        let mut chat_gpt = ChatGPT::new(api_key)
            .map_err(|e| ProviderError::unknown(format!("Unable to connect with ChatGPT: {}", e)))?;

        chat_gpt.config.engine = ChatGPTEngine::Gpt35Turbo;
        chat_gpt.config.timeout = timeout;
        chat_gpt.config.temperature = sampling.temperature;
        chat_gpt.config.top_p = sampling.top_p;

        Ok(Self { chat_gpt, sampling })
    }
}

#[async_trait]
impl TextProvider for ChatGptProvider {
    async fn generate_text(
        &self,
        prompt: &str,
        sampling: &SamplingConfig,
    ) -> std::result::Result<String, ProviderError> {
        if *sampling != self.sampling {
            log::debug!("ChatGPT ignores per-call sampling overrides, using {:?}", self.sampling);
        }

        let response: CompletionResponse = self
            .chat_gpt
            .send_message(prompt)
            .await
            .map_err(|e| ProviderError::network(format!("ChatGPT request failed: {}", e)))?;
        let content = response.message().clone().content;

        log::debug!("Completion: {:?}", content);

        if content.trim().is_empty() {
            return Err(ProviderError::empty_response("ChatGPT returned an empty message"));
        }
        Ok(content)
    }

    fn name(&self) -> &str {
        "chatgpt"
    }
}
