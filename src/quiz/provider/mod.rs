//! Generative-text providers the quiz pulls raw question candidates from.

mod chatgpt;
mod gemini;

pub use chatgpt::ChatGptProvider;
pub use gemini::GeminiProvider;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_tokens: u32,
}

impl Default for SamplingConfig {
    // Hotter than the provider defaults so retries and different users don't
    // get the same phrasing back
    fn default() -> Self {
        Self {
            temperature: 0.9,
            top_p: 0.95,
            top_k: 40,
            max_tokens: 1024,
        }
    }
}

#[async_trait]
pub trait TextProvider: Send + Sync {
    async fn generate_text(
        &self,
        prompt: &str,
        sampling: &SamplingConfig,
    ) -> Result<String, ProviderError>;

    fn name(&self) -> &str;
}

#[derive(Debug, Error)]
#[error("{message}")]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub message: String,
}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Network, message)
    }

    pub fn empty_response(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::EmptyResponse, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Unknown, message)
    }

    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let kind = match status {
            400 => ProviderErrorKind::InvalidRequest,
            401 | 403 => ProviderErrorKind::Auth,
            429 => ProviderErrorKind::RateLimit,
            500..=599 => ProviderErrorKind::ServerError,
            _ => ProviderErrorKind::Unknown,
        };
        Self::new(kind, message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// Network issues, timeouts
    Network,
    /// 429
    RateLimit,
    /// 5xx
    ServerError,
    /// 401, 403
    Auth,
    /// 400
    InvalidRequest,
    /// Succeeded but carried no text
    EmptyResponse,
    Unknown,
}

impl ProviderErrorKind {
    /// Auth and request errors will fail the same way next time; the generator
    /// still spends its attempts on them but logs them louder.
    pub fn is_transient(&self) -> bool {
        !matches!(self, Self::Auth | Self::InvalidRequest)
    }
}
