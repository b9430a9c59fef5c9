use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};
use teloxide::types::UserId;

use super::decode::decode;
use super::fallback::FallbackPolicy;
use super::prompt::{GenerationRequest, PromptBuilder};
use super::provider::{SamplingConfig, TextProvider};
use super::tracker::{DuplicateTracker, DEFAULT_HISTORY_CAPACITY};
use super::validator::validate;
use super::{GenerationError, Question, Subject};

pub const MAX_ATTEMPTS_LIMIT: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub attempt_timeout: Duration,
    pub retry_delay: Duration,
}

impl RetryPolicy {
    /// Linear back-off: the n-th failure waits n times the base delay.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.retry_delay * attempt
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            attempt_timeout: Duration::from_secs(15),
            retry_delay: Duration::from_millis(500),
        }
    }
}

/// Attempt counter for a single `generate` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attempts {
    used: u32,
    max: u32,
}

impl Attempts {
    pub fn new(max: u32) -> Self {
        Self {
            used: 0,
            max: max.clamp(1, MAX_ATTEMPTS_LIMIT),
        }
    }

    /// Starts the next attempt, returning its 1-based number, or `None` once
    /// the budget is spent.
    pub fn next_attempt(&mut self) -> Option<u32> {
        if self.used >= self.max {
            return None;
        }
        self.used += 1;
        Some(self.used)
    }

    pub fn is_exhausted(&self) -> bool {
        self.used >= self.max
    }

    pub fn used(&self) -> u32 {
        self.used
    }

    pub fn max(&self) -> u32 {
        self.max
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GeneratorConfig {
    pub sampling: SamplingConfig,
    pub retry: RetryPolicy,
    pub fallback: FallbackPolicy,
    pub history_capacity: usize,
}

impl GeneratorConfig {
    fn history_capacity(&self) -> usize {
        if self.history_capacity == 0 {
            DEFAULT_HISTORY_CAPACITY
        } else {
            self.history_capacity
        }
    }
}

pub struct QuestionGenerator {
    provider: Arc<dyn TextProvider>,
    prompts: PromptBuilder,
    tracker: DuplicateTracker,
    sampling: SamplingConfig,
    retry: RetryPolicy,
    fallback: FallbackPolicy,
}

impl QuestionGenerator {
    pub fn new(provider: Arc<dyn TextProvider>, config: GeneratorConfig) -> Self {
        Self {
            provider,
            prompts: PromptBuilder,
            tracker: DuplicateTracker::new(config.history_capacity()),
            sampling: config.sampling,
            retry: config.retry,
            fallback: config.fallback,
        }
    }

    /// Always returns something the user can be shown: a fresh question, or
    /// whatever the fallback policy hands out once the attempts run out.
    pub async fn generate(&self, subject: Subject, user: UserId) -> Question {
        match self.try_generate(subject, user).await {
            Ok(question) => question,
            Err(e) => {
                warn!(
                    "{} for {} question (user {}), using {:?} fallback",
                    e, subject, user.0, self.fallback
                );
                self.fallback.question(subject, user, &self.tracker)
            }
        }
    }

    pub async fn try_generate(
        &self,
        subject: Subject,
        user: UserId,
    ) -> Result<Question, GenerationError> {
        let mut attempts = Attempts::new(self.retry.max_attempts);
        let mut tried_topics: Vec<&'static str> = Vec::new();

        while let Some(attempt) = attempts.next_attempt() {
            let request = self
                .prompts
                .build(subject, &tried_topics, &mut rand::thread_rng());
            tried_topics.push(request.topic);

            match self.attempt(&request, user).await {
                Ok(question) => {
                    info!(
                        "Generated {} question on '{}' via {} (attempt {}/{})",
                        subject,
                        request.topic,
                        self.provider.name(),
                        attempt,
                        attempts.max()
                    );
                    return Ok(question);
                }
                Err(e) => {
                    match &e {
                        GenerationError::Transport(err) if !err.kind.is_transient() => {
                            log::error!("Attempt {}/{}: {}", attempt, attempts.max(), e)
                        }
                        _ => warn!(
                            "Attempt {}/{} on '{}' failed: {}",
                            attempt,
                            attempts.max(),
                            request.topic,
                            e
                        ),
                    }
                    if !attempts.is_exhausted() {
                        tokio::time::sleep(self.retry.delay_after(attempt)).await;
                    }
                }
            }
        }

        Err(GenerationError::ExhaustedRetries {
            attempts: attempts.used(),
        })
    }

    async fn attempt(
        &self,
        request: &GenerationRequest,
        user: UserId,
    ) -> Result<Question, GenerationError> {
        let timeout = self.retry.attempt_timeout;
        let raw = tokio::time::timeout(
            timeout,
            self.provider.generate_text(&request.prompt, &self.sampling),
        )
        .await
        .map_err(|_| GenerationError::Timeout(timeout))??;

        let candidate = decode(&raw)?;
        let question = validate(&candidate)?;

        let fingerprint = question.fingerprint();
        if !self.tracker.is_fresh(user, &fingerprint) {
            return Err(GenerationError::Duplicate(fingerprint));
        }
        self.tracker.record(user, fingerprint);

        Ok(question)
    }

    pub fn tracker(&self) -> &DuplicateTracker {
        &self.tracker
    }
}
