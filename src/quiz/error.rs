use std::time::Duration;

use thiserror::Error;

use super::provider::ProviderError;
use super::Fingerprint;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("no JSON object found in provider output")]
    NoJsonObject,
    #[error("malformed JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing key '{0}'")]
    MissingKey(&'static str),
    #[error("expected 4 options, got {0}")]
    WrongOptionCount(usize),
    #[error("'correct' is not an integer")]
    CorrectIndexNotInteger,
    #[error("'correct' = {0} is outside 0..=3")]
    CorrectIndexOutOfRange(i64),
    #[error("field '{0}' is not a string")]
    NotAString(String),
    #[error("field '{0}' is empty")]
    EmptyField(String),
}

/// Why a single generation attempt produced nothing usable.
///
/// Everything except `ExhaustedRetries` is recovered inside the generator by
/// moving on to the next attempt.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("provider error: {0}")]
    Transport(#[from] ProviderError),
    #[error("provider did not answer within {0:?}")]
    Timeout(Duration),
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
    #[error("invalid question: {0}")]
    Validation(#[from] ValidationError),
    #[error("question {0} was already served to this user")]
    Duplicate(Fingerprint),
    #[error("no usable question after {attempts} attempts")]
    ExhaustedRetries { attempts: u32 },
}
