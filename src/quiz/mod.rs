pub mod decode;
pub mod error;
pub mod fallback;
pub mod generator;
pub mod prompt;
pub mod provider;
pub mod tracker;
pub mod validator;

use std::fmt;
use std::str::FromStr;

use sha2::{Digest, Sha256};

pub use error::{DecodeError, GenerationError, ValidationError};

pub const OPTION_COUNT: usize = 4;
pub const OPTION_LABELS: [char; OPTION_COUNT] = ['A', 'B', 'C', 'D'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subject {
    English,
    GK,
}

impl Subject {
    pub const ALL: [Subject; 2] = [Subject::English, Subject::GK];

    pub fn as_str(&self) -> &'static str {
        match self {
            Subject::English => "English",
            Subject::GK => "GK",
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Subject {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "English" => Ok(Subject::English),
            "GK" => Ok(Subject::GK),
            other => Err(format!("unknown subject '{}'", other)),
        }
    }
}

/// A structurally valid multiple-choice question.
///
/// The only ways to obtain one are [`Question::new`], the validator, or the
/// built-in placeholders, so holding a `Question` means all four fields are
/// non-empty and `correct_index` points at one of the four options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    text: String,
    options: [String; OPTION_COUNT],
    correct_index: usize,
    explanation: String,
}

impl Question {
    pub fn new(
        text: impl Into<String>,
        options: [String; OPTION_COUNT],
        correct_index: usize,
        explanation: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        if correct_index >= OPTION_COUNT {
            return Err(ValidationError::CorrectIndexOutOfRange(correct_index as i64));
        }

        let text = non_empty("question", text.into())?;
        let explanation = non_empty("explanation", explanation.into())?;
        let [a, b, c, d] = options;
        let options = [
            non_empty("options[0]", a)?,
            non_empty("options[1]", b)?,
            non_empty("options[2]", c)?,
            non_empty("options[3]", d)?,
        ];

        Ok(Self {
            text,
            options,
            correct_index,
            explanation,
        })
    }

    /// Placeholder served when every generation attempt failed.
    pub fn sentinel() -> Self {
        Self {
            text: "⚠️ Could not generate a question right now. Please try again.".to_string(),
            options: std::array::from_fn(|_| RETRY_OPTION.to_string()),
            correct_index: 0,
            explanation: "The question service is busy. Tap Next Question to try again."
                .to_string(),
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.options.iter().all(|o| o == RETRY_OPTION)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn options(&self) -> &[String; OPTION_COUNT] {
        &self.options
    }

    pub fn correct_index(&self) -> usize {
        self.correct_index
    }

    pub fn correct_option(&self) -> &str {
        &self.options[self.correct_index]
    }

    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of(&self.text)
    }
}

pub const RETRY_OPTION: &str = "🔄 Try again";

fn non_empty(field: &'static str, value: String) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField(field.to_string()));
    }
    Ok(trimmed.to_string())
}

/// Content hash of a question's text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn of(text: &str) -> Self {
        let digest = Sha256::digest(text.trim().as_bytes());
        Self(format!("{:x}", digest))
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form is enough for log lines
        f.write_str(&self.0[..12])
    }
}
