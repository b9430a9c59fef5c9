pub mod machine;
pub mod store;

use std::fmt;

use thiserror::Error;

use crate::quiz::{Question, Subject, OPTION_COUNT};

pub use machine::{QuizEvent, QuizMachine, Render, RetryAffordance};
pub use store::{SessionGuard, SessionStore};

/// Quiz progress for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSession {
    subject: Subject,
    score: u32,
    total: u32,
    pending: Option<Question>,
}

impl QuizSession {
    pub fn new(subject: Subject) -> Self {
        Self {
            subject,
            score: 0,
            total: 0,
            pending: None,
        }
    }

    pub fn subject(&self) -> Subject {
        self.subject
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn pending(&self) -> Option<&Question> {
        self.pending.as_ref()
    }

    pub fn summary(&self) -> ScoreSummary {
        ScoreSummary {
            score: self.score,
            total: self.total,
        }
    }

    pub fn show(&mut self, question: Question) {
        self.pending = Some(question);
    }

    /// Scores an answer against the pending question.
    ///
    /// The question stays pending afterwards; only the next generation
    /// replaces it. Answers to the retry placeholder are not scored.
    pub fn answer(&mut self, selected: usize) -> Result<Answered, SessionError> {
        let question = self.pending.as_ref().ok_or(SessionError::Expired)?;
        if selected >= OPTION_COUNT {
            return Err(SessionError::InvalidChoice(selected));
        }

        let correct = selected == question.correct_index();
        if !question.is_sentinel() {
            self.total += 1;
            if correct {
                self.score += 1;
            }
        }

        Ok(Answered {
            correct,
            selected,
            question: question.clone(),
            summary: self.summary(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answered {
    pub correct: bool,
    pub selected: usize,
    pub question: Question,
    pub summary: ScoreSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreSummary {
    pub score: u32,
    pub total: u32,
}

impl fmt::Display for ScoreSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.score, self.total)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("⚠️ Session expired. Please /start again.")]
    Expired,
    #[error("⚠️ Option {0} is not one of the choices.")]
    InvalidChoice(usize),
}
