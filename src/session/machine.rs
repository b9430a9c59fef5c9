use std::sync::Arc;

use log::{debug, info, warn};
use teloxide::types::UserId;

use super::{QuizSession, ScoreSummary, SessionError, SessionStore};
use crate::quiz::generator::QuestionGenerator;
use crate::quiz::{Question, Subject, OPTION_COUNT, OPTION_LABELS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizEvent {
    ChooseSubject(Subject),
    RequestNext,
    SubmitAnswer(usize),
    BackToMenu,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledChoice {
    pub label: char,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryAffordance {
    /// Pick a subject again
    RestartSubject,
    ReturnToMenu,
}

/// What the transport should show after an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Render {
    ShowMenu {
        score_summary: Option<ScoreSummary>,
    },
    ShowQuestion {
        text: String,
        choices: [LabeledChoice; OPTION_COUNT],
    },
    ShowResult {
        correct: bool,
        selected_index: usize,
        selected_choice_text: String,
        correct_index: usize,
        correct_choice_text: String,
        explanation: String,
        score_summary: ScoreSummary,
    },
    ShowError {
        message: String,
        retry: RetryAffordance,
    },
}

impl Render {
    fn question(question: &Question) -> Self {
        Render::ShowQuestion {
            text: question.text().to_string(),
            choices: std::array::from_fn(|i| LabeledChoice {
                label: OPTION_LABELS[i],
                text: question.options()[i].clone(),
            }),
        }
    }

    fn error(err: SessionError) -> Self {
        let retry = match err {
            SessionError::Expired => RetryAffordance::RestartSubject,
            SessionError::InvalidChoice(_) => RetryAffordance::ReturnToMenu,
        };
        Render::ShowError {
            message: err.to_string(),
            retry,
        }
    }
}

/// Applies quiz events to per-user sessions.
///
/// Every event for a user runs under that user's session lock, including the
/// wait on the question provider, so a user's events are applied one at a
/// time in arrival order.
pub struct QuizMachine {
    sessions: SessionStore,
    generator: Arc<QuestionGenerator>,
}

impl QuizMachine {
    pub fn new(generator: Arc<QuestionGenerator>) -> Self {
        Self {
            sessions: SessionStore::new(),
            generator,
        }
    }

    pub async fn handle(&self, user: UserId, event: QuizEvent) -> Render {
        debug!("User {} -> {:?}", user.0, event);
        let mut session = self.sessions.lock(user).await;

        match event {
            QuizEvent::ChooseSubject(subject) => {
                info!("User {} chose {}", user.0, subject);
                *session = Some(QuizSession::new(subject));
                self.next_question(user, &mut session).await
            }
            QuizEvent::RequestNext => self.next_question(user, &mut session).await,
            QuizEvent::SubmitAnswer(selected) => {
                let Some(current) = session.as_mut() else {
                    return Render::error(SessionError::Expired);
                };
                match current.answer(selected) {
                    Ok(answered) => {
                        let question = &answered.question;
                        Render::ShowResult {
                            correct: answered.correct,
                            selected_index: answered.selected,
                            selected_choice_text: question.options()[answered.selected].clone(),
                            correct_index: question.correct_index(),
                            correct_choice_text: question.correct_option().to_string(),
                            explanation: question.explanation().to_string(),
                            score_summary: answered.summary,
                        }
                    }
                    Err(e) => Render::error(e),
                }
            }
            QuizEvent::BackToMenu => Render::ShowMenu {
                score_summary: session.as_ref().map(QuizSession::summary),
            },
        }
    }

    async fn next_question(&self, user: UserId, session: &mut Option<QuizSession>) -> Render {
        let Some(current) = session.as_mut() else {
            return Render::error(SessionError::Expired);
        };
        let question = self.generator.generate(current.subject(), user).await;
        if question.is_sentinel() {
            warn!("Showing the retry placeholder to user {}", user.0);
        }
        let render = Render::question(&question);
        current.show(question);
        render
    }

    pub async fn session(&self, user: UserId) -> Option<QuizSession> {
        self.sessions.snapshot(user).await
    }
}
