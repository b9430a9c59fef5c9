//! Telegram side of the quiz: commands, inline buttons and message edits.

use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{InlineKeyboardButton, InlineKeyboardMarkup},
    utils::command::BotCommands,
};

use crate::quiz::Subject;
use crate::session::machine::LabeledChoice;
use crate::session::{QuizEvent, QuizMachine, Render, RetryAffordance};

pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "These commands are supported:")]
pub enum Command {
    #[command(description = "choose a subject and start the quiz.")]
    Start,
    #[command(description = "check that the bot is alive.")]
    Health,
}

const WELCOME_TEXT: &str = "🎓 Welcome to SSC CGL/CHSL Test Bot!

Make learning easy with AI-powered questions!

✨ Features:
• Unlimited unique questions
• Exam-level difficulty
• Detailed explanations
• Score tracking

Select a subject to start:";
const GENERATING_TEXT: &str = "⏳ Generating SSC-level question... Please wait...";
const ALIVE_TEXT: &str = "✅ Bot is alive and running!";

const NEXT_QUESTION: &str = "next_question";
const BACK_TO_MENU: &str = "back_to_menu";
const SUBJECT_PREFIX: &str = "subject_";
const ANSWER_PREFIX: &str = "answer_";

pub fn schema() -> teloxide::dispatching::UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(command_handler),
        )
        .branch(Update::filter_callback_query().endpoint(callback_handler))
}

async fn command_handler(bot: Bot, msg: Message, cmd: Command) -> HandlerResult {
    match cmd {
        Command::Start => {
            bot.send_message(msg.chat.id, WELCOME_TEXT)
                .reply_markup(subject_keyboard())
                .await?;
        }
        Command::Health => {
            bot.send_message(msg.chat.id, ALIVE_TEXT).await?;
        }
    }
    Ok(())
}

async fn callback_handler(bot: Bot, q: CallbackQuery, machine: Arc<QuizMachine>) -> HandlerResult {
    bot.answer_callback_query(q.id.clone()).await?;

    let Some(event) = q.data.as_deref().and_then(parse_callback) else {
        log::warn!("Ignoring unknown callback data {:?} from user {}", q.data, q.from.id.0);
        return Ok(());
    };
    let Some(msg) = q.message else {
        log::warn!("Callback from user {} has no message attached", q.from.id.0);
        return Ok(());
    };

    if matches!(event, QuizEvent::ChooseSubject(_) | QuizEvent::RequestNext) {
        // Generation can take a few seconds; the placeholder is best effort
        if let Err(e) = bot
            .edit_message_text(msg.chat.id, msg.id, GENERATING_TEXT)
            .await
        {
            log::debug!("Could not show the generating placeholder: {}", e);
        }
    }

    let render = machine.handle(q.from.id, event).await;
    let (text, keyboard) = render_message(&render);

    bot.edit_message_text(msg.chat.id, msg.id, text)
        .reply_markup(keyboard)
        .await?;
    Ok(())
}

pub fn parse_callback(data: &str) -> Option<QuizEvent> {
    if let Some(subject) = data.strip_prefix(SUBJECT_PREFIX) {
        return subject.parse::<Subject>().ok().map(QuizEvent::ChooseSubject);
    }
    if let Some(index) = data.strip_prefix(ANSWER_PREFIX) {
        return index.parse::<usize>().ok().map(QuizEvent::SubmitAnswer);
    }
    match data {
        NEXT_QUESTION => Some(QuizEvent::RequestNext),
        BACK_TO_MENU => Some(QuizEvent::BackToMenu),
        _ => None,
    }
}

fn subject_label(subject: Subject) -> &'static str {
    match subject {
        Subject::English => "📚 English",
        Subject::GK => "🌍 GK (General Knowledge)",
    }
}

pub fn subject_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(Subject::ALL.iter().map(|s| {
        vec![InlineKeyboardButton::callback(
            subject_label(*s),
            format!("{}{}", SUBJECT_PREFIX, s.as_str()),
        )]
    }))
}

fn choice_keyboard(choices: &[LabeledChoice]) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(choices.iter().enumerate().map(|(i, c)| {
        vec![InlineKeyboardButton::callback(
            format!("{}. {}", c.label, c.text),
            format!("{}{}", ANSWER_PREFIX, i),
        )]
    }))
}

fn result_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback("➡️ Next Question", NEXT_QUESTION)],
        vec![InlineKeyboardButton::callback("🏠 Back to Menu", BACK_TO_MENU)],
    ])
}

fn label(index: usize) -> char {
    crate::quiz::OPTION_LABELS
        .get(index)
        .copied()
        .unwrap_or('?')
}

pub fn render_message(render: &Render) -> (String, InlineKeyboardMarkup) {
    match render {
        Render::ShowMenu { score_summary } => {
            let text = match score_summary {
                Some(summary) => format!(
                    "📊 Your Score: {}\n\n🎓 Select a subject to continue:",
                    summary
                ),
                None => "🎓 Select a subject to start:".to_string(),
            };
            (text, subject_keyboard())
        }
        Render::ShowQuestion { text, choices } => {
            (format!("❓ Question:\n\n{}", text), choice_keyboard(choices))
        }
        Render::ShowResult {
            correct,
            selected_index,
            selected_choice_text,
            correct_index,
            correct_choice_text,
            explanation,
            score_summary,
        } => {
            let mut text = if *correct {
                "✅ Correct Answer!\n\n".to_string()
            } else {
                format!(
                    "❌ Wrong Answer!\n\nYou selected: {}. {}\n\n",
                    label(*selected_index),
                    selected_choice_text
                )
            };
            text.push_str(&format!(
                "✔️ Correct Answer: {}. {}\n\n💡 Explanation:\n{}\n\n📊 Score: {}",
                label(*correct_index),
                correct_choice_text,
                explanation,
                score_summary
            ));
            (text, result_keyboard())
        }
        Render::ShowError { message, retry } => {
            let keyboard = match retry {
                RetryAffordance::RestartSubject => subject_keyboard(),
                RetryAffordance::ReturnToMenu => InlineKeyboardMarkup::new(vec![vec![
                    InlineKeyboardButton::callback("🏠 Back to Menu", BACK_TO_MENU),
                ]]),
            };
            (message.clone(), keyboard)
        }
    }
}

#[cfg(test)]
mod tests {
    use teloxide::types::InlineKeyboardButtonKind;

    use super::*;
    use crate::session::ScoreSummary;

    fn callback_data(keyboard: &InlineKeyboardMarkup) -> Vec<String> {
        keyboard
            .inline_keyboard
            .iter()
            .flatten()
            .filter_map(|b| match &b.kind {
                InlineKeyboardButtonKind::CallbackData(data) => Some(data.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn parses_every_button_we_emit() {
        assert_eq!(
            parse_callback("subject_English"),
            Some(QuizEvent::ChooseSubject(Subject::English))
        );
        assert_eq!(
            parse_callback("subject_GK"),
            Some(QuizEvent::ChooseSubject(Subject::GK))
        );
        assert_eq!(parse_callback("answer_3"), Some(QuizEvent::SubmitAnswer(3)));
        assert_eq!(parse_callback("next_question"), Some(QuizEvent::RequestNext));
        assert_eq!(parse_callback("back_to_menu"), Some(QuizEvent::BackToMenu));
    }

    #[test]
    fn rejects_unknown_callback_data() {
        assert_eq!(parse_callback("subject_Maths"), None);
        assert_eq!(parse_callback("answer_x"), None);
        assert_eq!(parse_callback("answer_-1"), None);
        assert_eq!(parse_callback(""), None);
    }

    #[test]
    fn question_keyboard_has_one_row_per_choice() {
        let render = Render::ShowQuestion {
            text: "Q".into(),
            choices: std::array::from_fn(|i| LabeledChoice {
                label: crate::quiz::OPTION_LABELS[i],
                text: format!("opt{}", i),
            }),
        };
        let (text, keyboard) = render_message(&render);
        assert!(text.contains('Q'));
        assert_eq!(keyboard.inline_keyboard.len(), 4);
        assert_eq!(keyboard.inline_keyboard[2][0].text, "C. opt2");
        assert_eq!(
            callback_data(&keyboard),
            vec!["answer_0", "answer_1", "answer_2", "answer_3"]
        );
    }

    #[test]
    fn wrong_result_mentions_both_choices() {
        let render = Render::ShowResult {
            correct: false,
            selected_index: 2,
            selected_choice_text: "c".into(),
            correct_index: 1,
            correct_choice_text: "b".into(),
            explanation: "because".into(),
            score_summary: ScoreSummary { score: 0, total: 1 },
        };
        let (text, keyboard) = render_message(&render);
        assert!(text.contains("You selected: C. c"));
        assert!(text.contains("Correct Answer: B. b"));
        assert!(text.contains("because"));
        assert!(text.ends_with("📊 Score: 0/1"));
        assert_eq!(callback_data(&keyboard), vec![NEXT_QUESTION, BACK_TO_MENU]);
    }

    #[test]
    fn menu_buttons_round_trip_through_parser() {
        let (text, keyboard) = render_message(&Render::ShowMenu {
            score_summary: Some(ScoreSummary { score: 3, total: 5 }),
        });
        assert!(text.contains("3/5"));
        let events: Vec<_> = callback_data(&keyboard)
            .iter()
            .filter_map(|d| parse_callback(d))
            .collect();
        assert_eq!(
            events,
            vec![
                QuizEvent::ChooseSubject(Subject::English),
                QuizEvent::ChooseSubject(Subject::GK)
            ]
        );
    }

    #[test]
    fn expired_session_offers_subjects_again() {
        let (_, keyboard) = render_message(&Render::ShowError {
            message: "expired".into(),
            retry: RetryAffordance::RestartSubject,
        });
        assert_eq!(
            callback_data(&keyboard),
            vec!["subject_English", "subject_GK"]
        );
    }
}
