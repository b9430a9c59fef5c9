use std::str::FromStr;

use rand::seq::SliceRandom;
use teloxide::types::UserId;

use super::tracker::DuplicateTracker;
use super::{Question, Subject};

/// What `generate` hands out once every attempt has failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallbackPolicy {
    /// A placeholder whose options all say "try again"
    #[default]
    Sentinel,
    /// A random curated question, falling back to the sentinel when the user
    /// has already seen all of them
    StaticPool,
}

impl FromStr for FallbackPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sentinel" => Ok(FallbackPolicy::Sentinel),
            "pool" | "static" | "static_pool" => Ok(FallbackPolicy::StaticPool),
            other => Err(format!("unknown fallback policy '{}'", other)),
        }
    }
}

impl FallbackPolicy {
    pub fn question(&self, subject: Subject, user: UserId, tracker: &DuplicateTracker) -> Question {
        match self {
            FallbackPolicy::Sentinel => Question::sentinel(),
            FallbackPolicy::StaticPool => {
                let fresh: Vec<Question> = pool(subject)
                    .into_iter()
                    .filter(|q| tracker.is_fresh(user, &q.fingerprint()))
                    .collect();
                match fresh.choose(&mut rand::thread_rng()) {
                    Some(question) => {
                        tracker.record(user, question.fingerprint());
                        question.clone()
                    }
                    None => Question::sentinel(),
                }
            }
        }
    }
}

struct Curated {
    text: &'static str,
    options: [&'static str; 4],
    correct: usize,
    explanation: &'static str,
}

const ENGLISH_POOL: &[Curated] = &[
    Curated {
        text: "Choose the correctly spelled word:",
        options: ["Occassion", "Occasion", "Ocassion", "Ocasion"],
        correct: 1,
        explanation: "'Occasion' is the correct spelling with double 'c' and single 's'. It means a particular event or time.",
    },
    Curated {
        text: "Find the synonym of 'ABUNDANT':",
        options: ["Scarce", "Plentiful", "Rare", "Limited"],
        correct: 1,
        explanation: "'Plentiful' means existing in large quantities, which is the same as 'Abundant'.",
    },
    Curated {
        text: "Choose the correct form: He _____ to school every day.",
        options: ["go", "goes", "going", "gone"],
        correct: 1,
        explanation: "'Goes' is correct because 'He' is third person singular present tense.",
    },
];

const GK_POOL: &[Curated] = &[
    Curated {
        text: "भारत के प्रथम राष्ट्रपति कौन थे? | Who was the first President of India?",
        options: [
            "डॉ. राजेंद्र प्रसाद | Dr. Rajendra Prasad",
            "सर्वपल्ली राधाकृष्णन | Sarvepalli Radhakrishnan",
            "जाकिर हुसैन | Zakir Husain",
            "वी.वी. गिरि | V.V. Giri",
        ],
        correct: 0,
        explanation: "डॉ. राजेंद्र प्रसाद भारत के प्रथम राष्ट्रपति थे। उन्होंने 1950 से 1962 तक सेवा की। | Dr. Rajendra Prasad was the first President of India. He served from 1950 to 1962.",
    },
    Curated {
        text: "भारत की राजधानी क्या है? | What is the capital of India?",
        options: [
            "मुंबई | Mumbai",
            "नई दिल्ली | New Delhi",
            "कोलकाता | Kolkata",
            "चेन्नई | Chennai",
        ],
        correct: 1,
        explanation: "नई दिल्ली भारत की राजधानी है और यह दिल्ली केंद्र शासित प्रदेश में स्थित है। | New Delhi is the capital of India and is located in the National Capital Territory of Delhi.",
    },
    Curated {
        text: "भारतीय संविधान कब लागू हुआ? | When did the Indian Constitution come into effect?",
        options: [
            "15 अगस्त 1947 | 15 August 1947",
            "26 जनवरी 1950 | 26 January 1950",
            "26 नवंबर 1949 | 26 November 1949",
            "2 अक्टूबर 1947 | 2 October 1947",
        ],
        correct: 1,
        explanation: "भारतीय संविधान 26 जनवरी 1950 को लागू हुआ था। इसी दिन को हम गणतंत्र दिवस के रूप में मनाते हैं। | The Indian Constitution came into effect on 26 January 1950. We celebrate this day as Republic Day.",
    },
];

pub fn pool(subject: Subject) -> Vec<Question> {
    let curated = match subject {
        Subject::English => ENGLISH_POOL,
        Subject::GK => GK_POOL,
    };
    curated
        .iter()
        .filter_map(|c| {
            Question::new(
                c.text,
                c.options.map(str::to_string),
                c.correct,
                c.explanation,
            )
            .map_err(|e| log::error!("Curated question {:?} is invalid: {}", c.text, e))
            .ok()
        })
        .collect()
}
