use rand::seq::SliceRandom;
use rand::Rng;

use super::Subject;

const ENGLISH_TOPICS: &[&str] = &[
    "Grammar",
    "Vocabulary",
    "Synonyms",
    "Antonyms",
    "Idioms",
    "Sentence Correction",
    "Fill in the blanks",
    "Error Detection",
    "Comprehension",
];

const GK_TOPICS: &[&str] = &[
    "Indian History",
    "Geography",
    "Indian Polity",
    "Economics",
    "Science",
    "Current Affairs",
    "Books & Authors",
    "Awards",
    "Sports",
    "Important Dates",
];

pub fn topics(subject: Subject) -> &'static [&'static str] {
    match subject {
        Subject::English => ENGLISH_TOPICS,
        Subject::GK => GK_TOPICS,
    }
}

/// One prompt, ready to send. Never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub subject: Subject,
    pub topic: &'static str,
    pub nonce: u64,
    pub prompt: String,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PromptBuilder;

impl PromptBuilder {
    /// Picks a topic and nonce and renders the prompt.
    ///
    /// The topic is uniform over the subject's pool, skipping topics in
    /// `prior_topics` while there are any others left to try.
    pub fn build<R: Rng>(
        &self,
        subject: Subject,
        prior_topics: &[&str],
        rng: &mut R,
    ) -> GenerationRequest {
        let pool = topics(subject);
        let untried: Vec<&'static str> = pool
            .iter()
            .copied()
            .filter(|t| !prior_topics.contains(t))
            .collect();
        let candidates = if untried.is_empty() { pool } else { &untried[..] };
        // Pools are non-empty constants
        let topic = candidates.choose(rng).copied().unwrap_or(pool[0]);
        let nonce = rng.gen::<u64>();

        GenerationRequest {
            subject,
            topic,
            nonce,
            prompt: self.render(subject, topic, nonce),
        }
    }

    pub fn render(&self, subject: Subject, topic: &str, nonce: u64) -> String {
        match subject {
            Subject::English => format!(
                "Generate 1 SSC CGL/CHSL level English multiple choice question.
Focus on: {topic}.

Make it exam-realistic and challenging. Respond with a single JSON object and nothing else, exactly in this format:
{{
    \"question\": \"Your SSC-level question here\",
    \"options\": [\"Option A\", \"Option B\", \"Option C\", \"Option D\"],
    \"correct\": 0,
    \"explanation\": \"Detailed explanation with grammar rules or vocabulary meaning\"
}}

\"correct\" is the 0-based index of the right option. Exactly 4 options.
Request id: {nonce:016x}"
            ),
            Subject::GK => format!(
                "Generate 1 SSC CGL/CHSL level General Knowledge question in BILINGUAL format (Hindi + English).
Topic: {topic}.

Respond with a single JSON object and nothing else, with BILINGUAL text (Hindi | English), exactly in this format:
{{
    \"question\": \"हिंदी में सवाल | Question in English\",
    \"options\": [
        \"हिंदी विकल्प A | English Option A\",
        \"हिंदी विकल्प B | English Option B\",
        \"हिंदी विकल्प C | English Option C\",
        \"हिंदी विकल्प D | English Option D\"
    ],
    \"correct\": 0,
    \"explanation\": \"हिंदी में व्याख्या | Explanation in English\"
}}

\"correct\" is the 0-based index of the right option. Exactly 4 options.
Make it SSC exam level - factual, precise, and educational.
Request id: {nonce:016x}"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn render_is_deterministic() {
        let builder = PromptBuilder;
        assert_eq!(
            builder.render(Subject::English, "Idioms", 42),
            builder.render(Subject::English, "Idioms", 42)
        );
        assert_ne!(
            builder.render(Subject::English, "Idioms", 42),
            builder.render(Subject::English, "Idioms", 43)
        );
    }

    #[test]
    fn prompt_embeds_topic_and_json_keys() {
        let mut rng = StdRng::seed_from_u64(1);
        let request = PromptBuilder.build(Subject::GK, &[], &mut rng);
        assert!(GK_TOPICS.contains(&request.topic));
        assert!(request.prompt.contains(request.topic));
        for key in ["\"question\"", "\"options\"", "\"correct\"", "\"explanation\""] {
            assert!(request.prompt.contains(key), "missing {}", key);
        }
        assert!(request.prompt.contains("BILINGUAL"));
    }

    #[test]
    fn prior_topics_are_skipped_while_others_remain() {
        let mut rng = StdRng::seed_from_u64(7);
        let prior: Vec<&str> = ENGLISH_TOPICS[1..].to_vec();
        for _ in 0..20 {
            let request = PromptBuilder.build(Subject::English, &prior, &mut rng);
            assert_eq!(request.topic, ENGLISH_TOPICS[0]);
        }
    }

    #[test]
    fn exhausted_topics_fall_back_to_full_pool() {
        let mut rng = StdRng::seed_from_u64(7);
        let request = PromptBuilder.build(Subject::English, ENGLISH_TOPICS, &mut rng);
        assert!(ENGLISH_TOPICS.contains(&request.topic));
    }

    #[test]
    fn nonce_changes_between_builds() {
        let mut rng = StdRng::seed_from_u64(3);
        let a = PromptBuilder.build(Subject::English, &[], &mut rng);
        let b = PromptBuilder.build(Subject::English, &[], &mut rng);
        assert_ne!(a.nonce, b.nonce);
    }
}
