use serde_json::Value;

use super::{Question, ValidationError, OPTION_COUNT};

pub const REQUIRED_KEYS: [&str; 4] = ["question", "options", "correct", "explanation"];

/// Turns a decoded candidate into a [`Question`], or says why it can't.
///
/// Checks run in a fixed order and stop at the first failure: keys, option
/// count, correct index, then non-empty strings. Whether the content is actually
/// right is the provider's problem, not ours.
pub fn validate(candidate: &Value) -> Result<Question, ValidationError> {
    for key in REQUIRED_KEYS {
        if candidate.get(key).is_none() {
            return Err(ValidationError::MissingKey(key));
        }
    }

    let options = match candidate["options"].as_array() {
        Some(options) if options.len() == OPTION_COUNT => options,
        Some(options) => return Err(ValidationError::WrongOptionCount(options.len())),
        None => return Err(ValidationError::WrongOptionCount(0)),
    };

    let correct = &candidate["correct"];
    let correct_index = match (correct.as_u64(), correct.as_i64()) {
        (Some(index), _) if index < OPTION_COUNT as u64 => index as usize,
        (Some(index), _) => {
            return Err(ValidationError::CorrectIndexOutOfRange(
                i64::try_from(index).unwrap_or(i64::MAX),
            ))
        }
        (None, Some(negative)) => return Err(ValidationError::CorrectIndexOutOfRange(negative)),
        (None, None) => return Err(ValidationError::CorrectIndexNotInteger),
    };

    let text = string_field(&candidate["question"], "question")?;
    let mut texts: [String; OPTION_COUNT] = Default::default();
    for (i, option) in options.iter().enumerate() {
        texts[i] = string_field(option, &format!("options[{}]", i))?;
    }
    let explanation = string_field(&candidate["explanation"], "explanation")?;

    Question::new(text, texts, correct_index, explanation)
}

fn string_field(value: &Value, name: &str) -> Result<String, ValidationError> {
    let s = value
        .as_str()
        .ok_or_else(|| ValidationError::NotAString(name.to_string()))?;
    if s.trim().is_empty() {
        return Err(ValidationError::EmptyField(name.to_string()));
    }
    Ok(s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn candidate() -> Value {
        json!({
            "question": "Find the synonym of 'ABUNDANT':",
            "options": ["Scarce", "Plentiful", "Rare", "Limited"],
            "correct": 1,
            "explanation": "'Plentiful' means existing in large quantities."
        })
    }

    #[test]
    fn accepts_well_formed_candidate() {
        let q = validate(&candidate()).unwrap();
        assert_eq!(q.correct_option(), "Plentiful");
    }

    #[test]
    fn missing_key_is_reported_first() {
        let mut c = candidate();
        c.as_object_mut().unwrap().remove("explanation");
        c["options"] = json!([]);
        assert_eq!(validate(&c), Err(ValidationError::MissingKey("explanation")));
    }

    #[test]
    fn non_object_candidate_is_missing_keys() {
        assert_eq!(
            validate(&json!([1, 2, 3])),
            Err(ValidationError::MissingKey("question"))
        );
    }

    #[test]
    fn options_must_be_an_array() {
        let mut c = candidate();
        c["options"] = json!("a, b, c, d");
        assert_eq!(validate(&c), Err(ValidationError::WrongOptionCount(0)));
    }

    #[test]
    fn option_count_checked_before_index() {
        let mut c = candidate();
        c["options"] = json!(["a", "b"]);
        c["correct"] = json!(9);
        assert_eq!(validate(&c), Err(ValidationError::WrongOptionCount(2)));
    }

    #[test]
    fn correct_must_be_an_integer() {
        for bad in [json!("1"), json!(1.5), json!(null)] {
            let mut c = candidate();
            c["correct"] = bad;
            assert_eq!(validate(&c), Err(ValidationError::CorrectIndexNotInteger));
        }
    }

    #[test]
    fn negative_index_is_out_of_range() {
        let mut c = candidate();
        c["correct"] = json!(-1);
        assert_eq!(validate(&c), Err(ValidationError::CorrectIndexOutOfRange(-1)));
    }

    #[test]
    fn whitespace_only_explanation_is_empty() {
        let mut c = candidate();
        c["explanation"] = json!("   ");
        assert_eq!(
            validate(&c),
            Err(ValidationError::EmptyField("explanation".into()))
        );
    }

    #[test]
    fn non_string_option_is_rejected() {
        let mut c = candidate();
        c["options"][2] = json!(42);
        assert_eq!(
            validate(&c),
            Err(ValidationError::NotAString("options[2]".into()))
        );
    }

    fn arb_option() -> impl Strategy<Value = String> {
        prop_oneof![
            4 => "[a-zA-Z ]{1,12}",
            1 => Just(String::new()),
            1 => Just("   ".to_string()),
        ]
    }

    proptest! {
        #[test]
        fn accepts_iff_structurally_valid(
            count in prop_oneof![Just(0usize), Just(1), Just(3), Just(4), Just(5)],
            options in proptest::collection::vec(arb_option(), 5),
            correct in -2i64..6,
            text in arb_option(),
            explanation in arb_option(),
        ) {
            let options = &options[..count];
            let c = json!({
                "question": text,
                "options": options,
                "correct": correct,
                "explanation": explanation,
            });

            let non_empty = |s: &String| !s.trim().is_empty();
            let expected = count == 4
                && (0..=3).contains(&correct)
                && non_empty(&text)
                && non_empty(&explanation)
                && options.iter().all(non_empty);

            prop_assert_eq!(validate(&c).is_ok(), expected);
        }
    }
}
