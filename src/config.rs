use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::quiz::fallback::FallbackPolicy;
use crate::quiz::generator::{GeneratorConfig, RetryPolicy, MAX_ATTEMPTS_LIMIT};
use crate::quiz::provider::SamplingConfig;
use crate::quiz::tracker::DEFAULT_HISTORY_CAPACITY;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("{key} has invalid value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProviderConfig {
    Gemini { api_key: String, model: String },
    ChatGpt { api_key: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_token: String,
    pub provider: ProviderConfig,
    pub generator: GeneratorConfig,
    pub health_port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let telegram_token = env.required("TELEGRAM_BOT_TOKEN")?;

        let provider = match env.get("QUIZ_PROVIDER").as_deref().map(str::trim) {
            None | Some("") | Some("gemini") => ProviderConfig::Gemini {
                api_key: env.required("GEMINI_API_KEY")?,
                model: env
                    .get("GEMINI_MODEL")
                    .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            },
            Some("chatgpt") | Some("openai") => ProviderConfig::ChatGpt {
                api_key: env.required("CHATGPT_API_KEY")?,
            },
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "QUIZ_PROVIDER",
                    value: other.to_string(),
                    reason: "expected 'gemini' or 'chatgpt'".to_string(),
                })
            }
        };

        let defaults = SamplingConfig::default();
        let sampling = SamplingConfig {
            temperature: env.parse("QUIZ_TEMPERATURE", defaults.temperature)?,
            top_p: env.parse("QUIZ_TOP_P", defaults.top_p)?,
            top_k: env.parse("QUIZ_TOP_K", defaults.top_k)?,
            max_tokens: env.parse("QUIZ_MAX_TOKENS", defaults.max_tokens)?,
        };

        let defaults = RetryPolicy::default();
        let max_attempts: u32 = env.parse("QUIZ_MAX_ATTEMPTS", defaults.max_attempts)?;
        if !(1..=MAX_ATTEMPTS_LIMIT).contains(&max_attempts) {
            return Err(ConfigError::Invalid {
                key: "QUIZ_MAX_ATTEMPTS",
                value: max_attempts.to_string(),
                reason: format!("must be between 1 and {}", MAX_ATTEMPTS_LIMIT),
            });
        }
        let timeout_secs: u64 =
            env.parse("QUIZ_ATTEMPT_TIMEOUT_SECS", defaults.attempt_timeout.as_secs())?;
        let delay_ms: u64 = env.parse(
            "QUIZ_RETRY_DELAY_MS",
            defaults.retry_delay.as_millis() as u64,
        )?;
        let retry = RetryPolicy {
            max_attempts,
            attempt_timeout: Duration::from_secs(timeout_secs.max(1)),
            retry_delay: Duration::from_millis(delay_ms),
        };

        let history_capacity: usize =
            env.parse("QUIZ_HISTORY_CAPACITY", DEFAULT_HISTORY_CAPACITY)?;
        if history_capacity == 0 {
            return Err(ConfigError::Invalid {
                key: "QUIZ_HISTORY_CAPACITY",
                value: history_capacity.to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let generator = GeneratorConfig {
            sampling,
            retry,
            fallback: env.parse("QUIZ_FALLBACK", FallbackPolicy::default())?,
            history_capacity,
        };

        Ok(Self {
            telegram_token,
            provider,
            generator,
            health_port: env.parse("PORT", DEFAULT_PORT)?,
        })
    }
}

struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key)
    }

    fn required(&self, key: &'static str) -> Result<String, ConfigError> {
        self.get(key)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing(key))
    }

    fn parse<T>(&self, key: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(key) {
            None => Ok(default),
            Some(raw) if raw.trim().is_empty() => Ok(default),
            Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
                key,
                value: raw.clone(),
                reason: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_to_gemini_with_sane_retry_budget() {
        let config = load(&[("TELEGRAM_BOT_TOKEN", "t"), ("GEMINI_API_KEY", "g")]).unwrap();
        assert_eq!(
            config.provider,
            ProviderConfig::Gemini {
                api_key: "g".into(),
                model: DEFAULT_GEMINI_MODEL.into()
            }
        );
        assert_eq!(config.generator.retry, RetryPolicy::default());
        assert_eq!(config.generator.fallback, FallbackPolicy::Sentinel);
        assert_eq!(config.generator.history_capacity, 100);
        assert_eq!(config.health_port, 8080);
    }

    #[test]
    fn overrides_are_applied() {
        let config = load(&[
            ("TELEGRAM_BOT_TOKEN", "t"),
            ("QUIZ_PROVIDER", "chatgpt"),
            ("CHATGPT_API_KEY", "c"),
            ("QUIZ_MAX_ATTEMPTS", "5"),
            ("QUIZ_RETRY_DELAY_MS", "0"),
            ("QUIZ_TEMPERATURE", "1.2"),
            ("QUIZ_FALLBACK", "pool"),
            ("PORT", "9000"),
        ])
        .unwrap();
        assert_eq!(config.provider, ProviderConfig::ChatGpt { api_key: "c".into() });
        assert_eq!(config.generator.retry.max_attempts, 5);
        assert_eq!(config.generator.retry.retry_delay, Duration::ZERO);
        assert_eq!(config.generator.sampling.temperature, 1.2);
        assert_eq!(config.generator.fallback, FallbackPolicy::StaticPool);
        assert_eq!(config.health_port, 9000);
    }

    #[test]
    fn missing_token_is_reported() {
        assert_eq!(
            load(&[("GEMINI_API_KEY", "g")]).unwrap_err(),
            ConfigError::Missing("TELEGRAM_BOT_TOKEN")
        );
    }

    #[test]
    fn provider_key_must_match_provider() {
        assert_eq!(
            load(&[("TELEGRAM_BOT_TOKEN", "t"), ("QUIZ_PROVIDER", "chatgpt")]).unwrap_err(),
            ConfigError::Missing("CHATGPT_API_KEY")
        );
    }

    #[test]
    fn attempt_budget_is_bounded() {
        for bad in ["0", "11"] {
            let err = load(&[
                ("TELEGRAM_BOT_TOKEN", "t"),
                ("GEMINI_API_KEY", "g"),
                ("QUIZ_MAX_ATTEMPTS", bad),
            ])
            .unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { key: "QUIZ_MAX_ATTEMPTS", .. }));
        }
    }

    #[test]
    fn empty_history_is_rejected() {
        let err = load(&[
            ("TELEGRAM_BOT_TOKEN", "t"),
            ("GEMINI_API_KEY", "g"),
            ("QUIZ_HISTORY_CAPACITY", "0"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "QUIZ_HISTORY_CAPACITY", .. }));
    }

    #[test]
    fn garbage_numbers_are_rejected() {
        let err = load(&[
            ("TELEGRAM_BOT_TOKEN", "t"),
            ("GEMINI_API_KEY", "g"),
            ("PORT", "eighty"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let err = load(&[("TELEGRAM_BOT_TOKEN", "t"), ("QUIZ_PROVIDER", "llama")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "QUIZ_PROVIDER", .. }));
    }
}
