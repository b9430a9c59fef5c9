use std::sync::Arc;

use dotenv::dotenv;
use ssc_quiz_bot::{
    bot,
    config::{Config, ProviderConfig},
    health,
    quiz::{
        generator::QuestionGenerator,
        provider::{ChatGptProvider, GeminiProvider, ProviderError, TextProvider},
    },
    session::QuizMachine,
};
use teloxide::prelude::*;

#[tokio::main]
async fn main() {
    dotenv().ok();

    let filters = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    pretty_env_logger::formatted_builder()
        .parse_filters(&filters)
        .init();
    log::info!("🚀 SSC Quiz Bot starting...");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("❌ {}", e);
            log::error!("Set TELEGRAM_BOT_TOKEN and the API key for QUIZ_PROVIDER");
            std::process::exit(1);
        }
    };

    let provider = match build_provider(&config) {
        Ok(provider) => provider,
        Err(e) => {
            log::error!("❌ Could not set up the question provider: {}", e);
            std::process::exit(1);
        }
    };
    log::info!(
        "Questions come from {} ({} attempts, {:?} fallback)",
        provider.name(),
        config.generator.retry.max_attempts,
        config.generator.fallback
    );

    let generator = Arc::new(QuestionGenerator::new(provider, config.generator));
    let machine = Arc::new(QuizMachine::new(generator));

    let port = config.health_port;
    tokio::spawn(async move {
        if let Err(e) = health::serve(port).await {
            log::error!("Health server stopped: {}", e);
        }
    });

    let bot = Bot::new(config.telegram_token);
    if let Err(e) = bot.delete_webhook().drop_pending_updates(true).await {
        log::warn!("Could not drop pending updates: {}", e);
    }

    log::info!("✅ Bot is ready and listening!");
    Dispatcher::builder(bot, bot::schema())
        .dependencies(dptree::deps![machine])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

fn build_provider(config: &Config) -> Result<Arc<dyn TextProvider>, ProviderError> {
    let timeout = config.generator.retry.attempt_timeout;
    let provider: Arc<dyn TextProvider> = match &config.provider {
        ProviderConfig::Gemini { api_key, model } => Arc::new(GeminiProvider::new(
            api_key.clone(),
            model.clone(),
            timeout,
        )?),
        ProviderConfig::ChatGpt { api_key } => Arc::new(ChatGptProvider::new(
            api_key.clone(),
            config.generator.sampling,
            timeout,
        )?),
    };
    Ok(provider)
}
