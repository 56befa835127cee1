use anyhow::Error;
use std::sync::Arc;
use teloxide::dptree;
use teloxide::prelude::*;
use teloxide::types::Me;
use teloxide::utils::command::BotCommands;

use crate::commands::{Command, parse_admin_command};
use crate::config::Config;
use crate::database::SubscriberStore;
use crate::gemini::GeminiClient;
use crate::handlers::{admin_command_handler, ai_text_handler, command_handler, limiter_for};

mod commands;
mod config;
mod database;
mod gemini;
mod handlers;
mod logging;

#[tokio::main]
async fn main() -> Result<(), Error> {
    // .env may carry the log levels, so it is read before the logger exists.
    let env_file = config::load_environment();
    logging::init_logger()?;

    match env_file {
        Ok(Some(path)) => log::info!("Loaded environment from {:?}", path),
        Ok(None) => log::debug!("No .env file found, using process environment"),
        Err(e) => log::warn!("Failed to read .env file: {}", e),
    }

    log::info!("Starting info bot...");
    let start_time = std::time::Instant::now();

    let config = match Config::from_env() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            return Err(e.into());
        }
    };
    log::info!("Configuration loaded: {:?}", config);

    let store = SubscriberStore::new(&config.database_path);
    if let Err(e) = store.init() {
        log::error!("Failed to initialize the database: {}", e);
        return Err(e.into());
    }
    let store = Arc::new(store);
    match store.count().await {
        Ok(count) => log::info!(
            "Database ready at {:?} with {} subscribers",
            store.path(),
            count
        ),
        Err(e) => log::warn!("Failed to count subscribers: {}", e),
    }

    let limiter = limiter_for(config.broadcast_delay);

    let gemini = match &config.gemini {
        Some(gemini_config) => match GeminiClient::new(gemini_config) {
            Ok(client) => Some(Arc::new(client)),
            Err(e) => {
                log::error!("Failed to set up the Gemini client: {:#}", e);
                return Err(e);
            }
        },
        None => None,
    };

    let bot = Bot::new(config.bot_token.clone());

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        log::warn!("Failed to register the command list: {}", e);
    }

    let mut handler = dptree::entry()
        .branch(
            Update::filter_message()
                .filter_map(|msg: Message, me: Me| {
                    msg.text().and_then(|text| parse_admin_command(text, me.username()))
                })
                .endpoint(admin_command_handler),
        )
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(command_handler),
        );

    let mut deps = dptree::deps![config.clone(), store.clone(), limiter];

    match gemini {
        Some(gemini) => {
            log::info!("AI chat enabled with model {}", gemini.model());
            handler = handler.branch(Update::filter_message().endpoint(ai_text_handler));
            deps.insert(gemini);
        }
        None => log::info!("GEMINI_API_KEY not set, AI chat disabled"),
    }

    log::info!("Bot initialization completed in {:.2?}", start_time.elapsed());
    log::info!("Starting to dispatch updates...");

    Dispatcher::builder(bot, handler)
        .dependencies(deps)
        .default_handler(|upd| async move {
            log::debug!("Unhandled update: {:?}", upd.id);
        })
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    log::info!("Bot shutdown complete");
    Ok(())
}
