use teloxide::prelude::*;
use teloxide::types::Chat;
use teloxide::utils::command::BotCommands;

use crate::commands::{ADMIN_DESCRIPTIONS, Command};
use crate::config::Config;
use crate::database::SubscriberStore;
use crate::handlers::HandlerResult;
use crate::handlers::admin::{authorize, sender_id};
use crate::handlers::ui::{PRICE_TEXT, SUBSCRIBE_TEXT, WELCOME_TEXT};
use std::sync::Arc;

/// Name stored with a new subscriber: the chat's own public username, so a
/// group is never listed under the member who started it.
pub fn chat_display_name(chat: &Chat) -> Option<String> {
    chat.username().map(str::to_string)
}

pub fn help_text(is_admin: bool) -> String {
    let mut text = Command::descriptions().to_string();
    if is_admin {
        text.push_str("\n\n");
        text.push_str(ADMIN_DESCRIPTIONS);
    }
    text
}

pub async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    config: Arc<Config>,
    store: Arc<SubscriberStore>,
) -> HandlerResult {
    match cmd {
        Command::Start => {
            let chat_id = msg.chat.id.0;
            match store.register(chat_id, chat_display_name(&msg.chat)).await {
                Ok(true) => log::info!("New subscriber: {}", chat_id),
                Ok(false) => log::debug!("Chat {} is already subscribed", chat_id),
                Err(e) => log::error!("Failed to register subscriber {}: {}", chat_id, e),
            }

            bot.send_message(msg.chat.id, WELCOME_TEXT).await?;
        }
        Command::Help => {
            let is_admin = authorize(&sender_id(&msg), &config.admin_id);
            bot.send_message(msg.chat.id, help_text(is_admin)).await?;
        }
        Command::Price => {
            bot.send_message(msg.chat.id, PRICE_TEXT).await?;
        }
        Command::Subscribe => {
            bot.send_message(msg.chat.id, SUBSCRIBE_TEXT).await?;
        }
    };
    Ok(())
}
