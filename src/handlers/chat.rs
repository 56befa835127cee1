use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::ChatAction;

use crate::gemini::GeminiClient;
use crate::handlers::HandlerResult;
use crate::handlers::ui::{AI_ERROR, MESSAGE_LIMIT, split_message};

/// Forwards free text to the model and sends the answer back.
pub async fn ai_text_handler(bot: Bot, msg: Message, gemini: Arc<GeminiClient>) -> HandlerResult {
    let text = match msg.text() {
        Some(text) if !text.starts_with('/') => text,
        _ => return Ok(()),
    };

    // Typing indicator is cosmetic.
    if let Err(e) = bot.send_chat_action(msg.chat.id, ChatAction::Typing).await {
        log::debug!("Failed to send typing action: {}", e);
    }

    match gemini.generate(text).await {
        Ok(answer) => {
            for chunk in split_message(&answer, MESSAGE_LIMIT) {
                bot.send_message(msg.chat.id, chunk).await?;
            }
        }
        Err(e) => {
            log::error!("AI request for chat {} failed: {:#}", msg.chat.id, e);
            bot.send_message(msg.chat.id, AI_ERROR).await?;
        }
    }

    Ok(())
}
