use std::sync::Arc;
use teloxide::prelude::*;

use crate::commands::AdminCommand;
use crate::config::Config;
use crate::database::{Subscriber, SubscriberStore};
use crate::handlers::HandlerResult;
use crate::handlers::broadcast::{Delivery, Payload, RateLimiter, TelegramDelivery, broadcast};
use crate::handlers::poll::{POLL_USAGE, parse_poll};
use crate::handlers::ui::{
    ADMINS_ONLY, BROADCAST_USAGE, DATABASE_ERROR, MESSAGE_LIMIT, NO_SUBSCRIBERS, split_message,
};

/// Single-admin check. An empty configured id never matches anyone.
pub fn authorize(sender_id: &str, configured_admin_id: &str) -> bool {
    let admin = configured_admin_id.trim();
    !admin.is_empty() && sender_id == admin
}

pub fn sender_id(msg: &Message) -> String {
    msg.from
        .as_ref()
        .map(|user| user.id.0.to_string())
        .unwrap_or_default()
}

pub struct AdminContext<'a> {
    pub config: &'a Config,
    pub store: &'a SubscriberStore,
    pub delivery: &'a dyn Delivery,
    pub limiter: &'a dyn RateLimiter,
}

impl AdminContext<'_> {
    async fn reply(&self, chat_id: i64, text: impl Into<String>) -> anyhow::Result<()> {
        self.delivery.deliver(chat_id, &Payload::Text(text.into())).await
    }
}

pub async fn admin_command_handler(
    bot: Bot,
    msg: Message,
    cmd: AdminCommand,
    config: Arc<Config>,
    store: Arc<SubscriberStore>,
    limiter: Arc<dyn RateLimiter>,
) -> HandlerResult {
    let delivery = TelegramDelivery::new(bot);
    let ctx = AdminContext {
        config: &config,
        store: &store,
        delivery: &delivery,
        limiter: limiter.as_ref(),
    };

    run_admin_command(&ctx, &sender_id(&msg), msg.chat.id.0, cmd).await?;
    Ok(())
}

pub async fn run_admin_command(
    ctx: &AdminContext<'_>,
    sender_id: &str,
    reply_to: i64,
    cmd: AdminCommand,
) -> anyhow::Result<()> {
    if !authorize(sender_id, &ctx.config.admin_id) {
        log::warn!("Rejected {:?} from non-admin sender {:?}", cmd, sender_id);
        return ctx.reply(reply_to, ADMINS_ONLY).await;
    }

    match cmd {
        AdminCommand::Broadcast { text } => {
            let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
            if text.is_empty() {
                return ctx.reply(reply_to, BROADCAST_USAGE).await;
            }
            distribute(ctx, reply_to, Payload::Text(text), "Broadcast").await
        }
        AdminCommand::Poll { args } => match parse_poll(&args) {
            Ok(poll) => distribute(ctx, reply_to, Payload::Poll(poll), "Poll").await,
            Err(e) => ctx.reply(reply_to, format!("❌ {}\n{}", e, POLL_USAGE)).await,
        },
        AdminCommand::ListUsers => match ctx.store.list_with_names().await {
            Ok(subscribers) => {
                for chunk in split_message(&format_subscriber_list(&subscribers), MESSAGE_LIMIT) {
                    ctx.reply(reply_to, chunk).await?;
                }
                Ok(())
            }
            Err(e) => {
                log::error!("List users DB error: {}", e);
                ctx.reply(reply_to, DATABASE_ERROR).await
            }
        },
    }
}

async fn distribute(
    ctx: &AdminContext<'_>,
    reply_to: i64,
    payload: Payload,
    label: &str,
) -> anyhow::Result<()> {
    let targets = match ctx.store.list_ids().await {
        Ok(targets) => targets,
        Err(e) => {
            log::error!("DB error: {}", e);
            return ctx.reply(reply_to, DATABASE_ERROR).await;
        }
    };

    if targets.is_empty() {
        return ctx.reply(reply_to, NO_SUBSCRIBERS).await;
    }

    log::info!("{} started for {} subscribers", label, targets.len());
    ctx.reply(reply_to, format!("🚀 Sending to {} subscribers...", targets.len()))
        .await?;

    let report = broadcast(ctx.delivery, ctx.limiter, &targets, &payload).await;

    ctx.reply(
        reply_to,
        format!(
            "✅ {} finished: attempted {}, succeeded {}, failed {}.",
            label,
            report.attempted,
            report.succeeded,
            report.failed()
        ),
    )
    .await
}

pub fn format_subscriber_list(subscribers: &[Subscriber]) -> String {
    if subscribers.is_empty() {
        return NO_SUBSCRIBERS.to_string();
    }

    let mut response = format!("👥 Subscribers: {}\n", subscribers.len());
    for (index, subscriber) in subscribers.iter().enumerate() {
        let line = match subscriber.display_name.as_deref() {
            Some(name) if !name.is_empty() => format!("{}. @{}", index + 1, name),
            _ => format!("{}. ID: {}", index + 1, subscriber.chat_id),
        };
        response.push('\n');
        response.push_str(&line);
    }
    response
}
