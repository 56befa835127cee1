use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatId, InputPollOption};
use teloxide::RequestError;
use tokio::time::{Duration, sleep};

use crate::handlers::poll::PollDefinition;

const MAX_FLOOD_WAIT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    Poll(PollDefinition),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub attempted: usize,
    pub succeeded: usize,
}

impl BroadcastReport {
    pub fn failed(&self) -> usize {
        self.attempted - self.succeeded
    }
}

/// One outbound send to one chat.
#[async_trait]
pub trait Delivery: Send + Sync {
    async fn deliver(&self, chat_id: i64, payload: &Payload) -> anyhow::Result<()>;
}

/// Paces consecutive broadcast sends.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    async fn wait(&self);
}

pub struct FixedInterval {
    interval: Duration,
}

impl FixedInterval {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

#[async_trait]
impl RateLimiter for FixedInterval {
    async fn wait(&self) {
        sleep(self.interval).await;
    }
}

pub struct Unlimited;

#[async_trait]
impl RateLimiter for Unlimited {
    async fn wait(&self) {}
}

pub fn limiter_for(interval: Duration) -> std::sync::Arc<dyn RateLimiter> {
    if interval.is_zero() {
        std::sync::Arc::new(Unlimited)
    } else {
        std::sync::Arc::new(FixedInterval::new(interval))
    }
}

pub struct TelegramDelivery {
    bot: Bot,
}

impl TelegramDelivery {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Delivery for TelegramDelivery {
    async fn deliver(&self, chat_id: i64, payload: &Payload) -> anyhow::Result<()> {
        let result = match payload {
            Payload::Text(text) => self.bot.send_message(ChatId(chat_id), text).await.map(|_| ()),
            Payload::Poll(poll) => {
                let options: Vec<InputPollOption> = poll
                    .options
                    .iter()
                    .cloned()
                    .map(InputPollOption::new)
                    .collect();
                self.bot
                    .send_poll(ChatId(chat_id), poll.question.clone(), options)
                    .is_anonymous(true)
                    .await
                    .map(|_| ())
            }
        };

        if let Err(RequestError::RetryAfter(secs)) = &result {
            let wait = secs.duration().min(MAX_FLOOD_WAIT);
            log::info!("Flood control on chat {}, sleeping {:?}", chat_id, wait);
            sleep(wait).await;
        }

        result.map_err(anyhow::Error::from)
    }
}

/// Sends `payload` to every target in order, one attempt each. A failed send
/// is logged and counted; it never stops the batch.
pub async fn broadcast(
    delivery: &dyn Delivery,
    limiter: &dyn RateLimiter,
    targets: &[i64],
    payload: &Payload,
) -> BroadcastReport {
    let mut report = BroadcastReport {
        attempted: 0,
        succeeded: 0,
    };

    for (idx, chat_id) in targets.iter().enumerate() {
        if idx > 0 {
            limiter.wait().await;
        }

        report.attempted += 1;
        match delivery.deliver(*chat_id, payload).await {
            Ok(()) => report.succeeded += 1,
            Err(e) => log::warn!("Failed to send to {}: {}", chat_id, e),
        }
    }

    log::info!(
        "Broadcast done: {}/{} delivered, {} failed",
        report.succeeded,
        report.attempted,
        report.failed()
    );
    report
}
