use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use tokio::task::JoinSet;

use crate::core::config::Settings;
use crate::services::marks::numerals::normalize_digits;
use crate::services::marks::report::{format_report, split_message, MESSAGE_CHUNK_LIMIT};
use crate::services::marks::{NoDataFound, StudentSource};

mod client;
mod messages;
mod types;


pub(crate) use client::TelegramClient;
pub(crate) use types::TgUpdate;

const POLL_RETRY_DELAY: Duration = Duration::from_secs(3);

/// What an incoming text message asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Inbound {
    Start,
    Help,
    UnknownCommand,
    InvalidId,
    Lookup(String),
}

/// Commands may carry an `@botname` suffix. Anything that is not a command must be a
/// student id made only of digits, Arabic-Indic digits included.
pub(crate) fn classify_text(text: &str) -> Inbound {
    let trimmed = text.trim();

    if let Some(command) = trimmed.strip_prefix('/') {
        let name = command.split_whitespace().next().unwrap_or_default();
        let name = name.split('@').next().unwrap_or_default();
        return match name {
            "start" => Inbound::Start,
            "help" => Inbound::Help,
            _ => Inbound::UnknownCommand,
        };
    }

    let student_id = normalize_digits(trimmed);
    if !student_id.is_empty() && student_id.chars().all(|ch| ch.is_ascii_digit()) {
        Inbound::Lookup(student_id)
    } else {
        Inbound::InvalidId
    }
}

#[derive(Clone)]
pub(crate) struct TelegramBotRuntime {
    telegram: TelegramClient,
    source: Arc<dyn StudentSource>,
    poll_timeout_seconds: u64,
}

impl TelegramBotRuntime {
    pub(crate) fn new(
        telegram: TelegramClient,
        source: Arc<dyn StudentSource>,
        poll_timeout_seconds: u64,
    ) -> Self {
        Self { telegram, source, poll_timeout_seconds }
    }

    pub(crate) fn from_settings(
        settings: &Settings,
        source: Arc<dyn StudentSource>,
    ) -> Result<Self> {
        let telegram_settings = settings.telegram();
        let token = telegram_settings
            .token
            .as_deref()
            .ok_or_else(|| anyhow!("BOT_TOKEN is not configured"))?;

        let telegram = TelegramClient::new(
            &telegram_settings.api_base,
            token,
            telegram_settings.proxy_url.as_deref(),
        )?;

        Ok(Self::new(telegram, source, telegram_settings.poll_timeout_seconds))
    }

    pub(crate) fn telegram(&self) -> &TelegramClient {
        &self.telegram
    }

    /// Long-polls until `shutdown` resolves, then waits for in-flight updates.
    pub(crate) async fn run_polling<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        self.telegram
            .delete_webhook()
            .await
            .context("Failed to remove webhook before polling")?;

        tracing::info!(
            poll_timeout_seconds = self.poll_timeout_seconds,
            "Telegram polling started"
        );

        tokio::pin!(shutdown);
        let mut offset = 0_i64;
        let mut handlers = JoinSet::new();

        loop {
            let polled = tokio::select! {
                _ = &mut shutdown => break,
                polled = self.telegram.get_updates(offset, self.poll_timeout_seconds) => polled,
            };

            let updates = match polled {
                Ok(updates) => updates,
                Err(error) => {
                    tracing::error!(error = %error, "Failed to fetch Telegram updates");
                    tokio::select! {
                        _ = &mut shutdown => break,
                        _ = tokio::time::sleep(POLL_RETRY_DELAY) => continue,
                    }
                }
            };

            for update in updates {
                offset = offset.max(update.update_id + 1);
                metrics::counter!("telegram_updates_total", "source" => "polling").increment(1);

                let runtime = self.clone();
                handlers.spawn(async move { runtime.handle_update(update).await });
            }

            while let Some(joined) = handlers.try_join_next() {
                log_join_failure(joined);
            }
        }

        tracing::info!(in_flight = handlers.len(), "Telegram polling stopping");
        while let Some(joined) = handlers.join_next().await {
            log_join_failure(joined);
        }

        Ok(())
    }

    /// Entry point for updates pushed to the webhook endpoint.
    pub(crate) async fn process_webhook_update(&self, update: TgUpdate) {
        metrics::counter!("telegram_updates_total", "source" => "webhook").increment(1);
        self.handle_update(update).await;
    }

    /// Handles one update; failures are logged and never propagate to other updates.
    pub(crate) async fn handle_update(&self, update: TgUpdate) {
        let Some(message) = update.message else {
            tracing::debug!(update_id = update.update_id, "Ignoring update without message");
            return;
        };
        let Some(text) = message.text.as_deref() else {
            return;
        };

        let chat_id = message.chat.id;
        if let Err(error) = self.handle_text(chat_id, text).await {
            let error = format!("{error:#}");
            tracing::error!(
                error = %error,
                chat_id,
                message_id = message.message_id,
                "Failed to handle Telegram message"
            );
        }
    }

    async fn handle_text(&self, chat_id: i64, text: &str) -> Result<()> {
        match classify_text(text) {
            Inbound::Start => self.send_markdown(chat_id, messages::WELCOME).await,
            Inbound::Help => self.send_markdown(chat_id, messages::HELP).await,
            Inbound::UnknownCommand => {
                self.send_markdown(chat_id, messages::UNKNOWN_COMMAND).await
            }
            Inbound::InvalidId => self.send_markdown(chat_id, messages::INVALID_ID).await,
            Inbound::Lookup(student_id) => self.handle_lookup(chat_id, &student_id).await,
        }
    }

    async fn handle_lookup(&self, chat_id: i64, student_id: &str) -> Result<()> {
        if let Err(error) = self.telegram.send_chat_action(chat_id, "typing").await {
            tracing::warn!(error = %error, chat_id, "Failed to send typing action");
        }
        self.send_markdown(chat_id, messages::SEARCHING).await?;

        for reply in self.lookup_replies(student_id).await {
            self.send_markdown(chat_id, &reply).await?;
        }
        Ok(())
    }

    /// Messages answering a lookup, in sending order.
    pub(crate) async fn lookup_replies(&self, student_id: &str) -> Vec<String> {
        match self.source.fetch_report(student_id).await {
            Ok(report) => split_message(&format_report(&report), MESSAGE_CHUNK_LIMIT),
            Err(NoDataFound) => vec![messages::NOT_FOUND.to_string()],
        }
    }

    /// Subject names can contain stray `*` or `_`, so a Markdown rejection is retried
    /// once as plain text.
    async fn send_markdown(&self, chat_id: i64, text: &str) -> Result<()> {
        match self.telegram.send_message(chat_id, text, true).await {
            Ok(()) => Ok(()),
            Err(error) if error.is_rejected() => {
                tracing::warn!(
                    error = %error,
                    chat_id,
                    "Markdown rejected, resending as plain text"
                );
                self.telegram
                    .send_message(chat_id, text, false)
                    .await
                    .context("Failed to send plain-text Telegram message")
            }
            Err(error) => Err(error).context("Failed to send Telegram message"),
        }
    }
}

fn log_join_failure(joined: std::result::Result<(), tokio::task::JoinError>) {
    if let Err(error) = joined {
        tracing::error!(error = %error, "Telegram update handler panicked");
    }
}
