use std::sync::Arc;

use crate::core::config::Settings;
use crate::services::telegram_bot::TelegramBotRuntime;

#[derive(Clone)]
pub(crate) struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    settings: Settings,
    bot: Option<TelegramBotRuntime>,
}

impl AppState {
    pub(crate) fn new(settings: Settings, bot: Option<TelegramBotRuntime>) -> Self {
        Self { inner: Arc::new(InnerState { settings, bot }) }
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    /// `None` when no bot token was configured or the bot failed to start.
    pub(crate) fn bot(&self) -> Option<&TelegramBotRuntime> {
        self.inner.bot.as_ref()
    }
}
