pub(crate) mod api;
pub(crate) mod core;
pub(crate) mod schemas;
pub(crate) mod services;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use axum::{body::Body, http::Request, ServiceExt};

use crate::core::{config::Settings, state::AppState, telemetry};
use crate::services::marks::MarksClient;
use crate::services::telegram_bot::TelegramBotRuntime;

/// Webhook HTTP server. Starts without a bot when none can be built, so health checks
/// still answer and report `bot_initialized: false`.
pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    telemetry::init_tracing(&settings)?;
    core::metrics::init(&settings)?;

    let bot = if settings.telegram().token.is_none() {
        tracing::error!("BOT_TOKEN not configured; webhook endpoints are disabled");
        None
    } else {
        match build_bot(&settings) {
            Ok(bot) => {
                tracing::info!("Bot instance initialized");
                Some(bot)
            }
            Err(err) => {
                let err = format!("{err:#}");
                tracing::error!(error = %err, "Failed to initialize bot");
                None
            }
        }
    };

    let state = AppState::new(settings, bot);
    let app = api::router::app(state.clone());
    let listener = tokio::net::TcpListener::bind(state.settings().server_addr()).await?;

    tracing::info!(
        host = %state.settings().server_host(),
        port = state.settings().server_port(),
        environment = %state.settings().runtime().environment.as_str(),
        "Student marks webhook server listening"
    );

    axum::serve(listener, ServiceExt::<Request<Body>>::into_make_service(app))
        .with_graceful_shutdown(core::shutdown::shutdown_signal())
        .await?;

    Ok(())
}

/// Long-polling bot runtime. A missing token is fatal here.
pub async fn run_telegram_bot() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    telemetry::init_tracing(&settings)?;
    core::metrics::init(&settings)?;

    let bot = build_bot(&settings)?;
    tracing::info!(
        environment = %settings.runtime().environment.as_str(),
        "Starting student marks bot"
    );

    bot.run_polling(core::shutdown::shutdown_signal()).await
}

fn build_bot(settings: &Settings) -> anyhow::Result<TelegramBotRuntime> {
    let source = Arc::new(MarksClient::from_settings(settings)?);
    TelegramBotRuntime::from_settings(settings, source)
}
