use axum::{body::Bytes, extract::State, http::StatusCode, Json};

use crate::api::errors::ApiError;
use crate::core::state::AppState;
use crate::schemas::{SetWebhookRequest, SetWebhookResponse, StatusMessage};
use crate::services::telegram_bot::TgUpdate;

/// Handles one update pushed by Telegram. Replies only after the update was processed.
pub(crate) async fn receive_update(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let bot = state.bot().ok_or_else(ApiError::bot_not_initialized)?;

    let update: TgUpdate = serde_json::from_slice(&body).map_err(|err| {
        tracing::warn!(error = %err, "Rejected malformed webhook update");
        ApiError::BadRequest("Invalid update payload".to_string())
    })?;

    bot.process_webhook_update(update).await;
    Ok(StatusCode::OK)
}

pub(crate) async fn set_webhook(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SetWebhookResponse>, ApiError> {
    let bot = state.bot().ok_or_else(ApiError::bot_not_initialized)?;

    let request = if body.is_empty() {
        SetWebhookRequest::default()
    } else {
        serde_json::from_slice::<SetWebhookRequest>(&body)
            .map_err(|_| ApiError::BadRequest("Invalid JSON body".to_string()))?
    };

    let webhook_url = request
        .webhook_url
        .filter(|url| !url.trim().is_empty())
        .or_else(|| state.settings().telegram().webhook_url.clone())
        .ok_or_else(|| {
            ApiError::BadRequest(
                "webhook_url required in request body or WEBHOOK_URL environment variable"
                    .to_string(),
            )
        })?;

    bot.telegram()
        .set_webhook(&webhook_url)
        .await
        .map_err(|err| ApiError::internal(err, "Failed to set webhook"))?;

    tracing::info!(webhook_url = %webhook_url, "Webhook set");
    Ok(Json(SetWebhookResponse { status: "success".to_string(), webhook_url }))
}

pub(crate) async fn delete_webhook(
    State(state): State<AppState>,
) -> Result<Json<StatusMessage>, ApiError> {
    let bot = state.bot().ok_or_else(ApiError::bot_not_initialized)?;

    bot.telegram()
        .delete_webhook()
        .await
        .map_err(|err| ApiError::internal(err, "Failed to delete webhook"))?;

    tracing::info!("Webhook deleted");
    Ok(Json(StatusMessage {
        status: "success".to_string(),
        message: "Webhook deleted".to_string(),
    }))
}
