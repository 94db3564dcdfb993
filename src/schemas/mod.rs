use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(crate) struct RootResponse {
    pub(crate) status: String,
    pub(crate) message: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct HealthResponse {
    pub(crate) status: String,
    pub(crate) bot_initialized: bool,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SetWebhookRequest {
    #[serde(default)]
    pub(crate) webhook_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SetWebhookResponse {
    pub(crate) status: String,
    pub(crate) webhook_url: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct StatusMessage {
    pub(crate) status: String,
    pub(crate) message: String,
}
