use serde::Deserialize;

/// Envelope shared by every Bot API method.
#[derive(Debug, Deserialize)]
pub(crate) struct TgResponse<T> {
    pub(crate) ok: bool,
    pub(crate) result: Option<T>,
    pub(crate) description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TgUpdate {
    pub(crate) update_id: i64,
    pub(crate) message: Option<TgMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TgMessage {
    pub(crate) message_id: i64,
    pub(crate) chat: TgChat,
    pub(crate) text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TgChat {
    pub(crate) id: i64,
}
