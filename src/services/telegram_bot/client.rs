use std::time::Duration;

use anyhow::Context;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde_json::json;
use thiserror::Error;

use super::types::{TgResponse, TgUpdate};
use crate::core::config::parse_proxy;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Slack on top of the long-poll timeout before the HTTP request itself gives up.
const POLL_TIMEOUT_SLACK: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub(crate) enum TelegramApiError {
    #[error("Telegram {method} request failed: {source}")]
    Transport { method: &'static str, source: reqwest::Error },
    #[error("Failed to decode Telegram {method} payload (status {status}): {source}")]
    Decode { method: &'static str, status: StatusCode, source: reqwest::Error },
    #[error("Telegram {method} returned ok=false (status {status}): {description}")]
    Rejected { method: &'static str, status: StatusCode, description: String },
}

impl TelegramApiError {
    /// The API answered and refused the call, as opposed to a network or decode failure.
    pub(crate) fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

/// Thin Bot API client. The token lives only inside `base_url` and is stripped
/// from transport errors before they can reach a log line.
#[derive(Debug, Clone)]
pub(crate) struct TelegramClient {
    client: Client,
    base_url: String,
}

impl TelegramClient {
    pub(crate) fn new(
        api_base: &str,
        token: &str,
        proxy_url: Option<&str>,
    ) -> anyhow::Result<Self> {
        let mut builder = Client::builder().timeout(REQUEST_TIMEOUT);
        if let Some(proxy_url) = proxy_url {
            builder = builder.proxy(parse_proxy("PROXY_URL", proxy_url)?);
        }
        let client = builder.build().context("Failed to build Telegram HTTP client")?;

        Ok(Self { client, base_url: format!("{}/bot{token}", api_base.trim_end_matches('/')) })
    }

    pub(crate) async fn get_updates(
        &self,
        offset: i64,
        timeout_seconds: u64,
    ) -> Result<Vec<TgUpdate>, TelegramApiError> {
        let request = self
            .client
            .get(self.method_url("getUpdates"))
            .timeout(Duration::from_secs(timeout_seconds) + POLL_TIMEOUT_SLACK)
            .query(&[
                ("offset", offset.to_string()),
                ("timeout", timeout_seconds.to_string()),
                ("allowed_updates", "[\"message\"]".to_string()),
            ]);

        self.call("getUpdates", request).await
    }

    pub(crate) async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        markdown: bool,
    ) -> Result<(), TelegramApiError> {
        let mut payload = json!({
            "chat_id": chat_id,
            "text": text,
            "disable_web_page_preview": true,
        });
        if markdown {
            payload["parse_mode"] = json!("Markdown");
        }

        let request = self.client.post(self.method_url("sendMessage")).json(&payload);
        self.call::<IgnoredAny>("sendMessage", request).await.map(|_| ())
    }

    pub(crate) async fn send_chat_action(
        &self,
        chat_id: i64,
        action: &str,
    ) -> Result<(), TelegramApiError> {
        let request = self
            .client
            .post(self.method_url("sendChatAction"))
            .json(&json!({ "chat_id": chat_id, "action": action }));
        self.call::<IgnoredAny>("sendChatAction", request).await.map(|_| ())
    }

    pub(crate) async fn set_webhook(&self, url: &str) -> Result<(), TelegramApiError> {
        let request = self
            .client
            .post(self.method_url("setWebhook"))
            .json(&json!({ "url": url, "allowed_updates": ["message"] }));
        self.call::<IgnoredAny>("setWebhook", request).await.map(|_| ())
    }

    pub(crate) async fn delete_webhook(&self) -> Result<(), TelegramApiError> {
        let request = self.client.post(self.method_url("deleteWebhook"));
        self.call::<IgnoredAny>("deleteWebhook", request).await.map(|_| ())
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{method}", self.base_url)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &'static str,
        request: RequestBuilder,
    ) -> Result<T, TelegramApiError> {
        let response = request.send().await.map_err(|source| TelegramApiError::Transport {
            method,
            source: source.without_url(),
        })?;

        // Bot API errors arrive as JSON bodies on 4xx/5xx, so the status alone says little.
        let status = response.status();
        let payload: TgResponse<T> = response.json().await.map_err(|source| {
            TelegramApiError::Decode { method, status, source: source.without_url() }
        })?;

        match payload {
            TgResponse { ok: true, result: Some(result), .. } => Ok(result),
            TgResponse { description, .. } => Err(TelegramApiError::Rejected {
                method,
                status,
                description: description
                    .unwrap_or_else(|| "unknown Telegram API error".to_string()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::spawn_telegram_api;

    #[tokio::test]
    async fn surfaces_api_rejections() {
        let api = spawn_telegram_api().await;
        api.reject_markdown();
        let client = TelegramClient::new(&api.base_url(), "123:abc", None).expect("client");

        let error = client.send_message(1, "*broken", true).await.unwrap_err();
        assert!(error.is_rejected());
        assert!(error.to_string().contains("can't parse entities"));

        client.send_message(1, "*broken", false).await.expect("plain text accepted");
    }

    #[tokio::test]
    async fn sends_parse_mode_only_for_markdown() {
        let api = spawn_telegram_api().await;
        let client = TelegramClient::new(&api.base_url(), "123:abc", None).expect("client");

        client.send_message(5, "hello", true).await.expect("markdown");
        client.send_message(5, "hello", false).await.expect("plain");

        let calls = api.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].token, "123:abc");
        assert_eq!(calls[0].method, "sendMessage");
        assert_eq!(calls[0].body["parse_mode"], "Markdown");
        assert!(calls[1].body.get("parse_mode").is_none());
    }

    #[tokio::test]
    async fn transport_errors_do_not_leak_token() {
        let client = TelegramClient::new("http://127.0.0.1:9", "123:secret", None).expect("client");

        let error = client.delete_webhook().await.unwrap_err();
        assert!(!error.is_rejected());
        assert!(!error.to_string().contains("123:secret"));
    }

    #[test]
    fn rejects_malformed_proxy() {
        for proxy in ["ftp://proxy.example:21", "proxy.example:8080"] {
            assert!(TelegramClient::new("http://127.0.0.1:9", "t", Some(proxy)).is_err());
        }
        let proxy = Some("socks5://127.0.0.1:1080");
        assert!(TelegramClient::new("http://127.0.0.1:9", "t", proxy).is_ok());
    }
}
