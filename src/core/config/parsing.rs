use std::env;

use super::types::{ConfigError, Environment};

const TOKEN_PLACEHOLDER: &str = "YOUR_BOT_TOKEN_HERE";
const PROXY_SCHEMES: [&str; 4] = ["http", "https", "socks5", "socks5h"];

pub(super) fn env_optional(key: &str) -> Option<String> {
    env::var(key).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

pub(super) fn env_or_default(key: &str, default: &str) -> String {
    env_optional(key).unwrap_or_else(|| default.to_string())
}

pub(super) fn parse_u64(field: &'static str, value: String) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidValue { field, value })
}

pub(super) fn parse_positive_u64(field: &'static str, value: String) -> Result<u64, ConfigError> {
    match parse_u64(field, value)? {
        0 => Err(ConfigError::InvalidValue { field, value: "0".to_string() }),
        parsed => Ok(parsed),
    }
}

pub(super) fn parse_bool(value: &str) -> bool {
    matches!(value, "1" | "true" | "TRUE" | "yes" | "YES" | "on" | "ON")
}

pub(super) fn parse_environment(value: Option<String>) -> Environment {
    match value.as_deref().map(|item| item.to_lowercase()) {
        Some(ref val) if val == "production" || val == "prod" => Environment::Production,
        Some(ref val) if val == "staging" => Environment::Staging,
        Some(ref val) if val == "test" || val == "testing" => Environment::Test,
        _ => Environment::Development,
    }
}

/// Unset, blank and the sample-file placeholder all mean "no token".
pub(super) fn parse_bot_token(value: Option<String>) -> Option<String> {
    value.filter(|token| token != TOKEN_PLACEHOLDER)
}

pub(super) fn parse_url_template(
    field: &'static str,
    value: String,
    placeholder: &str,
) -> Result<String, ConfigError> {
    let is_http = value.starts_with("http://") || value.starts_with("https://");
    if !is_http || !value.contains(placeholder) {
        return Err(ConfigError::InvalidValue { field, value });
    }
    Ok(value)
}

/// `Proxy::all` accepts any parseable URL, so the scheme and host are checked here.
pub(crate) fn parse_proxy(field: &'static str, value: &str) -> Result<reqwest::Proxy, ConfigError> {
    let invalid = || ConfigError::InvalidValue { field, value: value.to_string() };
    let url = reqwest::Url::parse(value).map_err(|_| invalid())?;
    if !PROXY_SCHEMES.contains(&url.scheme()) || url.host_str().is_none() {
        return Err(invalid());
    }
    reqwest::Proxy::all(url).map_err(|_| invalid())
}

pub(super) fn trim_base_url(value: String) -> String {
    value.trim_end_matches('/').to_string()
}
