use super::parsing::{
    env_optional, env_or_default, parse_bool, parse_bot_token, parse_environment,
    parse_positive_u64, parse_proxy, parse_u64, parse_url_template, trim_base_url,
};
use super::types::{
    ConfigError, RuntimeSettings, ServerHost, ServerPort, ServerSettings, Settings,
    SourceSettings, TelegramSettings, TelemetrySettings,
};
use crate::services::marks::client::STUDENT_ID_PLACEHOLDER;

const DEFAULT_SOURCE_URL: &str =
    "http://app.hama-univ.edu.sy/StdMark/Student/{student_id}?college=3";
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

impl Settings {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        let host = env_or_default("HOST", "0.0.0.0");
        let port = env_or_default("PORT", "8080");

        let environment = parse_environment(
            env_optional("MARKS_BOT_ENV").or_else(|| env_optional("ENVIRONMENT")),
        );
        let strict_config =
            env_optional("MARKS_BOT_STRICT_CONFIG").map(|value| parse_bool(&value)).unwrap_or(false)
                || environment.is_production();

        let token =
            parse_bot_token(env_optional("BOT_TOKEN").or_else(|| env_optional("TG_TOKEN")));
        let webhook_url = env_optional("WEBHOOK_URL");
        let proxy_url = env_optional("PROXY_URL");
        let api_base =
            trim_base_url(env_or_default("TELEGRAM_API_BASE", "https://api.telegram.org"));
        let poll_timeout_seconds = parse_u64(
            "TELEGRAM_POLL_TIMEOUT_SECONDS",
            env_or_default("TELEGRAM_POLL_TIMEOUT_SECONDS", "30"),
        )?;

        let url_template = parse_url_template(
            "MARKS_SOURCE_URL",
            env_or_default("MARKS_SOURCE_URL", DEFAULT_SOURCE_URL),
            STUDENT_ID_PLACEHOLDER,
        )?;
        let user_agent = env_or_default("MARKS_USER_AGENT", DEFAULT_USER_AGENT);
        let timeout_seconds = parse_positive_u64(
            "MARKS_TIMEOUT_SECONDS",
            env_or_default("MARKS_TIMEOUT_SECONDS", "10"),
        )?;

        let log_level = env_or_default("MARKS_LOG_LEVEL", "info");
        let json = env_optional("MARKS_LOG_JSON").map(|value| parse_bool(&value)).unwrap_or(false);
        let prometheus_enabled =
            env_optional("PROMETHEUS_ENABLED").map(|value| parse_bool(&value)).unwrap_or(false);

        let settings = Self {
            server: ServerSettings {
                host: ServerHost::parse(host)?,
                port: ServerPort::parse(port)?,
            },
            runtime: RuntimeSettings { environment, strict_config },
            telegram: TelegramSettings {
                token,
                webhook_url,
                proxy_url,
                api_base,
                poll_timeout_seconds,
            },
            source: SourceSettings { url_template, user_agent, timeout_seconds },
            telemetry: TelemetrySettings { log_level, json, prometheus_enabled },
        };

        settings.validate()?;
        Ok(settings)
    }

    pub(crate) fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host.0, self.server.port.0)
    }

    pub(crate) fn server_host(&self) -> &str {
        &self.server.host.0
    }

    pub(crate) fn server_port(&self) -> u16 {
        self.server.port.0
    }

    pub(crate) fn telegram(&self) -> &TelegramSettings {
        &self.telegram
    }

    pub(crate) fn source(&self) -> &SourceSettings {
        &self.source
    }

    pub(crate) fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    pub(crate) fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(proxy) = &self.telegram.proxy_url {
            parse_proxy("PROXY_URL", proxy)?;
        }

        if !(self.runtime.strict_config || self.runtime.environment.is_production()) {
            return Ok(());
        }

        if self.telegram.token.is_none() {
            return Err(ConfigError::MissingSecret("BOT_TOKEN"));
        }

        Ok(())
    }
}
