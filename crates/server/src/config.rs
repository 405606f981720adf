use config::ConfigError;
use serde::Deserialize;
use std::collections::HashMap;

const ENV_PREFIX: &str = "GHOSTWIRE_";

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub ghost: GhostSettings,
    pub twilio: TwilioSettings,
    pub mailgun: MailgunSettings,
    pub gcs: GcsSettings,
    pub notifications: NotificationSettings,
    pub lynx: LynxSettings,
    pub http: HttpSettings,
}

#[derive(Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub cors_origins: String,
}

#[derive(Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
}

#[derive(Deserialize, Clone)]
pub struct GhostSettings {
    pub api_url: String,
    /// Admin API key，格式 `{id}:{hex secret}`
    pub admin_key: String,
    pub debounce_secs: i64,
    pub settle_delay_ms: u64,
}

#[derive(Deserialize, Clone)]
pub struct TwilioSettings {
    pub account_sid: String,
    pub auth_token: String,
    pub sender: String,
    pub recipient: String,
}

#[derive(Deserialize, Clone)]
pub struct MailgunSettings {
    pub api_key: String,
    pub domain: String,
    pub base_url: String,
    pub from_email: String,
    pub subject: String,
    pub template: String,
}

#[derive(Deserialize, Clone)]
pub struct GcsSettings {
    pub bucket: String,
    pub prefix: String,
    pub public_base_url: Option<String>,
    /// 私有存储桶需要的 OAuth2 access token
    pub access_token: Option<String>,
}

#[derive(Deserialize, Clone)]
pub struct NotificationSettings {
    /// 逗号分隔的站长作者 id
    pub owner_ids: String,
}

impl NotificationSettings {
    pub fn owner_ids(&self) -> Vec<String> {
        self.owner_ids
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Deserialize, Clone)]
pub struct LynxSettings {
    pub concurrency: usize,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

#[derive(Deserialize, Clone)]
pub struct HttpSettings {
    pub timeout_secs: u64,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());
        let env_json = serde_json::to_string(&collect_env_vars())
            .map_err(|e| ConfigError::Message(e.to_string()))?;

        let s = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("server.cors_origins", "*")?
            .set_default("database.url", "sqlite://data/ghostwire.db")?
            .set_default("ghost.api_url", "http://localhost:2368")?
            .set_default("ghost.admin_key", "")?
            .set_default("ghost.debounce_secs", domain::posts::DEBOUNCE_SECS)?
            .set_default("ghost.settle_delay_ms", 1000)?
            .set_default("twilio.account_sid", "")?
            .set_default("twilio.auth_token", "")?
            .set_default("twilio.sender", "")?
            .set_default("twilio.recipient", "")?
            .set_default("mailgun.api_key", "")?
            .set_default("mailgun.domain", "")?
            .set_default("mailgun.base_url", "https://api.mailgun.net")?
            .set_default("mailgun.from_email", "")?
            .set_default("mailgun.subject", "Welcome!")?
            .set_default("mailgun.template", "welcome")?
            .set_default("gcs.bucket", "")?
            .set_default("gcs.prefix", "")?
            .set_default("notifications.owner_ids", "")?
            .set_default("lynx.concurrency", 5)?
            .set_default("lynx.timeout_secs", 10)?
            .set_default("lynx.max_retries", 2)?
            .set_default("http.timeout_secs", 20)?
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::File::with_name(&format!("config.{}", run_mode)).required(false))
            .add_source(config::File::from_str(&env_json, config::FileFormat::Json))
            .build()?;

        s.try_deserialize()
    }
}

/// `GHOSTWIRE_GHOST__API_URL` -> `ghost.api_url`
fn collect_env_vars() -> HashMap<String, String> {
    env_overrides(std::env::vars())
}

fn env_overrides(vars: impl Iterator<Item = (String, String)>) -> HashMap<String, String> {
    vars.filter(|(k, _)| k.starts_with(ENV_PREFIX))
        .map(|(k, v)| {
            let key = k
                .trim_start_matches(ENV_PREFIX)
                .replace("__", ".")
                .to_lowercase();
            (key, v)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixed_vars_become_dotted_keys() {
        let vars = vec![
            ("GHOSTWIRE_GHOST__API_URL".to_string(), "https://blog".to_string()),
            ("PATH".to_string(), "/usr/bin".to_string()),
        ];
        let map = env_overrides(vars.into_iter());
        assert_eq!(map.len(), 1);
        assert_eq!(map["ghost.api_url"], "https://blog");
    }

    #[test]
    fn owner_ids_are_split_and_trimmed() {
        let settings = NotificationSettings {
            owner_ids: " 1, 5c9e ,,".into(),
        };
        assert_eq!(settings.owner_ids(), vec!["1".to_string(), "5c9e".to_string()]);
    }
}
