use serde::Deserialize;

use crate::domain::DomainError;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub database: DatabaseConfig,
    pub admin: AdminConfig,
    pub mail: MailConfig,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// PostgreSQL settings; no URL means in-memory stores
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Empty disables the admin page
    pub key: String,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MailProviderKind {
    Log,
    Mailgun,
    Mailjet,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    /// Unset picks Mailgun when a Mailgun key is present, the log gateway otherwise
    pub provider: Option<MailProviderKind>,
    pub domain: String,
    pub public_url: Option<String>,
    pub timeout_secs: u64,
    pub mailgun: MailgunConfig,
    pub mailjet: MailjetConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MailgunConfig {
    pub api_key: Option<String>,
    pub api_base: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MailjetConfig {
    pub api_key: Option<String>,
    pub secret_key: Option<String>,
    pub api_base: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub send_per_day: u32,
    pub verify_send_per_day: u32,
    /// Buckets kept in memory before the least recently used is evicted
    pub max_buckets: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 5,
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            provider: None,
            domain: "localhost".to_string(),
            public_url: None,
            timeout_secs: 30,
            mailgun: MailgunConfig::default(),
            mailjet: MailjetConfig::default(),
        }
    }
}

impl Default for MailgunConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: "https://api.mailgun.net".to_string(),
        }
    }
}

impl Default for MailjetConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            secret_key: None,
            api_base: "https://api.mailjet.com".to_string(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            send_per_day: 50,
            verify_send_per_day: 100,
            max_buckets: 100_000,
        }
    }
}

impl MailConfig {
    /// Base URL embedded in verification links
    pub fn public_url(&self) -> String {
        match self.public_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => url.trim_end_matches('/').to_string(),
            _ => format!("https://{}", self.domain),
        }
    }

    pub fn provider_kind(&self) -> MailProviderKind {
        match self.provider {
            Some(kind) => kind,
            None if non_empty(&self.mailgun.api_key).is_some() => MailProviderKind::Mailgun,
            None => MailProviderKind::Log,
        }
    }
}

pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut app_config: AppConfig = config.try_deserialize()?;
        app_config.apply_legacy_env(|name| std::env::var(name).ok());

        Ok(app_config)
    }

    /// Apply the `DB_URI`, `ADMIN_KEY` and `MAILGUN` variables
    pub fn apply_legacy_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("DB_URI").filter(|v| !v.trim().is_empty()) {
            self.database.url = Some(url);
        }

        if let Some(key) = lookup("ADMIN_KEY").filter(|v| !v.trim().is_empty()) {
            self.admin.key = key;
        }

        if let Some(key) = lookup("MAILGUN").filter(|v| !v.trim().is_empty()) {
            self.mail.mailgun.api_key = Some(key);
        }
    }

    /// Reject settings the server cannot start with
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.mail.domain.trim().is_empty() {
            return Err(DomainError::configuration("mail.domain must not be empty"));
        }

        if self.rate_limit.send_per_day == 0 || self.rate_limit.verify_send_per_day == 0 {
            return Err(DomainError::configuration(
                "rate_limit quotas must be greater than zero",
            ));
        }

        if self.rate_limit.max_buckets == 0 {
            return Err(DomainError::configuration(
                "rate_limit.max_buckets must be greater than zero",
            ));
        }

        match self.mail.provider_kind() {
            MailProviderKind::Log => {}
            MailProviderKind::Mailgun => {
                if non_empty(&self.mail.mailgun.api_key).is_none() {
                    return Err(DomainError::configuration(
                        "mail.provider is mailgun but mail.mailgun.api_key is not set",
                    ));
                }
            }
            MailProviderKind::Mailjet => {
                if non_empty(&self.mail.mailjet.api_key).is_none()
                    || non_empty(&self.mail.mailjet.secret_key).is_none()
                {
                    return Err(DomainError::configuration(
                        "mail.provider is mailjet but mail.mailjet.api_key or secret_key is not set",
                    ));
                }
            }
        }

        Ok(())
    }
}
