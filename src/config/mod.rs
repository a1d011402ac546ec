mod app_config;

pub use app_config::{
    AdminConfig, AppConfig, DatabaseConfig, LogFormat, LoggingConfig, MailConfig, MailProviderKind,
    MailgunConfig, MailjetConfig, RateLimitConfig, ServerConfig,
};
