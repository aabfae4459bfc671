use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub ai: AiConfig,
    /// Owner used when a request carries no `X-User-Id` header.
    pub default_owner_id: i64,
    pub cors_allowed_origins: Vec<String>,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is required")?;
        let ai = AiConfig {
            api_key: std::env::var("OPENAI_API_KEY").context("OPENAI_API_KEY is required")?,
            base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".into()),
            model: std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into()),
            timeout_secs: env_or("AI_TIMEOUT_SECS", 60),
        };
        let cors_allowed_origins = parse_origins(
            &std::env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
        );

        Ok(Self {
            database_url,
            max_connections: env_or("DATABASE_MAX_CONNECTIONS", 10),
            ai,
            default_owner_id: env_or("DEFAULT_USER_ID", 1),
            cors_allowed_origins,
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_or("APP_PORT", 8080),
        })
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect()
}
