use std::env;
use std::time::Duration;

use anyhow::{Context, bail};

/// Smallest accepted length of `TOKEN_SYMMETRIC_KEY`, in bytes.
pub const MIN_TOKEN_KEY_LEN: usize = 32;

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub token_symmetric_key: String,
    pub access_token_duration: Duration,
    pub refresh_token_duration: Duration,
    pub redis_address: String,
    /// `None` when `SMTP_HOST` is unset; mail is then only logged.
    pub smtp: Option<SmtpConfig>,
    pub frontend_url: String,
    pub test_admin_account: Option<String>,
    pub test_admin_password: Option<String>,
    pub db_tx_timeout: Duration,
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let host = var_or("APP_HOST", "127.0.0.1");
        let port = parse_var("APP_PORT", 3000u16)?;

        let token_symmetric_key =
            env::var("TOKEN_SYMMETRIC_KEY").context("TOKEN_SYMMETRIC_KEY must be set")?;
        if token_symmetric_key.len() < MIN_TOKEN_KEY_LEN {
            bail!("TOKEN_SYMMETRIC_KEY must be at least {MIN_TOKEN_KEY_LEN} bytes");
        }

        let access_token_duration =
            Duration::from_secs(parse_var("ACCESS_TOKEN_DURATION", 900u64)?);
        let refresh_token_duration =
            Duration::from_secs(parse_var("REFRESH_TOKEN_DURATION", 86_400u64)?);

        let smtp = match non_empty_var("SMTP_HOST") {
            Some(smtp_host) => Some(SmtpConfig {
                host: smtp_host,
                port: parse_var("SMTP_PORT", 587u16)?,
                username: var_or("SMTP_USERNAME", ""),
                password: var_or("SMTP_PASSWORD", ""),
                from_address: var_or("SMTP_FROM_ADDRESS", "noreply@mall.local"),
            }),
            None => None,
        };

        Ok(Self {
            database_url,
            host,
            port,
            token_symmetric_key,
            access_token_duration,
            refresh_token_duration,
            redis_address: var_or("REDIS_ADDRESS", "redis://127.0.0.1:6379"),
            smtp,
            frontend_url: var_or("FRONTEND_URL", "http://localhost:8080"),
            test_admin_account: non_empty_var("TEST_ADMIN_ACCOUNT"),
            test_admin_password: non_empty_var("TEST_ADMIN_PASSWORD"),
            db_tx_timeout: Duration::from_secs(parse_var("DB_TX_TIMEOUT_SECS", 10u64)?),
        })
    }
}
