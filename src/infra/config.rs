use std::{path::PathBuf, str::FromStr, time::Duration};

use anyhow::{Context, Result};

pub const DEFAULT_DB_FILE: &str = "./data/orders.db";
pub const DEFAULT_PAYMENT_URL_BASE: &str = "https://demo-pay.example.com/pay";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cors: AllowedOrigins,
    pub rate_limit: RateLimitConfig,
    pub payment: PaymentConfig,
    pub static_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Path of the SQLite file.
    pub url: String,
    pub pool_size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrigins {
    Any,
    List(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window: Duration,
}

#[derive(Debug, Clone)]
pub struct PaymentConfig {
    pub url_base: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".into(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: DEFAULT_DB_FILE.into(),
                pool_size: 4,
            },
            cors: AllowedOrigins::Any,
            rate_limit: RateLimitConfig {
                max_requests: 60,
                window: Duration::from_secs(60),
            },
            payment: PaymentConfig {
                url_base: DEFAULT_PAYMENT_URL_BASE.into(),
            },
            static_dir: None,
        }
    }
}

impl AllowedOrigins {
    /// Parses a comma separated allow-list. A `*` entry (or nothing at all) allows every origin.
    pub fn parse(raw: &str) -> Self {
        let origins: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();

        if origins.is_empty() || origins.iter().any(|origin| origin == "*") {
            AllowedOrigins::Any
        } else {
            AllowedOrigins::List(origins)
        }
    }
}

/// Reads the configuration from the process environment.
pub fn load() -> Result<AppConfig> {
    from_lookup(|key| std::env::var(key).ok())
}

pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<AppConfig> {
    let defaults = AppConfig::default();
    let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    Ok(AppConfig {
        server: ServerConfig {
            host: var("HOST").unwrap_or(defaults.server.host),
            port: parse_or(var("PORT"), "PORT", defaults.server.port)?,
        },
        database: DatabaseConfig {
            url: var("DB_FILE").unwrap_or(defaults.database.url),
            pool_size: parse_or(var("DB_POOL_SIZE"), "DB_POOL_SIZE", defaults.database.pool_size)?,
        },
        cors: var("CORS_ORIGINS")
            .map(|raw| AllowedOrigins::parse(&raw))
            .unwrap_or(defaults.cors),
        rate_limit: RateLimitConfig {
            max_requests: parse_or(
                var("RATE_LIMIT_MAX"),
                "RATE_LIMIT_MAX",
                defaults.rate_limit.max_requests,
            )?,
            window: Duration::from_secs(parse_or(
                var("RATE_LIMIT_WINDOW_SECS"),
                "RATE_LIMIT_WINDOW_SECS",
                defaults.rate_limit.window.as_secs(),
            )?),
        },
        payment: PaymentConfig {
            url_base: var("PAYMENT_URL_BASE").unwrap_or(defaults.payment.url_base),
        },
        static_dir: var("STATIC_DIR").map(PathBuf::from),
    })
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a number, got {:?}", key, raw)),
        None => Ok(default),
    }
}
