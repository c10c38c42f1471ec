use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    /// Empty means any origin.
    pub allowed_origins: Vec<String>,
    pub auto_close_after_days: i64,
    pub auto_close_cron: String,
    pub outbox_poll_interval_secs: u64,
    pub mail_from: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            database_max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 10)?,
            port: parse_or("PORT", 8080)?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "helpdesk".to_string()),
            allowed_origins: env::var("ALLOWED_ORIGINS")
                .map(|v| parse_list(&v))
                .unwrap_or_default(),
            auto_close_after_days: parse_or("AUTO_CLOSE_AFTER_DAYS", 7)?,
            auto_close_cron: env::var("AUTO_CLOSE_CRON")
                .unwrap_or_else(|_| "0 0 * * * *".to_string()),
            outbox_poll_interval_secs: parse_or("OUTBOX_POLL_INTERVAL_SECS", 5)?,
            mail_from: env::var("MAIL_FROM").unwrap_or_else(|_| "helpdesk@localhost".to_string()),
        })
    }
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid number", key)),
        Err(_) => Ok(default),
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_list_skips_blanks() {
        assert_eq!(
            parse_list(" https://a.example , ,https://b.example"),
            vec!["https://a.example", "https://b.example"]
        );
        assert!(parse_list("").is_empty());
    }

    #[test]
    fn parse_or_falls_back_when_unset() {
        let value: u16 = parse_or("HELPDESK_TEST_UNSET_PORT", 8080).unwrap();
        assert_eq!(value, 8080);
    }

    #[test]
    fn parse_or_reports_the_variable() {
        env::set_var("HELPDESK_TEST_BAD_DAYS", "seven");
        let err = parse_or::<i64>("HELPDESK_TEST_BAD_DAYS", 7).unwrap_err();
        assert!(err.to_string().contains("HELPDESK_TEST_BAD_DAYS"));
        env::remove_var("HELPDESK_TEST_BAD_DAYS");
    }
}
