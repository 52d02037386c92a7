use std::env;

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub access_token_secret: String,
    pub refresh_token_secret: String,
    pub access_token_ttl_seconds: i64,
    pub refresh_token_ttl_seconds: i64,
    pub sms_test_mode: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL is required")?;
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());

        // Missing secrets are a startup failure, never a per-request 500.
        let access_token_secret = env::var("JWT_SECRET").context("JWT_SECRET is required")?;
        let refresh_token_secret =
            env::var("REFRESH_TOKEN_SECRET").context("REFRESH_TOKEN_SECRET is required")?;

        let access_token_ttl_seconds = env::var("ACCESS_TOKEN_EXPIRE_IN")
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .unwrap_or(3600); // 1 hour
        let refresh_token_ttl_seconds = env::var("REFRESH_TOKEN_EXPIRE_IN")
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .unwrap_or(7 * 24 * 3600); // 7 days

        let sms_test_mode = env::var("SMS_TEST_MODE")
            .ok()
            .and_then(|s| s.parse::<bool>().ok())
            .unwrap_or(true);

        Ok(Self {
            database_url,
            bind_addr,
            access_token_secret,
            refresh_token_secret,
            access_token_ttl_seconds,
            refresh_token_ttl_seconds,
            sms_test_mode,
        })
    }
}
