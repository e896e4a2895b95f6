use crate::error::{Error, Result};
use dotenvy::dotenv;
use rust_decimal::Decimal;
use std::env;
use url::Url;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub stripe_secret_key: String,
    pub stripe_webhook_secret: String,
    pub stripe_price_id: String,
    pub stripe_api_base: String,
    pub public_url: String,
    pub trial_days: u32,
    pub plan_price: Decimal,
    pub admin_api_key: Option<String>,
    pub static_dir: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env_or("SERVER_ADDRESS", "0.0.0.0:3000"),
            jwt_secret: get_env("JWT_SECRET")?,
            token_ttl_hours: get_env_parse_or("TOKEN_TTL_HOURS", 168)?,
            stripe_secret_key: get_env("STRIPE_SECRET_KEY")?,
            stripe_webhook_secret: get_env("STRIPE_WEBHOOK_SECRET")?,
            stripe_price_id: get_env("STRIPE_PRICE_ID")?,
            stripe_api_base: get_env_or("STRIPE_API_BASE", "https://api.stripe.com"),
            public_url: get_public_url("PUBLIC_URL")?,
            trial_days: get_env_parse_or("TRIAL_DAYS", 14)?,
            plan_price: get_env_parse_or("PLAN_PRICE", Decimal::new(999, 2))?,
            admin_api_key: env::var("ADMIN_API_KEY").ok().filter(|v| !v.is_empty()),
            static_dir: env::var("STATIC_DIR").ok().filter(|v| !v.is_empty()),
        })
    }

    /// Builds an absolute link under the public site, e.g. `dashboard?checkout=success`.
    pub fn public_link(&self, path_and_query: &str) -> String {
        format!(
            "{}/{}",
            self.public_url,
            path_and_query.trim_start_matches('/')
        )
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

fn get_public_url(name: &str) -> Result<String> {
    let raw = get_env(name)?;
    let parsed = Url::parse(&raw)
        .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e)))?;
    if parsed.cannot_be_a_base() {
        return Err(Error::Config(format!("{} must be an absolute URL", name)));
    }
    Ok(raw.trim_end_matches('/').to_string())
}
