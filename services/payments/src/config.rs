use std::time::Duration;

use crate::infra::mpesa::MpesaConfig;
use crate::usecase::callback::LookupRetry;

const SANDBOX_BASE_URL: &str = "https://sandbox.safaricom.co.ke";
const PRODUCTION_BASE_URL: &str = "https://api.safaricom.co.ke";

/// Payments service configuration loaded from environment variables.
#[derive(Debug)]
pub struct PaymentsConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// TCP port to listen on (default 3120). Env var: `PAYMENTS_PORT`.
    pub payments_port: u16,
    /// Credentials and endpoints for the M-Pesa Daraja API.
    pub mpesa: MpesaConfig,
    /// How long the callback handler waits for a record that is not committed yet.
    pub callback_lookup: LookupRetry,
}

impl PaymentsConfig {
    pub fn from_env() -> Self {
        let environment =
            std::env::var("MPESA_ENVIRONMENT").unwrap_or_else(|_| "sandbox".to_owned());
        let base_url = std::env::var("MPESA_BASE_URL")
            .unwrap_or_else(|_| base_url_for(&environment).to_owned());

        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            payments_port: parse_or("PAYMENTS_PORT", 3120),
            mpesa: MpesaConfig {
                base_url,
                consumer_key: std::env::var("MPESA_CONSUMER_KEY").expect("MPESA_CONSUMER_KEY"),
                consumer_secret: std::env::var("MPESA_CONSUMER_SECRET")
                    .expect("MPESA_CONSUMER_SECRET"),
                shortcode: std::env::var("MPESA_SHORTCODE").expect("MPESA_SHORTCODE"),
                passkey: std::env::var("MPESA_PASSKEY").expect("MPESA_PASSKEY"),
                callback_url: std::env::var("MPESA_CALLBACK_URL").expect("MPESA_CALLBACK_URL"),
                timeout: Duration::from_secs(parse_or("MPESA_TIMEOUT_SECS", 30)),
            },
            callback_lookup: LookupRetry {
                retries: parse_or("CALLBACK_LOOKUP_RETRIES", 3),
                backoff: Duration::from_millis(parse_or("CALLBACK_LOOKUP_BACKOFF_MS", 250)),
            },
        }
    }
}

/// Daraja host for `MPESA_ENVIRONMENT`; anything but `production` is sandbox.
pub fn base_url_for(environment: &str) -> &'static str {
    match environment {
        "production" => PRODUCTION_BASE_URL,
        _ => SANDBOX_BASE_URL,
    }
}

fn parse_or<T: std::str::FromStr>(var: &str, default: T) -> T {
    std::env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
