//! Application configuration

use std::env;

use secrecy::SecretString;
use tracing::debug;

use crate::error::{Error, Result};

/// Price sold by the checkout button when `STRIPE_PRICE_ID` is unset
pub const DEFAULT_PRICE_ID: &str = "price_1QcQJeAx2rGD3R0SgKIiswU6";

/// Header Stripe puts the webhook signature in
pub const DEFAULT_SIGNATURE_HEADER: &str = "Stripe-Signature";

/// Default freshness window for webhook timestamps, in seconds
pub const DEFAULT_WEBHOOK_TOLERANCE_SECS: u64 = 300;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Secret API key used for outbound Stripe calls
    pub stripe_secret_key: SecretString,
    /// Base URL of the Stripe API
    pub stripe_api_base: String,
    /// Price identifier of the single line item
    pub price_id: String,
    /// Public origin the success/cancel redirects point at
    pub public_url: String,
    /// `None` when webhook handling is disabled
    pub webhook: Option<WebhookConfig>,
    pub host: String,
    pub port: u16,
}

/// Inbound webhook settings
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// Shared secret used as the HMAC key
    pub secret: SecretString,
    /// Name of the header carrying the signature
    pub signature_header: String,
    /// Allowed clock distance between the signed timestamp and now
    pub tolerance_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let webhooks_enabled = match lookup("WEBHOOKS_ENABLED") {
            Some(v) => parse_bool("WEBHOOKS_ENABLED", &v)?,
            None => true,
        };

        let webhook = if webhooks_enabled {
            Some(WebhookConfig {
                secret: SecretString::new(required(&lookup, "STRIPE_WEBHOOK_SECRET")?),
                signature_header: lookup("STRIPE_SIGNATURE_HEADER")
                    .unwrap_or_else(|| DEFAULT_SIGNATURE_HEADER.to_string()),
                tolerance_secs: parse_or(
                    &lookup,
                    "STRIPE_WEBHOOK_TOLERANCE_SECS",
                    DEFAULT_WEBHOOK_TOLERANCE_SECS,
                )?,
            })
        } else {
            debug!("Webhook handling disabled");
            None
        };

        let public_url = lookup("PUBLIC_URL")
            .unwrap_or_else(|| "http://localhost:3000".to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            stripe_secret_key: SecretString::new(required(&lookup, "STRIPE_SECRET_KEY")?),
            stripe_api_base: lookup("STRIPE_API_BASE")
                .unwrap_or_else(|| "https://api.stripe.com".to_string()),
            price_id: lookup("STRIPE_PRICE_ID").unwrap_or_else(|| DEFAULT_PRICE_ID.to_string()),
            public_url,
            webhook,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "PORT", 3000)?,
        })
    }

    /// Where Stripe sends the buyer after a completed payment
    pub fn success_url(&self) -> String {
        format!("{}/success", self.public_url)
    }

    /// Where Stripe sends the buyer after backing out
    pub fn cancel_url(&self) -> String {
        format!("{}/cancel", self.public_url)
    }
}

fn required<F>(lookup: &F, name: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(Error::Config(format!(
            "{} is not defined in environment variables",
            name
        ))),
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| Error::InvalidValue { name, value: v }),
        None => Ok(default),
    }
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::InvalidValue {
            name,
            value: value.to_string(),
        }),
    }
}
