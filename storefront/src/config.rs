//! Configuration management for the storefront application.
//!
//! Loads configuration from environment variables with sensible defaults.

use crate::types::Money;
use serde::{Deserialize, Serialize};
use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application server configuration
    pub server: ServerConfig,
    /// Payment gateway configuration
    pub gateway: GatewayConfig,
    /// Pricing configuration
    pub pricing: PricingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout: u64,
}

/// Payment gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Base URL the hosted checkout redirects back to
    pub checkout_base_url: String,
    /// Shared secret the webhook endpoint requires in `x-webhook-secret`.
    ///
    /// When unset, the webhook endpoint refuses all notifications; the
    /// storefront still works via bank-transfer reservations.
    pub webhook_secret: Option<String>,
    /// ISO currency code passed to the gateway
    pub currency: String,
}

/// Pricing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Price of one ticket when no single-ticket package is configured
    pub single_ticket_price: Money,
}

impl Config {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(8080),
                log_level: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
                shutdown_timeout: env::var("SHUTDOWN_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            },
            gateway: GatewayConfig {
                checkout_base_url: env::var("CHECKOUT_BASE_URL")
                    .unwrap_or_else(|_| "http://localhost:8080".to_string()),
                webhook_secret: env::var("WEBHOOK_SECRET").ok(),
                currency: env::var("CURRENCY").unwrap_or_else(|_| "mxn".to_string()),
            },
            pricing: PricingConfig {
                single_ticket_price: Money::from_pesos(
                    env::var("SINGLE_TICKET_PRICE_PESOS")
                        .ok()
                        .and_then(|s| s.parse().ok())
                        .unwrap_or(150),
                ),
            },
        }
    }
}
