//! Application configuration loaded from environment variables.

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `3000`)
/// - `TENANT_SLUG` — slug of the tenant owning this deployment
///   (default: `"default"`)
/// - `CART_TTL_SECS` — idle expiry for abandoned carts (default: `1800`)
/// - `PAYMENT_DELAY_MS` — simulated payment gateway delay (default: `500`)
/// - `SETTLEMENT_DELAY_MS` — simulated settlement processing interval
///   (default: `3000`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub tenant_slug: String,
    pub cart_ttl_secs: u64,
    pub payment_delay_ms: u64,
    pub settlement_delay_ms: u64,
    pub log_level: String,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            tenant_slug: std::env::var("TENANT_SLUG").unwrap_or_else(|_| "default".to_string()),
            cart_ttl_secs: std::env::var("CART_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1800),
            payment_delay_ms: std::env::var("PAYMENT_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(500),
            settlement_delay_ms: std::env::var("SETTLEMENT_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            tenant_slug: "default".to_string(),
            cart_ttl_secs: 1800,
            payment_delay_ms: 500,
            settlement_delay_ms: 3000,
            log_level: "info".to_string(),
        }
    }
}
