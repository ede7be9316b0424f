use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Sessions unseen for longer than this are evicted from their room.
    pub stale_after_seconds: u64,
    pub sweep_interval_seconds: u64,
    pub guest_token_secret: String,
    pub guest_token_ttl_minutes: u64,
}

impl Config {
    pub fn new() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("Invalid PORT"),
            stale_after_seconds: env::var("STALE_AFTER_SECONDS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .expect("Invalid STALE_AFTER_SECONDS"),
            sweep_interval_seconds: env::var("SWEEP_INTERVAL_SECONDS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .expect("Invalid SWEEP_INTERVAL_SECONDS"),
            guest_token_secret: env::var("GUEST_TOKEN_SECRET")
                .unwrap_or_else(|_| "dev-guest-secret".to_string()),
            guest_token_ttl_minutes: env::var("GUEST_TOKEN_TTL_MINUTES")
                .unwrap_or_else(|_| "720".to_string())
                .parse()
                .expect("Invalid GUEST_TOKEN_TTL_MINUTES"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
