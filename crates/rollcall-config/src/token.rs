use std::env;

const YEAR_SECONDS: i64 = 365 * 24 * 60 * 60;

/// Signing configuration for the two token classes.
///
/// Long tokens are account credentials issued at registration; short tokens
/// are bound to one session and device. The two classes use independent
/// secrets so either can be rotated without invalidating the other.
///
/// # Environment Variables
///
/// - `LONG_TOKEN_SECRET`
/// - `SHORT_TOKEN_SECRET`
/// - `LONG_TOKEN_EXPIRY`: seconds, default 3 years
/// - `SHORT_TOKEN_EXPIRY`: seconds, default 1 year
#[derive(Clone, Debug)]
pub struct TokenConfig {
    pub long_token_secret: String,
    pub short_token_secret: String,
    pub long_token_expiry: i64,
    pub short_token_expiry: i64,
}

impl TokenConfig {
    pub fn from_env() -> Self {
        Self {
            long_token_secret: env::var("LONG_TOKEN_SECRET")
                .unwrap_or_else(|_| "long-token-secret-change-in-production".to_string()),
            short_token_secret: env::var("SHORT_TOKEN_SECRET")
                .unwrap_or_else(|_| "short-token-secret-change-in-production".to_string()),
            long_token_expiry: env::var("LONG_TOKEN_EXPIRY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3 * YEAR_SECONDS),
            short_token_expiry: env::var("SHORT_TOKEN_EXPIRY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(YEAR_SECONDS),
        }
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            long_token_secret: "long-token-secret-change-in-production".to_string(),
            short_token_secret: "short-token-secret-change-in-production".to_string(),
            long_token_expiry: 3 * YEAR_SECONDS,
            short_token_expiry: YEAR_SECONDS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lifetimes() {
        let config = TokenConfig::default();
        assert_eq!(config.long_token_expiry, 94_608_000);
        assert_eq!(config.short_token_expiry, 31_536_000);
        assert_ne!(config.long_token_secret, config.short_token_secret);
    }
}
