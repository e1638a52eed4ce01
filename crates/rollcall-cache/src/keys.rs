//! Cache key builders.
//!
//! Keys are unprefixed here; [`RedisCache`](crate::RedisCache) applies the
//! configured prefix on every operation.

/// Key of the fixed-window request counter for a client address.
pub fn rate_limit(client: &str) -> String {
    format!("ratelimit:{}", client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_key() {
        assert_eq!(rate_limit("10.0.0.1"), "ratelimit:10.0.0.1");
        assert_eq!(rate_limit("unknown"), "ratelimit:unknown");
    }
}
