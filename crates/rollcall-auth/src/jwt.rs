//! Issuing and verifying signed tokens.
//!
//! Verification never fails loudly: any parse, signature or expiry problem
//! yields `None`, so callers treat invalid and missing tokens the same way.

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use rollcall_config::TokenConfig;
use rollcall_core::AppError;

use crate::claims::{SignedClaims, TokenClaims};

/// Issues and verifies long and short tokens.
#[derive(Clone)]
pub struct TokenService {
    config: TokenConfig,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("long_token_expiry", &self.config.long_token_expiry)
            .field("short_token_expiry", &self.config.short_token_expiry)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(config: TokenConfig) -> Self {
        Self { config }
    }

    /// Creates an account-level long token.
    ///
    /// # Errors
    ///
    /// Returns an internal error if encoding fails.
    pub fn issue_long_token(&self, user_id: &str, user_key: &str) -> Result<String, AppError> {
        let (iat, exp) = lifetime(self.config.long_token_expiry);
        let claims = SignedClaims {
            user_id: user_id.to_string(),
            user_key: user_key.to_string(),
            session_id: None,
            device_id: None,
            exp,
            iat,
        };

        sign(&claims, &self.config.long_token_secret)
            .map_err(|e| AppError::internal(anyhow::anyhow!("Failed to create long token: {}", e)))
    }

    /// Creates a short token bound to `session_id` and `device_id`.
    ///
    /// # Errors
    ///
    /// Returns an internal error if encoding fails.
    pub fn issue_short_token(
        &self,
        user_id: &str,
        user_key: &str,
        session_id: &str,
        device_id: &str,
    ) -> Result<String, AppError> {
        let (iat, exp) = lifetime(self.config.short_token_expiry);
        let claims = SignedClaims {
            user_id: user_id.to_string(),
            user_key: user_key.to_string(),
            session_id: Some(session_id.to_string()),
            device_id: Some(device_id.to_string()),
            exp,
            iat,
        };

        sign(&claims, &self.config.short_token_secret).map_err(|e| {
            AppError::internal(anyhow::anyhow!("Failed to create short token: {}", e))
        })
    }

    /// Verifies `token` against `secret`.
    ///
    /// Returns `None` for malformed, tampered or expired tokens.
    pub fn verify(token: &str, secret: &str) -> Option<TokenClaims> {
        match decode::<SignedClaims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        ) {
            Ok(data) => Some(data.claims.into()),
            Err(e) => {
                tracing::debug!(error = %e, "Token verification failed");
                None
            }
        }
    }

    pub fn verify_long(&self, token: &str) -> Option<TokenClaims> {
        Self::verify(token, &self.config.long_token_secret)
    }

    pub fn verify_short(&self, token: &str) -> Option<TokenClaims> {
        Self::verify(token, &self.config.short_token_secret)
    }
}

/// Issued-at and expiry timestamps for a token living `expiry_secs`.
fn lifetime(expiry_secs: i64) -> (usize, usize) {
    let now = Utc::now().timestamp();
    let exp = now.saturating_add(expiry_secs).max(0);
    (now as usize, exp as usize)
}

fn sign(claims: &SignedClaims, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}
