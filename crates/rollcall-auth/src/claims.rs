//! Token claim structures.
//!
//! - [`SignedClaims`]: exactly what is encoded in a token
//! - [`TokenClaims`]: the verified claims, optionally hydrated with the
//!   user's role and school from the user directory

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::roles::Role;

/// Claims encoded in long and short tokens.
///
/// Long tokens omit `session_id` and `device_id`; short tokens carry both.
/// Authority (role, school) is never signed into a token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedClaims {
    pub user_id: String,
    pub user_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    /// Expiration timestamp (Unix timestamp)
    pub exp: usize,
    /// Issued-at timestamp (Unix timestamp)
    pub iat: usize,
}

/// Verified token claims.
///
/// `role` and `school_id` are never read from the token itself; they are
/// filled in by the token middleware from the user directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenClaims {
    /// User ID
    pub user_id: String,
    /// User key bound to the account
    pub user_key: String,
    /// Session ID (short tokens only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Device fingerprint (short tokens only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    /// Authority role, hydrated after verification
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub role: Option<Role>,
    /// School assignment, hydrated after verification
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school_id: Option<String>,
    pub exp: usize,
    pub iat: usize,
}

impl TokenClaims {
    pub fn is_short(&self) -> bool {
        self.session_id.is_some() && self.device_id.is_some()
    }

    pub fn hydrate(mut self, role: Role, school_id: Option<String>) -> Self {
        self.role = Some(role);
        self.school_id = school_id;
        self
    }
}

impl From<SignedClaims> for TokenClaims {
    fn from(signed: SignedClaims) -> Self {
        Self {
            user_id: signed.user_id,
            user_key: signed.user_key,
            session_id: signed.session_id,
            device_id: signed.device_id,
            role: None,
            school_id: None,
            exp: signed.exp,
            iat: signed.iat,
        }
    }
}
