use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShortTokenResponse {
    /// Session and device bound token for authenticated calls
    pub short_token: String,
}
