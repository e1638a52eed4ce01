use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The caller's authority as hydrated from the user directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TenantResponse {
    pub role: Option<String>,
    pub school_id: Option<String>,
}
