use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Result of a logout / logout-all operation.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LogoutResponse {
    pub message: String,
    /// Number of refresh-token records actually flipped to revoked
    pub tokens_revoked: u64,
}
