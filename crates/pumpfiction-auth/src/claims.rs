//! Access token claims.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Claims carried by an access token.
///
/// Only the subject and email are trusted from the token. Provider-specific
/// extras (`role`, `user_metadata`, ...) are ignored on purpose: the role
/// store is the single source of truth for authorization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    /// User ID (subject claim)
    pub sub: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    /// Expiration (Unix timestamp)
    pub exp: usize,
    /// Issued-at (Unix timestamp)
    #[serde(default)]
    pub iat: usize,
}

impl Claims {
    /// Parses the subject as a UUID.
    pub fn user_uuid(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }
}
