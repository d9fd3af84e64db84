//! Bearer token settings.
//!
//! Access tokens are issued by the identity provider and signed with a shared
//! HS256 secret. The API only verifies them; `access_token_expiry` is used by
//! the development tooling that mints tokens locally.
//!
//! # Environment Variables
//!
//! - `JWT_SECRET`: shared signing secret
//! - `JWT_ACCESS_EXPIRY`: lifetime in seconds of locally minted tokens (default: 3600)
//! - `JWT_AUDIENCE`: expected `aud` claim; when unset the audience is not checked

use std::env;

#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expiry: i64,
    pub audience: Option<String>,
}

impl JwtConfig {
    pub fn from_env() -> Self {
        Self {
            secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| "your-secret-key-change-in-production".to_string()),
            access_token_expiry: crate::env_or("JWT_ACCESS_EXPIRY", 3600), // 1 hour
            audience: env::var("JWT_AUDIENCE")
                .ok()
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty()),
        }
    }
}
