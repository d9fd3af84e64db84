//! # Pump-Fiction Auth
//!
//! Bearer token handling for the Pump-Fiction API.
//!
//! Access tokens are issued by the identity provider (HS256, shared secret).
//! The API verifies them with [`verify_token`] and resolves the subject against
//! the role store; the role is never read from the token itself.
//! [`create_access_token`] exists for the admin CLI and tests.
//!
//! ```ignore
//! use pumpfiction_auth::{create_access_token, verify_token};
//! use pumpfiction_config::JwtConfig;
//!
//! let config = JwtConfig::from_env();
//! let token = create_access_token(user_id, "user@example.com", &config)?;
//! let claims = verify_token(&token, &config)?;
//! assert_eq!(claims.sub, user_id.to_string());
//! ```

pub mod claims;
pub mod jwt;

pub use claims::Claims;
pub use jwt::{create_access_token, verify_token};
