//! # Pump-Fiction Config
//!
//! Configuration structures loaded from environment variables:
//!
//! - [`jwt`]: bearer token verification settings
//! - [`cors`]: allowed browser origins
//! - [`role_sync`]: retry policy for the approval role write
//! - [`server`]: listener addresses and storage backend selection
//!
//! ```ignore
//! use pumpfiction_config::{CorsConfig, JwtConfig, RoleSyncConfig, ServerConfig};
//!
//! let jwt_config = JwtConfig::from_env();
//! let role_sync = RoleSyncConfig::from_env();
//! ```

pub mod cors;
pub mod jwt;
pub mod role_sync;
pub mod server;

pub use cors::CorsConfig;
pub use jwt::JwtConfig;
pub use role_sync::RoleSyncConfig;
pub use server::{ServerConfig, StorageBackend};

/// Reads and parses an environment variable, falling back to `default` when it
/// is unset or unparsable.
pub(crate) fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
