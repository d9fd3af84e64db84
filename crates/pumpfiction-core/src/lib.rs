//! # Pump-Fiction Core
//!
//! Foundational types shared by every Pump-Fiction crate:
//!
//! - [`errors`]: [`AppError`], the error type rendered by HTTP handlers
//! - [`pagination`]: pagination query parameters and response metadata
//! - [`serde`]: query-string deserialization helpers

pub mod errors;
pub mod pagination;
pub mod serde;

pub use errors::AppError;
pub use pagination::{PaginationMeta, PaginationParams};
