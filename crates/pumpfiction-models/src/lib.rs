//! # Pump-Fiction Models
//!
//! Domain models and DTOs for the Pump-Fiction API.
//!
//! # Modules
//!
//! - [`ids`]: Typed UUID identifiers
//! - [`roles`]: Role, application status, review decision and role-sync enums
//! - [`users`]: User identity records and admin user DTOs
//! - [`role_applications`]: Role application records, requests and filters
//!
//! ```ignore
//! use pumpfiction_models::{Role, RoleApplicationRequest};
//!
//! let request = RoleApplicationRequest {
//!     requested_role: Role::Trainer,
//!     reason: "5 years coaching".into(),
//!     qualifications: None,
//! };
//! assert!(request.requested_role.is_requestable());
//! ```

pub mod ids;
pub mod role_applications;
pub mod roles;
pub mod users;

pub use ids::{ApplicationId, UserId};

pub use roles::{ApplicationStatus, ParseEnumError, ReviewDecision, Role, RoleSyncState};

pub use users::{
    NewUser, PaginatedUsersResponse, UpdateProfileDto, UpdateUserRoleDto, UpdateUserRoleResponse,
    UserFilter, UserFilterParams, UserIdentity,
};

pub use role_applications::{
    ApplicationDecisionRequest, ApplicationFilter, ApplicationFilterParams, NewRoleApplication,
    ReviewRecord, ReviewResponse, RoleApplication, RoleApplicationRequest, RoleSyncReport,
};
