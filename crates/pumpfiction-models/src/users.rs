//! User identity models and DTOs.

use crate::ids::UserId;
use crate::roles::Role;
use pumpfiction_core::serde::deserialize_blank_as_none;
use pumpfiction_core::{PaginationMeta, PaginationParams};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Local mirror of an identity-provider user and their current role.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct UserIdentity {
    pub id: UserId,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Input for registering a user in the role store.
///
/// `id` is the identity provider's subject; `None` generates one.
#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct NewUser {
    pub id: Option<UserId>,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 200))]
    pub full_name: String,
    #[serde(default)]
    pub role: Role,
}

/// Body of `PUT /me`.
#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct UpdateProfileDto {
    #[validate(length(min = 1, max = 200, message = "full_name must be 1-200 characters"))]
    pub full_name: String,
}

/// Body of `PUT /admin/users/role`: direct administrative override.
#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct UpdateUserRoleDto {
    pub user_id: UserId,
    pub new_role: Role,
}

#[derive(Serialize, Debug, Clone, ToSchema)]
pub struct UpdateUserRoleResponse {
    pub message: String,
    pub user: UserIdentity,
    pub previous_role: Role,
}

/// Query filters for the admin user listing.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UserFilterParams {
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub role: Option<Role>,
    /// Case-insensitive substring match
    pub email: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub role: Option<Role>,
    pub email_contains: Option<String>,
}

impl UserFilterParams {
    /// Drops blank search terms so they don't filter everything out.
    pub fn filter(&self) -> UserFilter {
        UserFilter {
            role: self.role,
            email_contains: self
                .email
                .as_deref()
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(str::to_lowercase),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedUsersResponse {
    pub data: Vec<UserIdentity>,
    pub meta: PaginationMeta,
}
