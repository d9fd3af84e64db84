use axum::{
    Json,
    extract::{Query, State},
};
use tracing::instrument;

use pumpfiction_core::AppError;

use crate::middleware::auth::CurrentUser;
use crate::modules::users::model::{
    PaginatedUsersResponse, UpdateProfileDto, UpdateUserRoleDto, UpdateUserRoleResponse,
    UserFilterParams, UserIdentity,
};
use crate::modules::users::service::UserService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Get the caller's identity and current role
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = UserIdentity),
        (status = 401, description = "Unauthorized - missing or invalid token")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(user), fields(user_id = %user.id()))]
pub async fn get_me(user: CurrentUser) -> Json<UserIdentity> {
    Json(user.0)
}

/// Update the caller's profile
#[utoipa::path(
    put,
    path = "/api/auth/me",
    request_body = UpdateProfileDto,
    responses(
        (status = 200, description = "Profile updated", body = UserIdentity),
        (status = 400, description = "Blank name"),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Validation error")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user, dto), fields(user_id = %user.id()))]
pub async fn update_me(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidatedJson(dto): ValidatedJson<UpdateProfileDto>,
) -> Result<Json<UserIdentity>, AppError> {
    let updated = UserService::update_profile(state.users.as_ref(), user.id(), dto).await?;
    Ok(Json(updated))
}

/// List users (admin)
#[utoipa::path(
    get,
    path = "/api/auth/admin/users",
    params(
        ("role" = Option<String>, Query, description = "Filter by role"),
        ("email" = Option<String>, Query, description = "Case-insensitive email substring"),
        ("limit" = Option<i64>, Query, description = "Page size (1-100, default 20)"),
        ("offset" = Option<i64>, Query, description = "Items to skip"),
        ("page" = Option<i64>, Query, description = "1-indexed page; overrides offset")
    ),
    responses(
        (status = 200, description = "Page of users", body = PaginatedUsersResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires admin role")
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_users(
    State(state): State<AppState>,
    Query(filters): Query<UserFilterParams>,
) -> Result<Json<PaginatedUsersResponse>, AppError> {
    let users = UserService::list_users(state.users.as_ref(), filters).await?;
    Ok(Json(users))
}

/// Set a user's role directly (admin)
#[utoipa::path(
    put,
    path = "/api/auth/admin/users/role",
    request_body = UpdateUserRoleDto,
    responses(
        (status = 200, description = "Role updated", body = UpdateUserRoleResponse),
        (status = 400, description = "Admins cannot revoke their own admin role"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires admin role"),
        (status = 404, description = "User not found")
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, admin), fields(admin_id = %admin.id()))]
pub async fn update_user_role(
    State(state): State<AppState>,
    admin: CurrentUser,
    ValidatedJson(dto): ValidatedJson<UpdateUserRoleDto>,
) -> Result<Json<UpdateUserRoleResponse>, AppError> {
    let response = UserService::override_role(state.users.as_ref(), admin.id(), dto).await?;
    Ok(Json(response))
}
