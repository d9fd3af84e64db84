use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use pumpfiction_core::AppError;
use pumpfiction_models::{
    ApplicationDecisionRequest, ApplicationFilterParams, ApplicationId, ApplicationStatus,
    ReviewResponse, RoleApplication, RoleApplicationRequest,
};

use crate::middleware::auth::CurrentUser;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Apply for the trainer or seller role
#[utoipa::path(
    post,
    path = "/api/auth/apply-role",
    request_body = RoleApplicationRequest,
    responses(
        (status = 201, description = "Application submitted", body = RoleApplication),
        (status = 400, description = "Role cannot be requested, role unchanged, or missing reason"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "A pending application already exists"),
        (status = 422, description = "Validation error")
    ),
    tag = "Role Applications",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user, body), fields(user_id = %user.id()))]
pub async fn apply_for_role(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidatedJson(body): ValidatedJson<RoleApplicationRequest>,
) -> Result<(StatusCode, Json<RoleApplication>), AppError> {
    let application = state
        .role_applications
        .submit_application(user.id(), body)
        .await?;

    Ok((StatusCode::CREATED, Json(application)))
}

/// List the caller's own role applications, newest first
#[utoipa::path(
    get,
    path = "/api/auth/my-applications",
    responses(
        (status = 200, description = "The caller's applications", body = Vec<RoleApplication>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Role Applications",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user), fields(user_id = %user.id()))]
pub async fn get_my_applications(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<RoleApplication>>, AppError> {
    let applications = state
        .role_applications
        .list_applications_for_user(user.id())
        .await?;
    Ok(Json(applications))
}

/// List pending applications, newest first
#[utoipa::path(
    get,
    path = "/api/auth/admin/applications/pending",
    responses(
        (status = 200, description = "Pending applications", body = Vec<RoleApplication>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires admin role")
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_pending_applications(
    State(state): State<AppState>,
) -> Result<Json<Vec<RoleApplication>>, AppError> {
    let applications = state.role_applications.list_pending_applications().await?;
    Ok(Json(applications))
}

/// List all applications with optional filters
#[utoipa::path(
    get,
    path = "/api/auth/admin/applications",
    params(ApplicationFilterParams),
    responses(
        (status = 200, description = "Matching applications", body = Vec<RoleApplication>),
        (status = 400, description = "Invalid filter value"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires admin role")
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_all_applications(
    State(state): State<AppState>,
    Query(filters): Query<ApplicationFilterParams>,
) -> Result<Json<Vec<RoleApplication>>, AppError> {
    let applications = state
        .role_applications
        .list_applications(filters.into())
        .await?;
    Ok(Json(applications))
}

/// Approve or reject a pending application
///
/// Approval also updates the applicant's role. If the role update cannot be
/// completed the application stays approved with `role_sync = pending` and the
/// call fails with 502.
#[utoipa::path(
    post,
    path = "/api/auth/admin/applications/review",
    request_body = ApplicationDecisionRequest,
    responses(
        (status = 200, description = "Application reviewed", body = ReviewResponse),
        (status = 400, description = "Decision must be approved or rejected"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires admin role"),
        (status = 404, description = "Application not found"),
        (status = 409, description = "Application already reviewed"),
        (status = 502, description = "Approved, but the role update is still pending")
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, admin, body), fields(admin_id = %admin.id(), application_id = %body.application_id))]
pub async fn review_application(
    State(state): State<AppState>,
    admin: CurrentUser,
    ValidatedJson(body): ValidatedJson<ApplicationDecisionRequest>,
) -> Result<Json<ReviewResponse>, AppError> {
    let outcome = state
        .role_applications
        .review_application(
            body.application_id,
            body.decision,
            body.admin_notes,
            admin.id(),
        )
        .await?;

    let application = outcome.application;
    let approved = application.status == ApplicationStatus::Approved;
    let message = if approved {
        format!(
            "Application approved. User role updated to {}",
            application.requested_role
        )
    } else {
        "Application rejected".to_string()
    };

    Ok(Json(ReviewResponse {
        message,
        application_id: application.id,
        user_id: application.user_id,
        new_role: approved.then_some(application.requested_role),
        role_updated: outcome.role_updated,
        application,
    }))
}

/// Retry the role update of an approved application
#[utoipa::path(
    post,
    path = "/api/auth/admin/applications/{id}/sync-role",
    params(
        ("id" = ApplicationId, Path, description = "Application ID")
    ),
    responses(
        (status = 200, description = "Role updated", body = RoleApplication),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires admin role"),
        (status = 404, description = "Application not found"),
        (status = 409, description = "No role update is pending, or the user's role changed since approval"),
        (status = 502, description = "Role update failed again")
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn sync_application_role(
    State(state): State<AppState>,
    Path(id): Path<ApplicationId>,
) -> Result<Json<RoleApplication>, AppError> {
    let application = state.role_applications.retry_role_sync(id).await?;
    Ok(Json(application))
}
