use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use pumpfiction_core::{PaginationMeta, PaginationParams};
use pumpfiction_models::{
    ApplicationDecisionRequest, ApplicationId, ApplicationStatus, PaginatedUsersResponse,
    ReviewDecision, ReviewResponse, Role, RoleApplication, RoleApplicationRequest,
    RoleSyncReport, RoleSyncState, UpdateProfileDto, UpdateUserRoleDto, UpdateUserRoleResponse,
    UserId, UserIdentity,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::users::controller::get_me,
        crate::modules::users::controller::update_me,
        crate::modules::users::controller::get_users,
        crate::modules::users::controller::update_user_role,
        crate::modules::role_applications::controller::apply_for_role,
        crate::modules::role_applications::controller::get_my_applications,
        crate::modules::role_applications::controller::get_pending_applications,
        crate::modules::role_applications::controller::get_all_applications,
        crate::modules::role_applications::controller::review_application,
        crate::modules::role_applications::controller::sync_application_role,
    ),
    components(
        schemas(
            UserId,
            ApplicationId,
            Role,
            ApplicationStatus,
            ReviewDecision,
            RoleSyncState,
            UserIdentity,
            UpdateProfileDto,
            UpdateUserRoleDto,
            UpdateUserRoleResponse,
            PaginatedUsersResponse,
            RoleApplication,
            RoleApplicationRequest,
            ApplicationDecisionRequest,
            ReviewResponse,
            RoleSyncReport,
            PaginationMeta,
            PaginationParams,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Users", description = "Current user profile"),
        (name = "Role Applications", description = "Apply for the trainer or seller role"),
        (name = "Admin", description = "Application review and user administration")
    ),
    info(
        title = "Pump-Fiction API",
        version = "0.1.0",
        description = "Role applications and approval workflow for the Pump-Fiction fitness platform.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_workflow_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/auth/me",
            "/api/auth/apply-role",
            "/api/auth/my-applications",
            "/api/auth/admin/applications",
            "/api/auth/admin/applications/pending",
            "/api/auth/admin/applications/review",
            "/api/auth/admin/applications/{id}/sync-role",
            "/api/auth/admin/users",
            "/api/auth/admin/users/role",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn test_bearer_scheme_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
