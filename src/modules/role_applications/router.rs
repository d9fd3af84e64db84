use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    apply_for_role, get_all_applications, get_my_applications, get_pending_applications,
    review_application, sync_application_role,
};

/// Routes available to any authenticated user.
pub fn init_role_applications_router() -> Router<AppState> {
    Router::new()
        .route("/apply-role", post(apply_for_role))
        .route("/my-applications", get(get_my_applications))
}

/// Admin routes; mounted behind the admin gate.
pub fn init_admin_applications_router() -> Router<AppState> {
    Router::new()
        .route("/applications", get(get_all_applications))
        .route("/applications/pending", get(get_pending_applications))
        .route("/applications/review", post(review_application))
        .route("/applications/{id}/sync-role", post(sync_application_role))
}
