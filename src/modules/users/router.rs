use axum::{
    Router,
    routing::{get, put},
};

use crate::modules::users::controller::{get_me, get_users, update_me, update_user_role};
use crate::state::AppState;

pub fn init_users_router() -> Router<AppState> {
    Router::new().route("/me", get(get_me).put(update_me))
}

/// Admin routes; mounted behind the admin gate.
pub fn init_admin_users_router() -> Router<AppState> {
    Router::new()
        .route("/users", get(get_users))
        .route("/users/role", put(update_user_role))
}
