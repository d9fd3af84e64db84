//! Role-based authorization.
//!
//! Routers gate whole route groups with [`require_admin`] via
//! `middleware::from_fn_with_state`. Handlers with finer needs can call
//! [`check_role`] on a [`CurrentUser`].

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::Response,
};

use pumpfiction_core::AppError;
use pumpfiction_models::Role;

use crate::middleware::auth::CurrentUser;
use crate::state::AppState;

/// Fails with 403 unless the user holds one of `allowed`.
pub fn check_role(user: &CurrentUser, allowed: &[Role]) -> Result<(), AppError> {
    if allowed.contains(&user.role()) {
        return Ok(());
    }

    tracing::warn!(
        user_id = %user.id(),
        role = %user.role(),
        "Access denied by role check"
    );
    Err(AppError::forbidden(format!(
        "Access denied. Required role: {}",
        allowed
            .iter()
            .map(Role::as_str)
            .collect::<Vec<_>>()
            .join(" or ")
    )))
}

/// Resolves the caller, checks their role and stores the resolved
/// [`CurrentUser`] in request extensions for the handler.
pub async fn require_roles(
    state: &AppState,
    req: Request,
    next: Next,
    allowed: &[Role],
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let current = CurrentUser::from_request_parts(&mut parts, state).await?;
    check_role(&current, allowed)?;
    parts.extensions.insert(current);

    Ok(next.run(Request::from_parts(parts, body)).await)
}

pub async fn require_admin(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    require_roles(&state, req, next, &[Role::Admin]).await
}
