use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use pumpfiction_auth::{Claims, verify_token};
use pumpfiction_core::AppError;
use pumpfiction_models::{Role, UserId, UserIdentity};

use crate::state::AppState;

/// Extractor that validates the bearer token and provides its claims.
///
/// Claims carry identity only; use [`CurrentUser`] for anything that depends
/// on the caller's role.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn user_id(&self) -> Result<UserId, AppError> {
        self.0
            .user_uuid()
            .map(UserId::from_uuid)
            .ok_or_else(|| AppError::unauthorized("Invalid user ID in token"))
    }

    pub fn email(&self) -> &str {
        &self.0.email
    }
}

fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let auth_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::unauthorized("Missing authorization header"))?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::unauthorized("Invalid authorization header format"))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = verify_token(token, &state.jwt_config)?;
        Ok(AuthUser(claims))
    }
}

/// The authenticated caller as recorded in the role store.
///
/// The role always comes from the store, never from the token. Tokens for
/// users the store does not know are rejected with 401.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserIdentity);

impl CurrentUser {
    pub fn id(&self) -> UserId {
        self.0.id
    }

    pub fn role(&self) -> Role {
        self.0.role
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Already resolved by the admin gate
        if let Some(current) = parts.extensions.get::<CurrentUser>() {
            return Ok(current.clone());
        }

        let auth_user = AuthUser::from_request_parts(parts, state).await?;
        let user_id = auth_user.user_id()?;

        let user = state
            .users
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::unauthorized("User not found"))?;

        Ok(CurrentUser(user))
    }
}
