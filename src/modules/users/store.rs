//! The identity & role store port.
//!
//! Every authorization decision reads the caller's role through [`RoleStore`];
//! the role application workflow also writes through it on approval.

use async_trait::async_trait;

use pumpfiction_core::AppError;
use pumpfiction_models::{NewUser, Role, UserFilter, UserId, UserIdentity};

#[derive(Debug, thiserror::Error)]
pub enum RoleStoreError {
    #[error("user {0} not found")]
    NotFound(UserId),
    #[error("a user with email {0} already exists")]
    Conflict(String),
    #[error("role store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait RoleStore: Send + Sync {
    async fn find_user(&self, user_id: UserId) -> Result<Option<UserIdentity>, RoleStoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserIdentity>, RoleStoreError>;

    async fn get_role(&self, user_id: UserId) -> Result<Role, RoleStoreError> {
        self.find_user(user_id)
            .await?
            .map(|user| user.role)
            .ok_or(RoleStoreError::NotFound(user_id))
    }

    /// Sets the user's role. Setting the role a user already has succeeds.
    async fn set_role(&self, user_id: UserId, role: Role) -> Result<UserIdentity, RoleStoreError>;

    async fn update_full_name(
        &self,
        user_id: UserId,
        full_name: &str,
    ) -> Result<UserIdentity, RoleStoreError>;

    async fn create_user(&self, new_user: NewUser) -> Result<UserIdentity, RoleStoreError>;

    /// Newest users first. Returns the page and the total number of matches.
    async fn list_users(
        &self,
        filter: &UserFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<UserIdentity>, i64), RoleStoreError>;
}

impl From<RoleStoreError> for AppError {
    fn from(err: RoleStoreError) -> Self {
        match err {
            RoleStoreError::NotFound(_) => AppError::not_found(err),
            RoleStoreError::Conflict(_) => AppError::conflict(err),
            RoleStoreError::Unavailable(_) => AppError::service_unavailable(err),
        }
    }
}
