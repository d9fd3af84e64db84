//! Persistence port for role applications.

use async_trait::async_trait;

use pumpfiction_models::{
    ApplicationFilter, ApplicationId, NewRoleApplication, ReviewRecord, RoleApplication,
    RoleSyncState, UserId,
};

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("user {0} already has a pending role application")]
    DuplicatePending(UserId),
    #[error("application store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait RoleApplicationRepository: Send + Sync {
    /// Persists a new `pending` application.
    ///
    /// Implementations must reject a second pending application for the same
    /// user atomically with the insert, returning `DuplicatePending`.
    async fn insert_pending(
        &self,
        application: NewRoleApplication,
    ) -> Result<RoleApplication, RepositoryError>;

    async fn find_by_id(&self, id: ApplicationId)
    -> Result<Option<RoleApplication>, RepositoryError>;

    async fn find_pending_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<RoleApplication>, RepositoryError>;

    /// Matching applications, newest first.
    async fn list(&self, filter: ApplicationFilter)
    -> Result<Vec<RoleApplication>, RepositoryError>;

    /// Moves a `pending` application to the review's decision.
    ///
    /// Compare-and-swap on `status`: returns `None` when the application does
    /// not exist or is no longer pending, in which case nothing is written.
    async fn transition(
        &self,
        id: ApplicationId,
        review: &ReviewRecord,
    ) -> Result<Option<RoleApplication>, RepositoryError>;

    async fn set_role_sync(
        &self,
        id: ApplicationId,
        state: RoleSyncState,
    ) -> Result<Option<RoleApplication>, RepositoryError>;
}
