use pumpfiction_core::AppError;
use pumpfiction_models::{ApplicationId, ApplicationStatus, Role, RoleApplication, UserId};

use crate::modules::role_applications::repository::RepositoryError;
use crate::modules::users::store::RoleStoreError;

/// Failures of the role application workflow.
#[derive(Debug, thiserror::Error)]
pub enum RoleApplicationError {
    #[error("{0}")]
    InvalidRole(String),
    #[error("reason is required")]
    MissingReason,
    #[error("decision must be 'approved' or 'rejected'")]
    InvalidDecision,
    #[error("You already have a pending role application")]
    DuplicatePending,
    #[error("Application {0} not found")]
    NotFound(ApplicationId),
    #[error("User {0} not found")]
    UserNotFound(UserId),
    #[error("Application has already been reviewed (status: {0})")]
    AlreadyReviewed(ApplicationStatus),
    #[error("Application {0} has no pending role update")]
    NothingToSync(ApplicationId),
    /// The user's role moved away from the one recorded at submission after
    /// the approval, so the pending role write is not applied.
    #[error(
        "User's role changed to {role} after application {application_id} was approved; set the role manually to resolve"
    )]
    RoleChangedSinceApproval {
        application_id: ApplicationId,
        role: Role,
    },
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
    /// The application is durably `approved` with `role_sync = pending`, but
    /// the role store never accepted the new role.
    #[error(
        "Application {application_id} was approved but updating the user's role failed after {attempts} attempt(s); the role update is pending"
    )]
    PartialApprovalFailure {
        application_id: ApplicationId,
        application: Box<RoleApplication>,
        attempts: u32,
        #[source]
        source: RoleStoreError,
    },
}

impl From<RepositoryError> for RoleApplicationError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::DuplicatePending(_) => RoleApplicationError::DuplicatePending,
            RepositoryError::Unavailable(msg) => RoleApplicationError::StoreUnavailable(msg),
        }
    }
}

impl From<RoleStoreError> for RoleApplicationError {
    fn from(err: RoleStoreError) -> Self {
        match err {
            RoleStoreError::NotFound(user_id) => RoleApplicationError::UserNotFound(user_id),
            other => RoleApplicationError::StoreUnavailable(other.to_string()),
        }
    }
}

impl From<RoleApplicationError> for AppError {
    fn from(err: RoleApplicationError) -> Self {
        use RoleApplicationError::*;
        match err {
            InvalidRole(_) | MissingReason | InvalidDecision => AppError::bad_request(err),
            DuplicatePending
            | AlreadyReviewed(_)
            | NothingToSync(_)
            | RoleChangedSinceApproval { .. } => AppError::conflict(err),
            NotFound(_) | UserNotFound(_) => AppError::not_found(err),
            StoreUnavailable(_) => AppError::service_unavailable(err),
            PartialApprovalFailure { .. } => AppError::bad_gateway(err),
        }
    }
}
