//! Role application models and DTOs.
//!
//! A [`RoleApplication`] is a user's request to move from their current role
//! to `trainer` or `seller`. The applicant's email, name and role are copied
//! onto the record at submission and never refreshed afterwards.

use crate::ids::{ApplicationId, UserId};
use crate::roles::{ApplicationStatus, ReviewDecision, Role, RoleSyncState};
use chrono::{DateTime, Utc};
use pumpfiction_core::serde::deserialize_blank_as_none;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// A persisted role application.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct RoleApplication {
    pub id: ApplicationId,
    pub user_id: UserId,
    pub user_email: String,
    pub user_name: String,
    pub requested_role: Role,
    pub current_role: Role,
    pub status: ApplicationStatus,
    pub reason: String,
    pub qualifications: Option<String>,
    pub admin_notes: Option<String>,
    /// Admin who made the decision
    pub reviewed_by: Option<UserId>,
    pub role_sync: RoleSyncState,
    pub created_at: DateTime<Utc>,
    /// Set when the application leaves `pending`
    pub updated_at: Option<DateTime<Utc>>,
}

/// Everything needed to persist a new pending application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRoleApplication {
    pub user_id: UserId,
    pub user_email: String,
    pub user_name: String,
    pub requested_role: Role,
    pub current_role: Role,
    pub reason: String,
    pub qualifications: Option<String>,
}

impl NewRoleApplication {
    /// Materializes the record a store would write for this input.
    pub fn into_pending(self, id: ApplicationId, created_at: DateTime<Utc>) -> RoleApplication {
        RoleApplication {
            id,
            user_id: self.user_id,
            user_email: self.user_email,
            user_name: self.user_name,
            requested_role: self.requested_role,
            current_role: self.current_role,
            status: ApplicationStatus::Pending,
            reason: self.reason,
            qualifications: self.qualifications,
            admin_notes: None,
            reviewed_by: None,
            role_sync: RoleSyncState::NotRequired,
            created_at,
            updated_at: None,
        }
    }
}

/// Body of `POST /apply-role`.
#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct RoleApplicationRequest {
    /// `trainer` or `seller`
    pub requested_role: Role,
    #[validate(length(max = 2000, message = "reason must be at most 2000 characters"))]
    pub reason: String,
    #[validate(length(max = 4000, message = "qualifications must be at most 4000 characters"))]
    pub qualifications: Option<String>,
}

/// Body of `POST /admin/applications/review`.
///
/// `decision` accepts any status so that `pending` can be rejected with a
/// clear message instead of a deserialization failure.
#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct ApplicationDecisionRequest {
    pub application_id: ApplicationId,
    pub decision: ApplicationStatus,
    #[validate(length(max = 2000, message = "admin_notes must be at most 2000 characters"))]
    pub admin_notes: Option<String>,
}

/// The write applied to a pending application when it is reviewed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRecord {
    pub decision: ReviewDecision,
    pub admin_notes: Option<String>,
    pub reviewed_by: UserId,
    pub reviewed_at: DateTime<Utc>,
}

impl ReviewRecord {
    pub fn status(&self) -> ApplicationStatus {
        self.decision.into()
    }

    /// Approvals owe the role store a write; rejections owe nothing.
    pub fn role_sync(&self) -> RoleSyncState {
        match self.decision {
            ReviewDecision::Approved => RoleSyncState::Pending,
            ReviewDecision::Rejected => RoleSyncState::NotRequired,
        }
    }

    /// Applies this review to a pending application.
    pub fn apply_to(&self, application: &mut RoleApplication) {
        application.status = self.status();
        application.admin_notes = self.admin_notes.clone();
        application.reviewed_by = Some(self.reviewed_by);
        application.role_sync = self.role_sync();
        application.updated_at = Some(self.reviewed_at);
    }
}

/// Response of `POST /admin/applications/review`.
#[derive(Serialize, Debug, Clone, ToSchema)]
pub struct ReviewResponse {
    pub message: String,
    pub application_id: ApplicationId,
    pub user_id: UserId,
    /// Present when the application was approved
    pub new_role: Option<Role>,
    /// True when the approved role was written to the role store
    pub role_updated: bool,
    pub application: RoleApplication,
}

/// Query parameters of `GET /admin/applications`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ApplicationFilterParams {
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub status: Option<ApplicationStatus>,
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub user_id: Option<UserId>,
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub role_sync: Option<RoleSyncState>,
}

/// Store-level application filter. Empty matches everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplicationFilter {
    pub status: Option<ApplicationStatus>,
    pub user_id: Option<UserId>,
    pub role_sync: Option<RoleSyncState>,
}

impl ApplicationFilter {
    pub fn pending() -> Self {
        Self {
            status: Some(ApplicationStatus::Pending),
            ..Self::default()
        }
    }

    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::default()
        }
    }

    pub fn awaiting_role_sync() -> Self {
        Self {
            status: Some(ApplicationStatus::Approved),
            role_sync: Some(RoleSyncState::Pending),
            ..Self::default()
        }
    }

    pub fn matches(&self, application: &RoleApplication) -> bool {
        self.status.is_none_or(|s| s == application.status)
            && self.user_id.is_none_or(|u| u == application.user_id)
            && self.role_sync.is_none_or(|r| r == application.role_sync)
    }
}

impl From<ApplicationFilterParams> for ApplicationFilter {
    fn from(params: ApplicationFilterParams) -> Self {
        Self {
            status: params.status,
            user_id: params.user_id,
            role_sync: params.role_sync,
        }
    }
}

/// Outcome of a role-sync reconciliation sweep.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, ToSchema)]
pub struct RoleSyncReport {
    pub attempted: usize,
    pub synced: usize,
    /// Applications whose role write still failed
    pub still_pending: Vec<ApplicationId>,
}
