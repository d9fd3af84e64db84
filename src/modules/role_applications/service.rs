//! The role application workflow.
//!
//! Applications move `pending -> approved | rejected` exactly once. Approval
//! also has to land the requested role in the role store, which is a separate
//! system: the status change and `role_sync = pending` are written together,
//! then the role write is retried with backoff. Success marks the application
//! `synced`; exhaustion leaves it `pending` for [`RoleApplicationService::retry_role_sync`]
//! or [`RoleApplicationService::reconcile_role_sync`] and reports
//! [`RoleApplicationError::PartialApprovalFailure`].

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, instrument, warn};

use pumpfiction_config::RoleSyncConfig;
use pumpfiction_models::{
    ApplicationFilter, ApplicationId, ApplicationStatus, NewRoleApplication, ReviewDecision,
    ReviewRecord, Role, RoleApplication, RoleApplicationRequest, RoleSyncReport, RoleSyncState,
    UserId,
};

use crate::metrics::{
    track_application_reviewed, track_application_submitted, track_role_sync_failure,
};
use crate::modules::role_applications::error::RoleApplicationError;
use crate::modules::role_applications::repository::RoleApplicationRepository;
use crate::modules::users::store::{RoleStore, RoleStoreError};

/// Result of a successful review.
#[derive(Debug, Clone)]
pub struct ReviewOutcome {
    pub application: RoleApplication,
    /// True when an approval's role write reached the role store.
    pub role_updated: bool,
}

#[derive(Clone)]
pub struct RoleApplicationService {
    applications: Arc<dyn RoleApplicationRepository>,
    roles: Arc<dyn RoleStore>,
    role_sync: RoleSyncConfig,
}

fn trimmed(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

impl RoleApplicationService {
    pub fn new(
        applications: Arc<dyn RoleApplicationRepository>,
        roles: Arc<dyn RoleStore>,
        role_sync: RoleSyncConfig,
    ) -> Self {
        Self {
            applications,
            roles,
            role_sync,
        }
    }

    #[instrument(skip(self, request), fields(requested_role = %request.requested_role))]
    pub async fn submit_application(
        &self,
        user_id: UserId,
        request: RoleApplicationRequest,
    ) -> Result<RoleApplication, RoleApplicationError> {
        let requested_role = request.requested_role;
        if !requested_role.is_requestable() {
            return Err(RoleApplicationError::InvalidRole(format!(
                "Cannot apply for the {requested_role} role; only trainer or seller can be requested"
            )));
        }

        let reason = request.reason.trim();
        if reason.is_empty() {
            return Err(RoleApplicationError::MissingReason);
        }

        let user = self
            .roles
            .find_user(user_id)
            .await?
            .ok_or(RoleApplicationError::UserNotFound(user_id))?;

        if user.role == requested_role {
            return Err(RoleApplicationError::InvalidRole(format!(
                "You already have the {requested_role} role"
            )));
        }

        // Fast path for a friendlier error; the repository insert is the real guard.
        if self
            .applications
            .find_pending_for_user(user_id)
            .await?
            .is_some()
        {
            return Err(RoleApplicationError::DuplicatePending);
        }

        let application = self
            .applications
            .insert_pending(NewRoleApplication {
                user_id,
                user_email: user.email,
                user_name: user.full_name,
                requested_role,
                current_role: user.role,
                reason: reason.to_string(),
                qualifications: trimmed(request.qualifications),
            })
            .await?;

        info!(
            application_id = %application.id,
            user_id = %user_id,
            current_role = %application.current_role,
            "Role application submitted"
        );
        track_application_submitted(requested_role);

        Ok(application)
    }

    #[instrument(skip(self))]
    pub async fn list_pending_applications(
        &self,
    ) -> Result<Vec<RoleApplication>, RoleApplicationError> {
        Ok(self.applications.list(ApplicationFilter::pending()).await?)
    }

    #[instrument(skip(self))]
    pub async fn list_applications_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<RoleApplication>, RoleApplicationError> {
        Ok(self
            .applications
            .list(ApplicationFilter::for_user(user_id))
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn list_applications(
        &self,
        filter: ApplicationFilter,
    ) -> Result<Vec<RoleApplication>, RoleApplicationError> {
        Ok(self.applications.list(filter).await?)
    }

    /// Reviews a pending application.
    ///
    /// `decision` must be `approved` or `rejected`. Of two concurrent reviews
    /// of the same application exactly one succeeds; the other gets
    /// `AlreadyReviewed`.
    #[instrument(skip(self, admin_notes))]
    pub async fn review_application(
        &self,
        application_id: ApplicationId,
        decision: ApplicationStatus,
        admin_notes: Option<String>,
        reviewer: UserId,
    ) -> Result<ReviewOutcome, RoleApplicationError> {
        let decision = ReviewDecision::try_from(decision)
            .map_err(|_| RoleApplicationError::InvalidDecision)?;

        let review = ReviewRecord {
            decision,
            admin_notes: trimmed(admin_notes),
            reviewed_by: reviewer,
            reviewed_at: Utc::now(),
        };

        let application = match self.applications.transition(application_id, &review).await? {
            Some(application) => application,
            None => {
                return Err(match self.applications.find_by_id(application_id).await? {
                    Some(existing) => RoleApplicationError::AlreadyReviewed(existing.status),
                    None => RoleApplicationError::NotFound(application_id),
                });
            }
        };

        info!(
            application_id = %application.id,
            user_id = %application.user_id,
            decision = %decision,
            "Role application reviewed"
        );
        track_application_reviewed(decision);

        match decision {
            ReviewDecision::Rejected => Ok(ReviewOutcome {
                application,
                role_updated: false,
            }),
            ReviewDecision::Approved => {
                let application = self.complete_role_sync(application).await?;
                Ok(ReviewOutcome {
                    application,
                    role_updated: true,
                })
            }
        }
    }

    /// Re-attempts the role write for an approved application whose role
    /// update never landed.
    #[instrument(skip(self))]
    pub async fn retry_role_sync(
        &self,
        application_id: ApplicationId,
    ) -> Result<RoleApplication, RoleApplicationError> {
        let application = self
            .applications
            .find_by_id(application_id)
            .await?
            .ok_or(RoleApplicationError::NotFound(application_id))?;

        if !awaiting_role_sync(&application) {
            return Err(RoleApplicationError::NothingToSync(application_id));
        }

        self.resume_role_sync(application).await
    }

    /// Retries every approved application still waiting on its role write.
    #[instrument(skip(self))]
    pub async fn reconcile_role_sync(&self) -> Result<RoleSyncReport, RoleApplicationError> {
        let outstanding = self
            .applications
            .list(ApplicationFilter::awaiting_role_sync())
            .await?;

        let mut report = RoleSyncReport {
            attempted: outstanding.len(),
            ..RoleSyncReport::default()
        };

        for application in outstanding {
            let application_id = application.id;
            match self.resume_role_sync(application).await {
                Ok(_) => report.synced += 1,
                Err(err) => {
                    warn!(application_id = %application_id, error = %err, "Role sync still pending");
                    report.still_pending.push(application_id);
                }
            }
        }

        info!(
            attempted = report.attempted,
            synced = report.synced,
            still_pending = report.still_pending.len(),
            "Role sync reconciliation finished"
        );

        Ok(report)
    }

    /// Finishes the role write for an approval that is still `role_sync = pending`.
    ///
    /// The user's role may have changed since the approval. If it already is
    /// the requested role only the marker is cleared; if it is neither the
    /// role recorded at submission nor the requested one, nothing is written.
    async fn resume_role_sync(
        &self,
        application: RoleApplication,
    ) -> Result<RoleApplication, RoleApplicationError> {
        let role = self.roles.get_role(application.user_id).await?;

        if role == application.requested_role {
            info!(
                application_id = %application.id,
                role = %role,
                "Requested role already in place"
            );
            return Ok(self.mark_synced(application).await);
        }

        if role != application.current_role {
            warn!(
                application_id = %application.id,
                user_id = %application.user_id,
                role = %role,
                role_at_submission = %application.current_role,
                requested_role = %application.requested_role,
                "Role changed since approval; not overwriting"
            );
            return Err(RoleApplicationError::RoleChangedSinceApproval {
                application_id: application.id,
                role,
            });
        }

        self.complete_role_sync(application).await
    }

    /// Pushes the requested role to the role store and marks the application
    /// `synced`.
    async fn complete_role_sync(
        &self,
        application: RoleApplication,
    ) -> Result<RoleApplication, RoleApplicationError> {
        match self
            .set_role_with_retry(application.user_id, application.requested_role)
            .await
        {
            Ok(attempts) if attempts > 1 => info!(
                application_id = %application.id,
                attempts,
                "Role update succeeded after retrying"
            ),
            Ok(_) => {}
            Err((source, attempts)) => {
                error!(
                    application_id = %application.id,
                    user_id = %application.user_id,
                    requested_role = %application.requested_role,
                    attempts,
                    error = %source,
                    "Application approved but role update failed; role sync left pending"
                );
                track_role_sync_failure();
                return Err(RoleApplicationError::PartialApprovalFailure {
                    application_id: application.id,
                    application: Box::new(application),
                    attempts,
                    source,
                });
            }
        }

        Ok(self.mark_synced(application).await)
    }

    /// Clears the `role_sync` marker once the role is in place.
    async fn mark_synced(&self, application: RoleApplication) -> RoleApplication {
        match self
            .applications
            .set_role_sync(application.id, RoleSyncState::Synced)
            .await
        {
            Ok(Some(updated)) => updated,
            Ok(None) => application,
            Err(err) => {
                // The role is in place; a later reconciliation sees it and
                // clears the marker.
                warn!(
                    application_id = %application.id,
                    error = %err,
                    "Role updated but role sync marker could not be cleared"
                );
                application
            }
        }
    }

    /// Returns the number of attempts used on success, or the last error and
    /// the attempt count on failure. `NotFound` is not retried.
    async fn set_role_with_retry(
        &self,
        user_id: UserId,
        role: Role,
    ) -> Result<u32, (RoleStoreError, u32)> {
        let max_attempts = self.role_sync.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.roles.set_role(user_id, role).await {
                Ok(_) => return Ok(attempt),
                Err(err @ RoleStoreError::NotFound(_)) => return Err((err, attempt)),
                Err(err) if attempt >= max_attempts => return Err((err, attempt)),
                Err(err) => {
                    let delay = self.role_sync.backoff(attempt);
                    warn!(
                        user_id = %user_id,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Role update failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

fn awaiting_role_sync(application: &RoleApplication) -> bool {
    application.status == ApplicationStatus::Approved
        && application.role_sync == RoleSyncState::Pending
}
