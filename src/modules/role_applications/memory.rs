use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use pumpfiction_models::{
    ApplicationFilter, ApplicationId, ApplicationStatus, NewRoleApplication, ReviewRecord,
    RoleApplication, RoleSyncState, UserId,
};

use super::repository::{RepositoryError, RoleApplicationRepository};

/// Process-local [`RoleApplicationRepository`].
///
/// The one-pending-per-user check and the insert happen under a single lock,
/// as do the status check and transition. The lock is never held across an
/// await.
#[derive(Debug, Default)]
pub struct MemoryRoleApplicationRepository {
    applications: Mutex<Vec<RoleApplication>>,
    unavailable: AtomicBool,
}

impl MemoryRoleApplicationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn applications(&self) -> Result<MutexGuard<'_, Vec<RoleApplication>>, RepositoryError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable(
                "application store is offline".into(),
            ));
        }
        self.applications
            .lock()
            .map_err(|_| RepositoryError::Unavailable("application store lock poisoned".into()))
    }
}

#[async_trait]
impl RoleApplicationRepository for MemoryRoleApplicationRepository {
    async fn insert_pending(
        &self,
        application: NewRoleApplication,
    ) -> Result<RoleApplication, RepositoryError> {
        let mut applications = self.applications()?;
        if applications
            .iter()
            .any(|a| a.user_id == application.user_id && a.status == ApplicationStatus::Pending)
        {
            return Err(RepositoryError::DuplicatePending(application.user_id));
        }

        let created = application.into_pending(ApplicationId::new(), Utc::now());
        applications.push(created.clone());
        Ok(created)
    }

    async fn find_by_id(
        &self,
        id: ApplicationId,
    ) -> Result<Option<RoleApplication>, RepositoryError> {
        Ok(self.applications()?.iter().find(|a| a.id == id).cloned())
    }

    async fn find_pending_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<RoleApplication>, RepositoryError> {
        Ok(self
            .applications()?
            .iter()
            .find(|a| a.user_id == user_id && a.status == ApplicationStatus::Pending)
            .cloned())
    }

    async fn list(
        &self,
        filter: ApplicationFilter,
    ) -> Result<Vec<RoleApplication>, RepositoryError> {
        let mut matching: Vec<RoleApplication> = self
            .applications()?
            .iter()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        // Insertion order is oldest first; reverse before the stable sort so
        // equal timestamps still come out newest first.
        matching.reverse();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching)
    }

    async fn transition(
        &self,
        id: ApplicationId,
        review: &ReviewRecord,
    ) -> Result<Option<RoleApplication>, RepositoryError> {
        let mut applications = self.applications()?;
        let Some(application) = applications
            .iter_mut()
            .find(|a| a.id == id && a.status == ApplicationStatus::Pending)
        else {
            return Ok(None);
        };

        review.apply_to(application);
        Ok(Some(application.clone()))
    }

    async fn set_role_sync(
        &self,
        id: ApplicationId,
        state: RoleSyncState,
    ) -> Result<Option<RoleApplication>, RepositoryError> {
        let mut applications = self.applications()?;
        Ok(applications.iter_mut().find(|a| a.id == id).map(|a| {
            a.role_sync = state;
            a.clone()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pumpfiction_models::{ReviewDecision, Role};

    fn new_application(user_id: UserId, role: Role) -> NewRoleApplication {
        NewRoleApplication {
            user_id,
            user_email: "u@example.com".into(),
            user_name: "U".into(),
            requested_role: role,
            current_role: Role::NormalUser,
            reason: "coaching".into(),
            qualifications: None,
        }
    }

    fn review(decision: ReviewDecision) -> ReviewRecord {
        ReviewRecord {
            decision,
            admin_notes: None,
            reviewed_by: UserId::new(),
            reviewed_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_second_pending_for_user_is_rejected() {
        let repo = MemoryRoleApplicationRepository::new();
        let user = UserId::new();
        repo.insert_pending(new_application(user, Role::Trainer))
            .await
            .unwrap();

        let err = repo
            .insert_pending(new_application(user, Role::Seller))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::DuplicatePending(id) if id == user));

        // Another user is unaffected
        repo.insert_pending(new_application(UserId::new(), Role::Seller))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_transition_is_compare_and_swap() {
        let repo = MemoryRoleApplicationRepository::new();
        let app = repo
            .insert_pending(new_application(UserId::new(), Role::Trainer))
            .await
            .unwrap();

        let first = repo
            .transition(app.id, &review(ReviewDecision::Approved))
            .await
            .unwrap();
        assert_eq!(first.unwrap().status, ApplicationStatus::Approved);

        let second = repo
            .transition(app.id, &review(ReviewDecision::Rejected))
            .await
            .unwrap();
        assert!(second.is_none());

        let stored = repo.find_by_id(app.id).await.unwrap().unwrap();
        assert_eq!(stored.status, ApplicationStatus::Approved);
    }

    #[tokio::test]
    async fn test_new_pending_allowed_after_review() {
        let repo = MemoryRoleApplicationRepository::new();
        let user = UserId::new();
        let app = repo
            .insert_pending(new_application(user, Role::Trainer))
            .await
            .unwrap();
        repo.transition(app.id, &review(ReviewDecision::Rejected))
            .await
            .unwrap();

        assert!(repo.find_pending_for_user(user).await.unwrap().is_none());
        repo.insert_pending(new_application(user, Role::Seller))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let repo = MemoryRoleApplicationRepository::new();
        let mut ids = Vec::new();
        for _ in 0..3 {
            let app = repo
                .insert_pending(new_application(UserId::new(), Role::Seller))
                .await
                .unwrap();
            ids.push(app.id);
        }

        let listed: Vec<ApplicationId> = repo
            .list(ApplicationFilter::default())
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.id)
            .collect();
        ids.reverse();
        assert_eq!(listed, ids);
    }

    #[tokio::test]
    async fn test_unavailable() {
        let repo = MemoryRoleApplicationRepository::new();
        repo.set_unavailable(true);
        let err = repo.list(ApplicationFilter::pending()).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Unavailable(_)));
    }
}
