use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use pumpfiction_models::{
    ApplicationFilter, ApplicationId, NewRoleApplication, ReviewRecord, RoleApplication,
    RoleSyncState, UserId,
};

use super::repository::{RepositoryError, RoleApplicationRepository};

// "current_role" must stay quoted: bare, Postgres reads it as CURRENT_ROLE.
const APPLICATION_COLUMNS: &str = r#"id, user_id, user_email, user_name, requested_role, "current_role",
    status, reason, qualifications, admin_notes, reviewed_by, role_sync, created_at, updated_at"#;

/// [`RoleApplicationRepository`] over the `role_applications` table.
///
/// One-pending-per-user is enforced by the partial unique index
/// `uq_role_applications_one_pending`; reviews are a single conditional
/// `UPDATE ... WHERE status = 'pending'`.
#[derive(Clone, Debug)]
pub struct PgRoleApplicationRepository {
    db: PgPool,
}

impl PgRoleApplicationRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn unavailable(err: sqlx::Error) -> RepositoryError {
    tracing::error!(error = %err, "role application query failed");
    RepositoryError::Unavailable(err.to_string())
}

#[async_trait]
impl RoleApplicationRepository for PgRoleApplicationRepository {
    #[instrument(skip(self, application), fields(user_id = %application.user_id))]
    async fn insert_pending(
        &self,
        application: NewRoleApplication,
    ) -> Result<RoleApplication, RepositoryError> {
        let user_id = application.user_id;
        sqlx::query_as::<_, RoleApplication>(&format!(
            r#"INSERT INTO role_applications
                   (id, user_id, user_email, user_name, requested_role, "current_role", reason, qualifications)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               RETURNING {APPLICATION_COLUMNS}"#
        ))
        .bind(ApplicationId::new())
        .bind(user_id)
        .bind(&application.user_email)
        .bind(&application.user_name)
        .bind(application.requested_role)
        .bind(application.current_role)
        .bind(&application.reason)
        .bind(&application.qualifications)
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                return RepositoryError::DuplicatePending(user_id);
            }
            unavailable(e)
        })
    }

    #[instrument(skip(self))]
    async fn find_by_id(
        &self,
        id: ApplicationId,
    ) -> Result<Option<RoleApplication>, RepositoryError> {
        sqlx::query_as::<_, RoleApplication>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM role_applications WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(unavailable)
    }

    #[instrument(skip(self))]
    async fn find_pending_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<RoleApplication>, RepositoryError> {
        sqlx::query_as::<_, RoleApplication>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM role_applications WHERE user_id = $1 AND status = 'pending'"
        ))
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .map_err(unavailable)
    }

    #[instrument(skip(self))]
    async fn list(
        &self,
        filter: ApplicationFilter,
    ) -> Result<Vec<RoleApplication>, RepositoryError> {
        sqlx::query_as::<_, RoleApplication>(&format!(
            r#"SELECT {APPLICATION_COLUMNS} FROM role_applications
               WHERE ($1::application_status IS NULL OR status = $1)
                 AND ($2::uuid IS NULL OR user_id = $2)
                 AND ($3::role_sync_state IS NULL OR role_sync = $3)
               ORDER BY created_at DESC"#
        ))
        .bind(filter.status)
        .bind(filter.user_id)
        .bind(filter.role_sync)
        .fetch_all(&self.db)
        .await
        .map_err(unavailable)
    }

    #[instrument(skip(self, review), fields(decision = %review.decision))]
    async fn transition(
        &self,
        id: ApplicationId,
        review: &ReviewRecord,
    ) -> Result<Option<RoleApplication>, RepositoryError> {
        sqlx::query_as::<_, RoleApplication>(&format!(
            r#"UPDATE role_applications
               SET status = $2, admin_notes = $3, reviewed_by = $4, role_sync = $5, updated_at = $6
               WHERE id = $1 AND status = 'pending'
               RETURNING {APPLICATION_COLUMNS}"#
        ))
        .bind(id)
        .bind(review.status())
        .bind(&review.admin_notes)
        .bind(review.reviewed_by)
        .bind(review.role_sync())
        .bind(review.reviewed_at)
        .fetch_optional(&self.db)
        .await
        .map_err(unavailable)
    }

    #[instrument(skip(self))]
    async fn set_role_sync(
        &self,
        id: ApplicationId,
        state: RoleSyncState,
    ) -> Result<Option<RoleApplication>, RepositoryError> {
        sqlx::query_as::<_, RoleApplication>(&format!(
            "UPDATE role_applications SET role_sync = $2 WHERE id = $1 RETURNING {APPLICATION_COLUMNS}"
        ))
        .bind(id)
        .bind(state)
        .fetch_optional(&self.db)
        .await
        .map_err(unavailable)
    }
}
