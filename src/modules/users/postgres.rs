use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use pumpfiction_models::{NewUser, Role, UserFilter, UserId, UserIdentity};

use super::store::{RoleStore, RoleStoreError};

const USER_COLUMNS: &str = "id, email, full_name, role, created_at, updated_at";

/// [`RoleStore`] over the local `users` mirror table.
#[derive(Clone, Debug)]
pub struct PgRoleStore {
    db: PgPool,
}

impl PgRoleStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn unavailable(err: sqlx::Error) -> RoleStoreError {
    tracing::error!(error = %err, "role store query failed");
    RoleStoreError::Unavailable(err.to_string())
}

#[async_trait]
impl RoleStore for PgRoleStore {
    #[instrument(skip(self))]
    async fn find_user(&self, user_id: UserId) -> Result<Option<UserIdentity>, RoleStoreError> {
        sqlx::query_as::<_, UserIdentity>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .map_err(unavailable)
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<UserIdentity>, RoleStoreError> {
        sqlx::query_as::<_, UserIdentity>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE lower(email) = lower($1)"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .map_err(unavailable)
    }

    #[instrument(skip(self))]
    async fn set_role(&self, user_id: UserId, role: Role) -> Result<UserIdentity, RoleStoreError> {
        sqlx::query_as::<_, UserIdentity>(&format!(
            "UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(user_id)
        .bind(role)
        .fetch_optional(&self.db)
        .await
        .map_err(unavailable)?
        .ok_or(RoleStoreError::NotFound(user_id))
    }

    #[instrument(skip(self))]
    async fn update_full_name(
        &self,
        user_id: UserId,
        full_name: &str,
    ) -> Result<UserIdentity, RoleStoreError> {
        sqlx::query_as::<_, UserIdentity>(&format!(
            "UPDATE users SET full_name = $2, updated_at = NOW() WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(user_id)
        .bind(full_name)
        .fetch_optional(&self.db)
        .await
        .map_err(unavailable)?
        .ok_or(RoleStoreError::NotFound(user_id))
    }

    #[instrument(skip(self, new_user), fields(email = %new_user.email))]
    async fn create_user(&self, new_user: NewUser) -> Result<UserIdentity, RoleStoreError> {
        sqlx::query_as::<_, UserIdentity>(&format!(
            r#"INSERT INTO users (id, email, full_name, role)
               VALUES (COALESCE($1, gen_random_uuid()), $2, $3, $4)
               RETURNING {USER_COLUMNS}"#
        ))
        .bind(new_user.id)
        .bind(&new_user.email)
        .bind(&new_user.full_name)
        .bind(new_user.role)
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                return RoleStoreError::Conflict(new_user.email.clone());
            }
            unavailable(e)
        })
    }

    #[instrument(skip(self))]
    async fn list_users(
        &self,
        filter: &UserFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<UserIdentity>, i64), RoleStoreError> {
        let where_clause = r#"WHERE ($1::user_role IS NULL OR role = $1)
              AND ($2::text IS NULL OR strpos(lower(email), lower($2)) > 0)"#;

        let total = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM users {where_clause}"))
            .bind(filter.role)
            .bind(filter.email_contains.as_deref())
            .fetch_one(&self.db)
            .await
            .map_err(unavailable)?;

        let users = sqlx::query_as::<_, UserIdentity>(&format!(
            "SELECT {USER_COLUMNS} FROM users {where_clause} ORDER BY created_at DESC LIMIT $3 OFFSET $4"
        ))
        .bind(filter.role)
        .bind(filter.email_contains.as_deref())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await
        .map_err(unavailable)?;

        Ok((users, total))
    }
}
