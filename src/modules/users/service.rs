use tracing::instrument;

use pumpfiction_core::{AppError, PaginationMeta};
use pumpfiction_models::{Role, UserId};

use crate::metrics::track_role_override;
use crate::modules::users::model::{
    PaginatedUsersResponse, UpdateProfileDto, UpdateUserRoleDto, UpdateUserRoleResponse,
    UserFilterParams, UserIdentity,
};
use crate::modules::users::store::RoleStore;

pub struct UserService;

impl UserService {
    #[instrument(skip(store))]
    pub async fn get_profile(store: &dyn RoleStore, user_id: UserId) -> Result<UserIdentity, AppError> {
        store
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("User not found")))
    }

    #[instrument(skip(store))]
    pub async fn update_profile(
        store: &dyn RoleStore,
        user_id: UserId,
        dto: UpdateProfileDto,
    ) -> Result<UserIdentity, AppError> {
        let full_name = dto.full_name.trim();
        if full_name.is_empty() {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "full_name must not be blank"
            )));
        }

        Ok(store.update_full_name(user_id, full_name).await?)
    }

    #[instrument(skip(store))]
    pub async fn list_users(
        store: &dyn RoleStore,
        params: UserFilterParams,
    ) -> Result<PaginatedUsersResponse, AppError> {
        let filter = params.filter();
        let pagination = params.pagination;

        let (data, total) = store
            .list_users(&filter, pagination.limit(), pagination.offset())
            .await?;
        let meta = PaginationMeta::for_window(total, &pagination, data.len());

        Ok(PaginatedUsersResponse { data, meta })
    }

    /// Direct administrative role change, outside the application workflow.
    ///
    /// An admin cannot take the admin role away from themselves.
    #[instrument(skip(store))]
    pub async fn override_role(
        store: &dyn RoleStore,
        actor: UserId,
        dto: UpdateUserRoleDto,
    ) -> Result<UpdateUserRoleResponse, AppError> {
        if dto.user_id == actor && dto.new_role != Role::Admin {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "Admins cannot revoke their own admin role"
            )));
        }

        let previous_role = store.get_role(dto.user_id).await?;
        let user = store.set_role(dto.user_id, dto.new_role).await?;

        tracing::info!(
            user_id = %user.id,
            actor = %actor,
            previous_role = %previous_role,
            new_role = %user.role,
            "Role overridden by admin"
        );
        track_role_override(user.role);

        Ok(UpdateUserRoleResponse {
            message: format!("User role updated to {}", user.role),
            user,
            previous_role,
        })
    }
}
