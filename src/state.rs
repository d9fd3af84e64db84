use std::sync::Arc;

use pumpfiction_config::{CorsConfig, JwtConfig, RoleSyncConfig, ServerConfig, StorageBackend};
use pumpfiction_db::{init_db_pool, run_migrations};

use crate::modules::role_applications::memory::MemoryRoleApplicationRepository;
use crate::modules::role_applications::postgres::PgRoleApplicationRepository;
use crate::modules::role_applications::repository::RoleApplicationRepository;
use crate::modules::role_applications::service::RoleApplicationService;
use crate::modules::users::memory::MemoryRoleStore;
use crate::modules::users::postgres::PgRoleStore;
use crate::modules::users::store::RoleStore;

#[derive(Clone)]
pub struct AppState {
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
    pub users: Arc<dyn RoleStore>,
    pub role_applications: RoleApplicationService,
}

impl AppState {
    pub fn new(
        jwt_config: JwtConfig,
        cors_config: CorsConfig,
        users: Arc<dyn RoleStore>,
        applications: Arc<dyn RoleApplicationRepository>,
        role_sync: RoleSyncConfig,
    ) -> Self {
        Self {
            jwt_config,
            cors_config,
            role_applications: RoleApplicationService::new(applications, users.clone(), role_sync),
            users,
        }
    }
}

/// Builds the stores for the configured backend.
pub async fn init_stores(
    storage: StorageBackend,
) -> anyhow::Result<(Arc<dyn RoleStore>, Arc<dyn RoleApplicationRepository>)> {
    match storage {
        StorageBackend::Postgres => {
            let db = init_db_pool().await?;
            run_migrations(&db).await?;
            Ok((
                Arc::new(PgRoleStore::new(db.clone())),
                Arc::new(PgRoleApplicationRepository::new(db)),
            ))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            Ok((
                Arc::new(MemoryRoleStore::new()),
                Arc::new(MemoryRoleApplicationRepository::new()),
            ))
        }
    }
}

pub async fn init_app_state(server: &ServerConfig) -> anyhow::Result<AppState> {
    let (users, applications) = init_stores(server.storage).await?;
    Ok(AppState::new(
        JwtConfig::from_env(),
        CorsConfig::from_env(),
        users,
        applications,
        RoleSyncConfig::from_env(),
    ))
}
