//! Operator commands behind the `pumpfiction-cli` binary.
//!
//! Each command works against the store traits so it runs the same way on
//! Postgres and on the in-memory adapters used in tests.

use fake::Fake;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use tracing::info;

use pumpfiction_auth::create_access_token;
use pumpfiction_config::JwtConfig;
use pumpfiction_core::AppError;
use pumpfiction_models::{NewUser, Role, UserIdentity};

use crate::modules::users::store::RoleStore;

/// Provisions an admin identity. Fails with 409 when the email is taken.
pub async fn create_admin(
    store: &dyn RoleStore,
    email: &str,
    full_name: &str,
) -> Result<UserIdentity, AppError> {
    let admin = store
        .create_user(NewUser {
            id: None,
            email: email.trim().to_lowercase(),
            full_name: full_name.trim().to_string(),
            role: Role::Admin,
        })
        .await?;

    info!(user_id = %admin.id, email = %admin.email, "Admin created");
    Ok(admin)
}

/// Looks up a user by email, 404 when nobody has it.
pub async fn find_user_by_email(
    store: &dyn RoleStore,
    email: &str,
) -> Result<UserIdentity, AppError> {
    store
        .find_by_email(&email.trim().to_lowercase())
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("No user with email {email}")))
}

/// Overwrites a user's role. Returns the previous role alongside the updated user.
pub async fn set_user_role(
    store: &dyn RoleStore,
    email: &str,
    role: Role,
) -> Result<(Role, UserIdentity), AppError> {
    let user = find_user_by_email(store, email).await?;
    let previous = user.role;
    let updated = store.set_role(user.id, role).await?;

    info!(
        user_id = %updated.id,
        previous_role = %previous,
        new_role = %role,
        "Role set from CLI"
    );
    Ok((previous, updated))
}

/// Inserts `count` fake `normal_user` identities.
pub async fn seed_users(store: &dyn RoleStore, count: usize) -> Result<Vec<UserIdentity>, AppError> {
    let mut seeded = Vec::with_capacity(count);
    for idx in 0..count {
        let email: String = SafeEmail().fake();
        // Prefix keeps generated addresses unique within a run.
        let user = store
            .create_user(NewUser {
                id: None,
                email: format!("seed{idx}.{email}").to_lowercase(),
                full_name: Name().fake(),
                role: Role::NormalUser,
            })
            .await?;
        seeded.push(user);
    }

    info!(count = seeded.len(), "Seeded users");
    Ok(seeded)
}

/// Signs an access token for an existing user.
pub async fn mint_token(
    store: &dyn RoleStore,
    jwt_config: &JwtConfig,
    email: &str,
) -> Result<String, AppError> {
    let user = find_user_by_email(store, email).await?;
    create_access_token(user.id.into_inner(), &user.email, jwt_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::users::memory::MemoryRoleStore;
    use axum::http::StatusCode;
    use pumpfiction_auth::verify_token;

    fn jwt_config() -> JwtConfig {
        JwtConfig {
            secret: "cli-test-secret".to_string(),
            access_token_expiry: 600,
            audience: None,
        }
    }

    #[tokio::test]
    async fn test_create_admin_normalizes_email() {
        let store = MemoryRoleStore::new();
        let admin = create_admin(&store, "  Root@Example.COM ", "Root").await.unwrap();

        assert_eq!(admin.role, Role::Admin);
        assert_eq!(admin.email, "root@example.com");
    }

    #[tokio::test]
    async fn test_create_admin_twice_conflicts() {
        let store = MemoryRoleStore::new();
        create_admin(&store, "root@example.com", "Root").await.unwrap();

        let err = create_admin(&store, "root@example.com", "Root Again")
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_set_user_role_reports_previous_role() {
        let store = MemoryRoleStore::new();
        seed_users(&store, 1).await.unwrap();
        let (users, _) = store
            .list_users(&Default::default(), 10, 0)
            .await
            .unwrap();

        let (previous, updated) = set_user_role(&store, &users[0].email, Role::Trainer)
            .await
            .unwrap();
        assert_eq!(previous, Role::NormalUser);
        assert_eq!(updated.role, Role::Trainer);
    }

    #[tokio::test]
    async fn test_set_user_role_unknown_email() {
        let store = MemoryRoleStore::new();
        let err = set_user_role(&store, "ghost@example.com", Role::Seller)
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_seed_users_are_normal_users() {
        let store = MemoryRoleStore::new();
        let seeded = seed_users(&store, 5).await.unwrap();

        assert_eq!(seeded.len(), 5);
        assert!(seeded.iter().all(|u| u.role == Role::NormalUser));
    }

    #[tokio::test]
    async fn test_mint_token_carries_user_id() {
        let store = MemoryRoleStore::new();
        let admin = create_admin(&store, "root@example.com", "Root").await.unwrap();
        let config = jwt_config();

        let token = mint_token(&store, &config, "root@example.com").await.unwrap();
        let claims = verify_token(&token, &config).unwrap();
        assert_eq!(claims.user_uuid(), Some(admin.id.into_inner()));
    }
}
