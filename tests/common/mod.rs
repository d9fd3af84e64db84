use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use pumpfiction::modules::role_applications::memory::MemoryRoleApplicationRepository;
use pumpfiction::modules::users::memory::MemoryRoleStore;
use pumpfiction::modules::users::store::RoleStore;
use pumpfiction::router::init_router;
use pumpfiction::state::AppState;
use pumpfiction_auth::create_access_token;
use pumpfiction_config::{CorsConfig, JwtConfig, RoleSyncConfig};
use pumpfiction_models::{NewUser, Role, UserIdentity};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_SECRET: &str = "integration-test-secret";

/// Router wired to in-memory stores, with handles kept for fault injection.
pub struct TestApp {
    pub router: Router,
    pub users: Arc<MemoryRoleStore>,
    #[allow(dead_code)]
    pub applications: Arc<MemoryRoleApplicationRepository>,
    pub jwt_config: JwtConfig,
}

impl TestApp {
    pub fn new() -> Self {
        let users = Arc::new(MemoryRoleStore::new());
        let applications = Arc::new(MemoryRoleApplicationRepository::new());
        let jwt_config = JwtConfig {
            secret: TEST_SECRET.to_string(),
            access_token_expiry: 600,
            audience: None,
        };

        let state = AppState::new(
            jwt_config.clone(),
            CorsConfig::from_list("http://localhost:5173"),
            users.clone(),
            applications.clone(),
            RoleSyncConfig::immediate(3),
        );

        Self {
            router: init_router(state),
            users,
            applications,
            jwt_config,
        }
    }

    pub async fn create_user(&self, role: Role) -> UserIdentity {
        self.users
            .create_user(NewUser {
                id: None,
                email: generate_unique_email(),
                full_name: "Test User".to_string(),
                role,
            })
            .await
            .unwrap()
    }

    pub fn token_for(&self, user: &UserIdentity) -> String {
        create_access_token(user.id.into_inner(), &user.email, &self.jwt_config).unwrap()
    }

    /// Sends a request and returns the status with the parsed JSON body
    /// (`Value::Null` when the body is empty).
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }
}

pub fn generate_unique_email() -> String {
    format!("test-{}@test.com", Uuid::new_v4())
}
