mod common;

use axum::http::StatusCode;
use common::TestApp;
use pumpfiction::modules::users::store::RoleStore;
use pumpfiction_models::Role;
use serde_json::json;
use uuid::Uuid;

async fn apply(app: &TestApp, token: &str, role: &str) -> (StatusCode, serde_json::Value) {
    app.request(
        "POST",
        "/api/auth/apply-role",
        Some(token),
        Some(json!({
            "requested_role": role,
            "reason": "I have coached for five years",
            "qualifications": "NASM CPT"
        })),
    )
    .await
}

async fn review(
    app: &TestApp,
    token: &str,
    application_id: &str,
    decision: &str,
) -> (StatusCode, serde_json::Value) {
    app.request(
        "POST",
        "/api/auth/admin/applications/review",
        Some(token),
        Some(json!({
            "application_id": application_id,
            "decision": decision,
            "admin_notes": "Looks good"
        })),
    )
    .await
}

#[tokio::test]
async fn test_apply_requires_token() {
    let app = TestApp::new();
    let (status, _) = app
        .request(
            "POST",
            "/api/auth/apply-role",
            None,
            Some(json!({"requested_role": "trainer", "reason": "x"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_for_unknown_user_is_rejected() {
    let app = TestApp::new();
    let token = pumpfiction_auth::create_access_token(
        Uuid::new_v4(),
        "ghost@test.com",
        &app.jwt_config,
    )
    .unwrap();

    let (status, body) = app.request("GET", "/api/auth/my-applications", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "User not found");
}

#[tokio::test]
async fn test_apply_creates_pending_application() {
    let app = TestApp::new();
    let user = app.create_user(Role::NormalUser).await;
    let token = app.token_for(&user);

    let (status, body) = apply(&app, &token, "trainer").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["requested_role"], "trainer");
    assert_eq!(body["current_role"], "normal_user");
    assert_eq!(body["user_email"], user.email.as_str());
    assert_eq!(body["role_sync"], "not_required");
    assert!(body["admin_notes"].is_null());
}

#[tokio::test]
async fn test_apply_rejects_admin_role() {
    let app = TestApp::new();
    let user = app.create_user(Role::NormalUser).await;
    let token = app.token_for(&user);

    let (status, _) = apply(&app, &token, "admin").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = apply(&app, &token, "normal_user").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_apply_rejects_unknown_role() {
    let app = TestApp::new();
    let user = app.create_user(Role::NormalUser).await;
    let token = app.token_for(&user);

    let (status, body) = apply(&app, &token, "wizard").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("wizard"));
}

#[tokio::test]
async fn test_apply_rejects_role_already_held() {
    let app = TestApp::new();
    let user = app.create_user(Role::Trainer).await;
    let token = app.token_for(&user);

    let (status, _) = apply(&app, &token, "trainer").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = apply(&app, &token, "seller").await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_apply_requires_reason() {
    let app = TestApp::new();
    let user = app.create_user(Role::NormalUser).await;
    let token = app.token_for(&user);

    let (status, body) = app
        .request(
            "POST",
            "/api/auth/apply-role",
            Some(&token),
            Some(json!({"requested_role": "seller"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "reason is required");

    let (status, _) = app
        .request(
            "POST",
            "/api/auth/apply-role",
            Some(&token),
            Some(json!({"requested_role": "seller", "reason": "   "})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_apply_rejects_oversized_reason() {
    let app = TestApp::new();
    let user = app.create_user(Role::NormalUser).await;
    let token = app.token_for(&user);

    let (status, _) = app
        .request(
            "POST",
            "/api/auth/apply-role",
            Some(&token),
            Some(json!({"requested_role": "seller", "reason": "x".repeat(2001)})),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_second_pending_application_conflicts() {
    let app = TestApp::new();
    let user = app.create_user(Role::NormalUser).await;
    let token = app.token_for(&user);

    let (status, _) = apply(&app, &token, "trainer").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = apply(&app, &token, "seller").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "You already have a pending role application");
}

#[tokio::test]
async fn test_my_applications_only_lists_own() {
    let app = TestApp::new();
    let alice = app.create_user(Role::NormalUser).await;
    let bob = app.create_user(Role::NormalUser).await;
    let alice_token = app.token_for(&alice);
    let bob_token = app.token_for(&bob);

    apply(&app, &alice_token, "trainer").await;
    apply(&app, &bob_token, "seller").await;

    let (status, body) = app
        .request("GET", "/api/auth/my-applications", Some(&alice_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let applications = body.as_array().unwrap();
    assert_eq!(applications.len(), 1);
    assert_eq!(applications[0]["user_id"], alice.id.to_string());
}

#[tokio::test]
async fn test_admin_routes_forbidden_for_normal_user() {
    let app = TestApp::new();
    let user = app.create_user(Role::NormalUser).await;
    let token = app.token_for(&user);

    for uri in [
        "/api/auth/admin/applications",
        "/api/auth/admin/applications/pending",
        "/api/auth/admin/users",
    ] {
        let (status, _) = app.request("GET", uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
    }

    let (status, _) = review(&app, &token, &Uuid::new_v4().to_string(), "approved").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_routes_require_token() {
    let app = TestApp::new();
    let (status, _) = app
        .request("GET", "/api/auth/admin/applications/pending", None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_full_approval_flow() {
    let app = TestApp::new();
    let admin = app.create_user(Role::Admin).await;
    let user = app.create_user(Role::NormalUser).await;
    let admin_token = app.token_for(&admin);
    let user_token = app.token_for(&user);

    let (_, application) = apply(&app, &user_token, "trainer").await;
    let application_id = application["id"].as_str().unwrap().to_string();

    let (status, pending) = app
        .request(
            "GET",
            "/api/auth/admin/applications/pending",
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pending.as_array().unwrap().len(), 1);

    let (status, body) = review(&app, &admin_token, &application_id, "approved").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Application approved. User role updated to trainer");
    assert_eq!(body["new_role"], "trainer");
    assert_eq!(body["role_updated"], true);
    assert_eq!(body["application"]["status"], "approved");
    assert_eq!(body["application"]["role_sync"], "synced");
    assert_eq!(body["application"]["reviewed_by"], admin.id.to_string());
    assert_eq!(body["application"]["admin_notes"], "Looks good");
    // snapshot taken at submission time
    assert_eq!(body["application"]["current_role"], "normal_user");

    let (_, me) = app.request("GET", "/api/auth/me", Some(&user_token), None).await;
    assert_eq!(me["role"], "trainer");

    let (_, pending) = app
        .request(
            "GET",
            "/api/auth/admin/applications/pending",
            Some(&admin_token),
            None,
        )
        .await;
    assert!(pending.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_rejection_leaves_role_unchanged() {
    let app = TestApp::new();
    let admin = app.create_user(Role::Admin).await;
    let user = app.create_user(Role::NormalUser).await;
    let admin_token = app.token_for(&admin);
    let user_token = app.token_for(&user);

    let (_, application) = apply(&app, &user_token, "seller").await;
    let application_id = application["id"].as_str().unwrap().to_string();

    let (status, body) = review(&app, &admin_token, &application_id, "rejected").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Application rejected");
    assert!(body["new_role"].is_null());
    assert_eq!(body["role_updated"], false);
    assert_eq!(body["application"]["role_sync"], "not_required");

    assert_eq!(app.users.get_role(user.id).await.unwrap(), Role::NormalUser);
    assert_eq!(app.users.set_role_calls(), 0);

    // a rejected application no longer blocks a new one
    let (status, _) = apply(&app, &user_token, "seller").await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_second_review_conflicts() {
    let app = TestApp::new();
    let admin = app.create_user(Role::Admin).await;
    let user = app.create_user(Role::NormalUser).await;
    let admin_token = app.token_for(&admin);
    let user_token = app.token_for(&user);

    let (_, application) = apply(&app, &user_token, "trainer").await;
    let application_id = application["id"].as_str().unwrap().to_string();

    review(&app, &admin_token, &application_id, "rejected").await;
    let (status, body) = review(&app, &admin_token, &application_id, "approved").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("already been reviewed"));
    assert_eq!(app.users.get_role(user.id).await.unwrap(), Role::NormalUser);
}

#[tokio::test]
async fn test_review_unknown_application() {
    let app = TestApp::new();
    let admin = app.create_user(Role::Admin).await;
    let token = app.token_for(&admin);

    let (status, _) = review(&app, &token, &Uuid::new_v4().to_string(), "approved").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_review_with_pending_decision_is_invalid() {
    let app = TestApp::new();
    let admin = app.create_user(Role::Admin).await;
    let user = app.create_user(Role::NormalUser).await;
    let admin_token = app.token_for(&admin);

    let (_, application) = apply(&app, &app.token_for(&user), "trainer").await;
    let application_id = application["id"].as_str().unwrap().to_string();

    let (status, _) = review(&app, &admin_token, &application_id, "pending").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = review(&app, &admin_token, &application_id, "maybe").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_failed_role_write_returns_bad_gateway_and_can_be_retried() {
    let app = TestApp::new();
    let admin = app.create_user(Role::Admin).await;
    let user = app.create_user(Role::NormalUser).await;
    let admin_token = app.token_for(&admin);

    let (_, application) = apply(&app, &app.token_for(&user), "seller").await;
    let application_id = application["id"].as_str().unwrap().to_string();

    app.users.fail_next_set_role(3);
    let (status, body) = review(&app, &admin_token, &application_id, "approved").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().contains("role update is pending"));
    assert_eq!(app.users.get_role(user.id).await.unwrap(), Role::NormalUser);

    let (_, awaiting) = app
        .request(
            "GET",
            "/api/auth/admin/applications?role_sync=pending",
            Some(&admin_token),
            None,
        )
        .await;
    let awaiting = awaiting.as_array().unwrap();
    assert_eq!(awaiting.len(), 1);
    assert_eq!(awaiting[0]["status"], "approved");

    let (status, body) = app
        .request(
            "POST",
            &format!("/api/auth/admin/applications/{application_id}/sync-role"),
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role_sync"], "synced");
    assert_eq!(app.users.get_role(user.id).await.unwrap(), Role::Seller);

    let (status, _) = app
        .request(
            "POST",
            &format!("/api/auth/admin/applications/{application_id}/sync-role"),
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_transient_role_write_failure_is_retried() {
    let app = TestApp::new();
    let admin = app.create_user(Role::Admin).await;
    let user = app.create_user(Role::NormalUser).await;

    let (_, application) = apply(&app, &app.token_for(&user), "trainer").await;
    let application_id = application["id"].as_str().unwrap().to_string();

    app.users.fail_next_set_role(2);
    let (status, body) = review(&app, &app.token_for(&admin), &application_id, "approved").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role_updated"], true);
    assert_eq!(app.users.set_role_calls(), 3);
}

#[tokio::test]
async fn test_list_applications_filters_by_status() {
    let app = TestApp::new();
    let admin = app.create_user(Role::Admin).await;
    let admin_token = app.token_for(&admin);

    let approved_user = app.create_user(Role::NormalUser).await;
    let pending_user = app.create_user(Role::NormalUser).await;

    let (_, application) = apply(&app, &app.token_for(&approved_user), "trainer").await;
    review(
        &app,
        &admin_token,
        application["id"].as_str().unwrap(),
        "approved",
    )
    .await;
    apply(&app, &app.token_for(&pending_user), "seller").await;

    let (status, all) = app
        .request("GET", "/api/auth/admin/applications", Some(&admin_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 2);
    // newest first
    assert_eq!(all[0]["user_id"], pending_user.id.to_string());

    let (_, approved) = app
        .request(
            "GET",
            "/api/auth/admin/applications?status=approved",
            Some(&admin_token),
            None,
        )
        .await;
    let approved = approved.as_array().unwrap();
    assert_eq!(approved.len(), 1);
    assert_eq!(approved[0]["user_id"], approved_user.id.to_string());

    let (_, by_user) = app
        .request(
            "GET",
            &format!("/api/auth/admin/applications?user_id={}", pending_user.id),
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(by_user.as_array().unwrap().len(), 1);

    let (_, blank) = app
        .request(
            "GET",
            "/api/auth/admin/applications?status=",
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(blank.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_store_outage_is_service_unavailable() {
    let app = TestApp::new();
    let admin = app.create_user(Role::Admin).await;
    let token = app.token_for(&admin);

    app.applications.set_unavailable(true);
    let (status, _) = app
        .request(
            "GET",
            "/api/auth/admin/applications/pending",
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
