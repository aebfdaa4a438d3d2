//! End-to-end API tests against the full router over in-memory storage.

use axum::http::StatusCode;
use axum_test::TestServer;
use instant8::{
    build_router,
    test_utils::{test_state, TEST_PROVISIONING_DELAY},
};
use serde_json::{json, Value};
use uuid::Uuid;

async fn test_server() -> TestServer {
    let state = test_state().await;
    let router = build_router(state).expect("build router");
    TestServer::new(router).expect("start test server")
}

async fn create_deployment(server: &TestServer, prompt: &str) -> Value {
    let response = server.post("/deployments").json(&json!({ "prompt": prompt })).await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()
}

#[tokio::test]
async fn test_health() {
    let server = test_server().await;

    let response = server.get("/health").await;
    response.assert_status_ok();
    response.assert_json(&json!({ "status": "ok", "message": "Instant8 API is running" }));
}

#[tokio::test]
async fn test_pricing_tiers() {
    let server = test_server().await;

    let response = server.get("/pricing/tiers").await;
    response.assert_status_ok();

    let tiers = response.json::<Value>();
    let tiers = tiers.as_array().unwrap();
    assert_eq!(tiers.len(), 3);

    assert_eq!(tiers[0]["name"], "Basic");
    assert_eq!(tiers[0]["price"], 44.0);
    assert_eq!(tiers[0]["max_deployments"], 5);
    assert_eq!(tiers[0]["support_level"], "email");
    assert_eq!(tiers[0]["features"].as_array().unwrap().len(), 4);

    assert_eq!(tiers[1]["name"], "Professional");
    assert_eq!(tiers[1]["price"], 74.0);
    assert_eq!(tiers[1]["max_concurrent_instances"], 5);

    assert_eq!(tiers[2]["name"], "Enterprise");
    assert_eq!(tiers[2]["price"], 94.0);
    assert_eq!(tiers[2]["max_deployments"], -1);
    assert_eq!(tiers[2]["support_level"], "phone");
}

#[tokio::test]
async fn test_openapi_document_describes_user_scope_param() {
    let server = test_server().await;

    let response = server.get("/api-docs/openapi.json").await;
    response.assert_status_ok();

    let doc = response.json::<Value>();
    let params = doc["paths"]["/deployments"]["get"]["parameters"].as_array().unwrap();
    let user_id = params.iter().find(|p| p["name"] == "user_id").unwrap();
    assert_eq!(user_id["in"], "query");
    assert_eq!(user_id["schema"]["format"], "uuid");
}

#[tokio::test]
async fn test_create_deployment_defaults() {
    let server = test_server().await;

    let created = create_deployment(&server, "Deploy a web app with a database").await;
    assert_eq!(created["status"], "configuring");
    assert_eq!(created["instance_details"]["performance"], "standard");
    assert_eq!(created["instance_details"]["region"], "us-east-1");
    assert_eq!(created["instance_details"]["auto_terminate_hours"], 24);
    assert!(created["estimated_cost"].as_f64().unwrap() >= 20.0);
    assert!(created["estimated_cost"].as_f64().unwrap() <= 120.0);

    let id = created["deployment_id"].as_str().unwrap();
    let response = server.get(&format!("/deployments/{id}")).await;
    response.assert_status_ok();

    let deployment = response.json::<Value>();
    assert_eq!(deployment["name"], "Deploy a web app with a database");
    assert_eq!(deployment["description"], "Deploy a web app with a database");
    assert_eq!(deployment["providers"], json!(["aws"]));
    let breakdown = &deployment["cost_estimate"]["breakdown"];
    let sum = breakdown["compute"].as_f64().unwrap() + breakdown["storage"].as_f64().unwrap() + breakdown["network"].as_f64().unwrap();
    let total = deployment["cost_estimate"]["total"].as_f64().unwrap();
    assert!((sum - total).abs() < 1e-9);
}

#[tokio::test]
async fn test_create_deployment_truncates_long_prompt_to_name() {
    let server = test_server().await;

    let prompt = "x".repeat(80);
    let created = create_deployment(&server, &prompt).await;

    let id = created["deployment_id"].as_str().unwrap();
    let deployment = server.get(&format!("/deployments/{id}")).await.json::<Value>();
    assert_eq!(deployment["name"].as_str().unwrap().len(), 50);
    assert_eq!(deployment["description"].as_str().unwrap().len(), 80);
}

#[tokio::test]
async fn test_create_deployment_with_overrides() {
    let server = test_server().await;

    let response = server
        .post("/deployments")
        .json(&json!({
            "prompt": "GPU training job",
            "providers": ["gcp", "azure"],
            "config": { "region": "europe-west1", "performance": "high" }
        }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let created = response.json::<Value>();
    assert_eq!(created["instance_details"]["region"], "europe-west1");
    assert_eq!(created["instance_details"]["performance"], "high");
    // Unset override fields keep their defaults
    assert_eq!(created["instance_details"]["auto_terminate_hours"], 24);

    let id = created["deployment_id"].as_str().unwrap();
    let deployment = server.get(&format!("/deployments/{id}")).await.json::<Value>();
    assert_eq!(deployment["providers"], json!(["gcp", "azure"]));
}

#[tokio::test]
async fn test_create_deployment_top_level_auto_terminate_hours() {
    let server = test_server().await;

    let response = server
        .post("/deployments")
        .json(&json!({ "prompt": "short lived batch job", "auto_terminate_hours": 5 }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let created = response.json::<Value>();
    assert_eq!(created["instance_details"]["auto_terminate_hours"], 5);

    // The nested config value wins over the top-level one
    let response = server
        .post("/deployments")
        .json(&json!({
            "prompt": "short lived batch job",
            "auto_terminate_hours": 5,
            "config": { "auto_terminate_hours": 7 }
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let created = response.json::<Value>();
    assert_eq!(created["instance_details"]["auto_terminate_hours"], 7);
}

#[tokio::test]
async fn test_create_deployment_requires_prompt() {
    let server = test_server().await;

    let response = server.post("/deployments").json(&json!({ "prompt": "   " })).await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_deployments_newest_first() {
    let server = test_server().await;

    let first = create_deployment(&server, "first").await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = create_deployment(&server, "second").await;

    let response = server.get("/deployments").await;
    response.assert_status_ok();

    let deployments = response.json::<Value>();
    let deployments = deployments.as_array().unwrap().clone();
    assert_eq!(deployments.len(), 2);
    assert_eq!(deployments[0]["id"], second["deployment_id"]);
    assert_eq!(deployments[1]["id"], first["deployment_id"]);
}

#[tokio::test]
async fn test_get_unknown_deployment_returns_404() {
    let server = test_server().await;

    let response = server.get(&format!("/deployments/{}", Uuid::new_v4())).await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_deployment_is_partial() {
    let server = test_server().await;

    let created = create_deployment(&server, "original prompt").await;
    let id = created["deployment_id"].as_str().unwrap();

    let response = server
        .put(&format!("/deployments/{id}"))
        .json(&json!({ "name": "renamed" }))
        .await;
    response.assert_status_ok();

    let updated = response.json::<Value>();
    assert_eq!(updated["name"], "renamed");
    // Untouched fields survive the update
    assert_eq!(updated["description"], "original prompt");
    assert_eq!(updated["status"], "configuring");
    assert_eq!(updated["providers"], json!(["aws"]));
}

#[tokio::test]
async fn test_delete_deployment() {
    let server = test_server().await;

    let created = create_deployment(&server, "to be deleted").await;
    let id = created["deployment_id"].as_str().unwrap();

    let response = server.delete(&format!("/deployments/{id}")).await;
    response.assert_status(StatusCode::NO_CONTENT);

    server.get(&format!("/deployments/{id}")).await.assert_status(StatusCode::NOT_FOUND);
    server.delete(&format!("/deployments/{id}")).await.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deploy_reaches_running_after_delay() {
    let server = test_server().await;

    let created = create_deployment(&server, "lifecycle test").await;
    let id = created["deployment_id"].as_str().unwrap();

    let response = server.post(&format!("/deployments/{id}/deploy")).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "deploying");

    // Still deploying immediately after the request
    let deployment = server.get(&format!("/deployments/{id}")).await.json::<Value>();
    assert_eq!(deployment["status"], "deploying");

    tokio::time::sleep(TEST_PROVISIONING_DELAY * 3).await;
    let deployment = server.get(&format!("/deployments/{id}")).await.json::<Value>();
    assert_eq!(deployment["status"], "running");
}

#[tokio::test]
async fn test_stop_wins_over_pending_deploy() {
    let server = test_server().await;

    let created = create_deployment(&server, "stop race").await;
    let id = created["deployment_id"].as_str().unwrap();

    server.post(&format!("/deployments/{id}/deploy")).await.assert_status_ok();

    let response = server.post(&format!("/deployments/{id}/stop")).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "stopped");

    // The provisioning timer must not resurrect the deployment
    tokio::time::sleep(TEST_PROVISIONING_DELAY * 3).await;
    let deployment = server.get(&format!("/deployments/{id}")).await.json::<Value>();
    assert_eq!(deployment["status"], "stopped");
}

#[tokio::test]
async fn test_deploy_unknown_deployment_returns_404() {
    let server = test_server().await;

    server
        .post(&format!("/deployments/{}/deploy", Uuid::new_v4()))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .post(&format!("/deployments/{}/stop", Uuid::new_v4()))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_dashboard_stats_empty() {
    let server = test_server().await;

    let response = server.get("/dashboard/stats").await;
    response.assert_status_ok();

    let stats = response.json::<Value>();
    assert_eq!(stats["total_deployments"], 0);
    assert_eq!(stats["active_deployments"], 0);
    assert_eq!(stats["total_cost"], 0.0);
    assert_eq!(stats["total_providers"], 0);
    assert_eq!(stats["recent_deployments"], json!([]));
}

#[tokio::test]
async fn test_dashboard_stats_aggregates() {
    let server = test_server().await;

    let first = create_deployment(&server, "alpha").await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = create_deployment(&server, "beta").await;

    let id = second["deployment_id"].as_str().unwrap();
    server.post(&format!("/deployments/{id}/deploy")).await.assert_status_ok();
    tokio::time::sleep(TEST_PROVISIONING_DELAY * 3).await;

    let stats = server.get("/dashboard/stats").await.json::<Value>();
    assert_eq!(stats["total_deployments"], 2);
    assert_eq!(stats["active_deployments"], 1);
    // Both deployments target aws only
    assert_eq!(stats["total_providers"], 1);

    let expected_cost = first["estimated_cost"].as_f64().unwrap() + second["estimated_cost"].as_f64().unwrap();
    assert!((stats["total_cost"].as_f64().unwrap() - expected_cost).abs() < 1e-9);

    let recent = stats["recent_deployments"].as_array().unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0]["name"], "beta");
    assert_eq!(recent[0]["status"], "running");
    assert_eq!(recent[0]["provider"], "aws");
}

#[tokio::test]
async fn test_cloud_providers_seeded() {
    let server = test_server().await;

    let response = server.get("/cloud-providers").await;
    response.assert_status_ok();

    let providers = response.json::<Value>();
    let providers = providers.as_array().unwrap().clone();
    assert_eq!(providers.len(), 3);
    assert_eq!(providers[0]["name"], "aws");
    assert_eq!(providers[0]["enabled"], true);
    assert_eq!(providers[0]["regions"], json!(["us-east-1", "us-west-1", "eu-west-1"]));
    assert_eq!(providers[1]["name"], "azure");
    assert_eq!(providers[2]["name"], "gcp");
    assert_eq!(providers[2]["regions"], json!(["us-central1", "us-east1", "europe-west1"]));
}

#[tokio::test]
async fn test_update_cloud_provider_credentials() {
    let server = test_server().await;

    let providers = server.get("/cloud-providers").await.json::<Value>();
    let id = providers[0]["id"].as_str().unwrap();

    let response = server
        .put(&format!("/cloud-providers/{id}"))
        .json(&json!({
            "credentials": { "access_key_id": "AKIA123", "secret_access_key": "shh" },
            "enabled": false
        }))
        .await;
    response.assert_status_ok();

    let updated = response.json::<Value>();
    assert_eq!(updated["credentials"]["access_key_id"], "AKIA123");
    assert_eq!(updated["enabled"], false);

    server
        .put(&format!("/cloud-providers/{}", Uuid::new_v4()))
        .json(&json!({ "credentials": {} }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_user_settings_defaults_and_partial_update() {
    let server = test_server().await;

    let settings = server.get("/user-settings").await.json::<Value>();
    assert_eq!(settings["theme"], "light");
    assert_eq!(settings["notifications_enabled"], true);
    assert_eq!(settings["email_notifications"], true);
    assert_eq!(settings["budget_alert_threshold"], 100.0);
    assert_eq!(settings["default_provider"], "aws");
    assert_eq!(settings["default_region"], "us-east-1");

    let response = server
        .put("/user-settings")
        .json(&json!({ "theme": "dark", "budget_alert_threshold": 250.0 }))
        .await;
    response.assert_status_ok();

    let updated = response.json::<Value>();
    assert_eq!(updated["theme"], "dark");
    assert_eq!(updated["budget_alert_threshold"], 250.0);
    // Fields absent from the patch keep their values
    assert_eq!(updated["default_provider"], "aws");
}

#[tokio::test]
async fn test_user_settings_unknown_user_returns_404() {
    let server = test_server().await;

    server
        .get(&format!("/user-settings?user_id={}", Uuid::new_v4()))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_register_then_access_profile() {
    let server = test_server().await;

    let response = server
        .post("/auth/register")
        .json(&json!({
            "email": "alice@example.com",
            "username": "alice",
            "password": "password123"
        }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let auth = response.json::<Value>();
    assert_eq!(auth["token_type"], "bearer");
    assert_eq!(auth["user"]["email"], "alice@example.com");
    assert!(auth["user"].get("password_hash").is_none());

    let token = auth["access_token"].as_str().unwrap();
    let profile = server
        .get("/user/profile")
        .authorization_bearer(token)
        .await;
    profile.assert_status_ok();
    assert_eq!(profile.json::<Value>()["username"], "alice");

    // Registration also seeds the account's defaults
    let user_id = auth["user"]["id"].as_str().unwrap();
    let providers = server.get(&format!("/cloud-providers?user_id={user_id}")).await.json::<Value>();
    assert_eq!(providers.as_array().unwrap().len(), 3);
    server
        .get(&format!("/user-settings?user_id={user_id}"))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_profile_requires_token() {
    let server = test_server().await;

    server.get("/user/profile").await.assert_status(StatusCode::UNAUTHORIZED);
    server
        .get("/user/profile")
        .authorization_bearer("garbage")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_rejects_short_password() {
    let server = test_server().await;

    let response = server
        .post("/auth/register")
        .json(&json!({
            "email": "bob@example.com",
            "username": "bob",
            "password": "short"
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_duplicate_email_and_username_conflict() {
    let server = test_server().await;

    let register = |email: &str, username: &str| {
        json!({ "email": email, "username": username, "password": "password123" })
    };

    server
        .post("/auth/register")
        .json(&register("carol@example.com", "carol"))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server.post("/auth/register").json(&register("carol@example.com", "carol2")).await;
    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(
        response.json::<Value>()["error"],
        "An account with this email address already exists"
    );

    let response = server.post("/auth/register").json(&register("carol2@example.com", "carol")).await;
    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(response.json::<Value>()["error"], "This username is already taken");
}

#[tokio::test]
async fn test_login_does_not_reveal_which_accounts_exist() {
    let server = test_server().await;

    server
        .post("/auth/register")
        .json(&json!({ "email": "dave@example.com", "username": "dave", "password": "password123" }))
        .await
        .assert_status(StatusCode::CREATED);

    let wrong_password = server
        .post("/auth/login")
        .json(&json!({ "email": "dave@example.com", "password": "wrong-password" }))
        .await;
    wrong_password.assert_status(StatusCode::UNAUTHORIZED);

    let unknown_email = server
        .post("/auth/login")
        .json(&json!({ "email": "nobody@example.com", "password": "password123" }))
        .await;
    unknown_email.assert_status(StatusCode::UNAUTHORIZED);

    // Identical bodies for both failure modes
    assert_eq!(wrong_password.json::<Value>(), unknown_email.json::<Value>());

    let ok = server
        .post("/auth/login")
        .json(&json!({ "email": "dave@example.com", "password": "password123" }))
        .await;
    ok.assert_status_ok();
    assert_eq!(ok.json::<Value>()["user"]["username"], "dave");
}
