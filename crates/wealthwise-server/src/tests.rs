//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::json;
use std::time::Duration;
use tower::ServiceExt;
use wealthwise_core::test_utils::MockBackend;

fn setup_state(require_auth: bool, advisor_delay: Duration) -> Arc<AppState> {
    let db = Database::in_memory().unwrap();
    let config = ServerConfig {
        require_auth,
        allowed_origins: vec![],
    };
    Arc::new(AppState::local(db, config, Advisor::new(advisor_delay)))
}

/// App with authentication disabled, acting as the local-dev user
fn setup_test_app() -> Router {
    create_router(setup_state(false, Duration::ZERO))
}

fn setup_auth_app() -> Router {
    create_router(setup_state(true, Duration::ZERO))
}

async fn get_body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<serde_json::Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    (status, get_body_json(response).await)
}

fn profile_json() -> serde_json::Value {
    json!({
        "name": "Jordan Rivera",
        "email": "jordan@example.com",
        "age": 32,
        "monthlyIncome": 6000.0,
        "monthlySavings": 1500.0,
        "monthlyExpenses": 3500.0,
        "currentSavings": 12000.0,
        "riskTolerance": "moderate",
        "investmentHorizon": "long",
        "goals": ["retirement"]
    })
}

async fn sign_up(app: &Router, email: &str) -> String {
    let (status, json) = send(
        app,
        request(
            "POST",
            "/api/auth/signup",
            None,
            Some(json!({
                "name": "Jordan Rivera",
                "email": email,
                "password": "hunter22",
                "confirmPassword": "hunter22"
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "signup failed: {}", json);
    json["token"].as_str().unwrap().to_string()
}

// ========== Auth Tests ==========

async fn sign_in(app: &Router, email: &str, password: &str) -> StatusCode {
    let (status, _) = send(
        app,
        request(
            "POST",
            "/api/auth/signin",
            None,
            Some(json!({"email": email, "password": password})),
        ),
    )
    .await;
    status
}

#[tokio::test]
async fn test_auth_required() {
    let app = setup_auth_app();

    let (status, json) = send(&app, request("GET", "/api/data", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "Authentication required");

    let (status, _) = send(&app, request("GET", "/api/data", Some("ww_bogus"), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_signup_signin_signout_flow() {
    let app = setup_auth_app();
    let token = sign_up(&app, "jordan@example.com").await;

    let (status, me) = send(&app, request("GET", "/api/me", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["user"]["email"], "jordan@example.com");
    assert_eq!(me["user"]["name"], "Jordan Rivera");
    assert_eq!(me["isOnline"], false);

    let (status, _) = send(&app, request("POST", "/api/auth/signout", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);

    // The old token no longer works
    let (status, _) = send(&app, request("GET", "/api/me", Some(&token), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, session) = send(
        &app,
        request(
            "POST",
            "/api/auth/signin",
            None,
            Some(json!({"email": "JORDAN@example.com", "password": "hunter22"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["user"]["email"], "jordan@example.com");
    assert_eq!(session["remember"], false);
}

#[tokio::test]
async fn test_signin_wrong_password() {
    let app = setup_auth_app();
    sign_up(&app, "jordan@example.com").await;

    let (status, json) = send(
        &app,
        request(
            "POST",
            "/api/auth/signin",
            None,
            Some(json!({"email": "jordan@example.com", "password": "wrong"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_signup_validation() {
    let app = setup_auth_app();

    let (status, json) = send(
        &app,
        request(
            "POST",
            "/api/auth/signup",
            None,
            Some(json!({
                "name": "Jordan",
                "email": "jordan@example.com",
                "password": "hunter22",
                "confirmPassword": "hunter23"
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Passwords do not match");
}

#[tokio::test]
async fn test_users_see_only_their_own_data() {
    let app = setup_auth_app();
    let alice = sign_up(&app, "alice@example.com").await;
    let bob = sign_up(&app, "bob@example.com").await;

    let (status, _) = send(
        &app,
        request(
            "POST",
            "/api/goals",
            Some(&alice),
            Some(json!({"name": "House", "targetAmount": 50000.0, "deadline": "2030-01-01"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, goals) = send(&app, request("GET", "/api/goals", Some(&bob), None)).await;
    assert!(goals.as_array().unwrap().is_empty());

    let (_, goals) = send(&app, request("GET", "/api/goals", Some(&alice), None)).await;
    assert_eq!(goals.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_reset_password_cannot_take_over_account() {
    let app = setup_auth_app();
    let token = sign_up(&app, "victim@example.com").await;

    let (status, json) = send(
        &app,
        request(
            "POST",
            "/api/auth/reset-password",
            None,
            Some(json!({"email": "victim@example.com"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(json.get("temporaryPassword").is_none());

    // Nothing changed: the old password and the live session both still work
    assert_eq!(sign_in(&app, "victim@example.com", "hunter22").await, StatusCode::OK);
    let (status, _) = send(&app, request("GET", "/api/me", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_reset_password_without_auth_issues_temporary_password() {
    let app = setup_test_app();
    let token = sign_up(&app, "jordan@example.com").await;

    let (status, json) = send(
        &app,
        request(
            "POST",
            "/api/auth/reset-password",
            None,
            Some(json!({"email": "jordan@example.com"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let temporary = json["temporaryPassword"].as_str().unwrap().to_string();
    assert_eq!(temporary.len(), 8);

    assert_eq!(sign_in(&app, "jordan@example.com", "hunter22").await, StatusCode::UNAUTHORIZED);
    assert_eq!(sign_in(&app, "jordan@example.com", &temporary).await, StatusCode::OK);

    // The session from before the reset is gone, so the token falls back to local-dev
    let (_, me) = send(&app, request("GET", "/api/me", Some(&token), None)).await;
    assert_eq!(me["user"]["id"], LOCAL_DEV_USER_ID);
}

// ========== Profile and Record Tests ==========

#[tokio::test]
async fn test_profile_starts_empty() {
    let app = setup_test_app();

    let (status, json) = send(&app, request("GET", "/api/profile", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json.is_null());

    let (_, data) = send(&app, request("GET", "/api/data", None, None)).await;
    assert!(data["investments"].as_array().unwrap().is_empty());
    assert!(data["achievements"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_put_profile_unlocks_achievements() {
    let app = setup_test_app();

    let (status, json) = send(&app, request("PUT", "/api/profile", None, Some(profile_json()))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["name"], "Jordan Rivera");
    assert_eq!(json["storage"]["backend"], "local");
    assert_eq!(json["storage"]["degraded"], false);

    // 25% savings rate, 3.4 months of expenses saved
    let unlocked: Vec<&str> = json["unlocked"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["id"].as_str().unwrap())
        .collect();
    assert!(unlocked.contains(&"first_profile"));
    assert!(unlocked.contains(&"saver_20"));
    assert!(!unlocked.contains(&"emergency_fund"));

    // Saving the same profile again unlocks nothing new
    let (_, json) = send(&app, request("PUT", "/api/profile", None, Some(profile_json()))).await;
    assert!(json["unlocked"].as_array().unwrap().is_empty());

    let (_, profile) = send(&app, request("GET", "/api/profile", None, None)).await;
    assert_eq!(profile["monthlyIncome"], 6000.0);
}

#[tokio::test]
async fn test_put_profile_validation() {
    let app = setup_test_app();
    let mut profile = profile_json();
    profile["age"] = json!(0);

    let (status, json) = send(&app, request("PUT", "/api/profile", None, Some(profile))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("Age"));

    let (_, profile) = send(&app, request("GET", "/api/profile", None, None)).await;
    assert!(profile.is_null());
}

#[tokio::test]
async fn test_record_locks_are_released() {
    let state = setup_state(false, Duration::ZERO);
    let app = create_router(state.clone());

    let (status, _) = send(&app, request("PUT", "/api/profile", None, Some(profile_json()))).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, request("DELETE", "/api/goals/goal_missing", None, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    assert!(state.record_locks.lock().await.is_empty());
}

// ========== Investment Tests ==========

#[tokio::test]
async fn test_investment_crud() {
    let app = setup_test_app();

    let (status, json) = send(
        &app,
        request(
            "POST",
            "/api/investments",
            None,
            Some(json!({"name": "Index Fund", "type": "etf", "amount": 1000.0, "currentValue": 1200.0})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = json["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(json["data"]["returns"], 200.0);
    assert_eq!(json["unlocked"][0]["id"], "first_1k");

    let (status, json) = send(
        &app,
        request(
            "PATCH",
            &format!("/api/investments/{}", id),
            None,
            Some(json!({"currentValue": 900.0})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["returns"], -100.0);
    assert_eq!(json["data"]["name"], "Index Fund");

    let (_, list) = send(&app, request("GET", "/api/investments", None, None)).await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, request("DELETE", &format!("/api/investments/{}", id), None, None)).await;
    assert_eq!(status, StatusCode::OK);

    let (_, list) = send(&app, request("GET", "/api/investments", None, None)).await;
    assert!(list.as_array().unwrap().is_empty());

    // Achievements stay unlocked after the holding is gone
    let (_, achievements) = send(&app, request("GET", "/api/achievements", None, None)).await;
    let first_1k = achievements
        .as_array()
        .unwrap()
        .iter()
        .find(|a| a["id"] == "first_1k")
        .unwrap();
    assert_eq!(first_1k["unlocked"], true);
}

#[tokio::test]
async fn test_investment_not_found() {
    let app = setup_test_app();

    let (status, json) = send(
        &app,
        request("PATCH", "/api/investments/missing", None, Some(json!({"amount": 5.0}))),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].is_string());

    let (status, _) = send(&app, request("DELETE", "/api/investments/missing", None, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_investment_accepts_negative_values() {
    let app = setup_test_app();

    let (status, json) = send(
        &app,
        request(
            "POST",
            "/api/investments",
            None,
            Some(json!({"name": "Written down", "type": "stocks", "amount": -1.0, "currentValue": 0.0})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["returns"], 1.0);

    let (status, _) = send(
        &app,
        request(
            "POST",
            "/api/investments",
            None,
            Some(json!({"name": "", "type": "stocks", "amount": 1.0, "currentValue": 1.0})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ========== Goal Tests ==========

#[tokio::test]
async fn test_goal_crud() {
    let app = setup_test_app();

    let (status, json) = send(
        &app,
        request(
            "POST",
            "/api/goals",
            None,
            Some(json!({
                "name": "Emergency Fund",
                "targetAmount": 20000.0,
                "currentAmount": 5000.0,
                "deadline": "2030-06-30",
                "category": "emergency",
                "priority": "high"
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = json["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(json["unlocked"][0]["id"], "first_goal");

    let (status, json) = send(
        &app,
        request(
            "PATCH",
            &format!("/api/goals/{}", id),
            None,
            Some(json!({"currentAmount": 20000.0})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["currentAmount"], 20000.0);

    let (_, dashboard) = send(&app, request("GET", "/api/dashboard", None, None)).await;
    assert!(dashboard.is_object());

    let (status, _) = send(&app, request("DELETE", &format!("/api/goals/{}", id), None, None)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, request("DELETE", &format!("/api/goals/{}", id), None, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ========== Derived View Tests ==========

#[tokio::test]
async fn test_health_score_without_profile() {
    let app = setup_test_app();

    let (status, json) = send(&app, request("GET", "/api/health-score", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["overall"], 0);
    assert!(json["grade"].is_string());
}

#[tokio::test]
async fn test_health_score_with_profile() {
    let app = setup_test_app();
    send(&app, request("PUT", "/api/profile", None, Some(profile_json()))).await;

    let (_, json) = send(&app, request("GET", "/api/health-score", None, None)).await;
    let overall = json["overall"].as_u64().unwrap();
    assert!(overall > 0 && overall <= 100);
    for key in ["savings", "emergency", "debt", "investing", "goals"] {
        assert!(json[key].as_u64().unwrap() <= 100, "{} out of range", key);
    }
}

#[tokio::test]
async fn test_achievement_catalog() {
    let app = setup_test_app();

    let (status, json) = send(&app, request("GET", "/api/achievements", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    let catalog = json.as_array().unwrap();
    assert_eq!(catalog.len(), 6);
    assert!(catalog.iter().all(|a| a["unlocked"] == false));
}

// ========== Calculator Tests ==========

#[tokio::test]
async fn test_compound_calculator() {
    let app = setup_test_app();

    let (status, json) = send(
        &app,
        request(
            "POST",
            "/api/tools/compound",
            None,
            Some(json!({"principal": 1000.0, "monthlyContribution": 100.0, "years": 10, "annualRate": 0.0})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["futureValue"], 13000.0);
    assert_eq!(json["interestEarned"], 0.0);

    let (status, _) = send(
        &app,
        request(
            "POST",
            "/api/tools/compound",
            None,
            Some(json!({"principal": 1000.0, "monthlyContribution": 100.0, "years": 0, "annualRate": 7.0})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_calculators_reject_overflowing_inputs() {
    let app = setup_test_app();

    let (status, json) = send(
        &app,
        request(
            "POST",
            "/api/tools/compound",
            None,
            Some(json!({"principal": 1000.0, "monthlyContribution": 100.0, "years": 400000000, "annualRate": 7.0})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("years"));

    let (status, _) = send(
        &app,
        request(
            "POST",
            "/api/tools/compound",
            None,
            Some(json!({"principal": 0.0, "monthlyContribution": 0.0, "years": 100, "annualRate": 1000000.0})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, mut inputs) = send(&app, request("GET", "/api/tools/fire/defaults", None, None)).await;
    inputs["currentAge"] = json!(u32::MAX);
    let (status, _) = send(&app, request("POST", "/api/tools/fire", None, Some(inputs.clone()))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    inputs["currentAge"] = json!(40);
    inputs["expectedReturn"] = json!(0.0);
    inputs["inflationRate"] = json!(100.0);
    let (status, _) = send(&app, request("POST", "/api/tools/fire", None, Some(inputs))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_fire_defaults_follow_profile() {
    let app = setup_test_app();
    send(&app, request("PUT", "/api/profile", None, Some(profile_json()))).await;

    let (status, defaults) = send(&app, request("GET", "/api/tools/fire/defaults", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(defaults["monthlyExpenses"], 3500.0);
    assert_eq!(defaults["monthlyInvestment"], 1500.0);

    let (status, projection) = send(&app, request("POST", "/api/tools/fire", None, Some(defaults))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(projection.is_object());
}

#[tokio::test]
async fn test_budget_defaults_to_profile_income() {
    let app = setup_test_app();
    send(&app, request("PUT", "/api/profile", None, Some(profile_json()))).await;

    let (status, json) = send(&app, request("POST", "/api/tools/budget", None, Some(json!({})))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["needs"], 3000.0);
    assert_eq!(json["wants"], 1800.0);
    assert_eq!(json["savings"], 1200.0);

    let (_, json) = send(
        &app,
        request("POST", "/api/tools/budget", None, Some(json!({"monthlyIncome": 1000.0}))),
    )
    .await;
    assert_eq!(json["needs"], 500.0);
}

// ========== Advisor Tests ==========

#[tokio::test]
async fn test_advisor_conversation() {
    let app = setup_test_app();
    send(&app, request("PUT", "/api/profile", None, Some(profile_json()))).await;

    let (status, conversation) = send(&app, request("GET", "/api/advisor", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    let turns = conversation["turns"].as_array().unwrap();
    assert_eq!(turns.len(), 1);
    assert!(turns[0]["content"].as_str().unwrap().contains("Jordan"));

    let (status, reply) = send(
        &app,
        request("POST", "/api/advisor/message", None, Some(json!({"message": "How much should I save?"}))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply["role"], "assistant");

    let (_, conversation) = send(&app, request("GET", "/api/advisor", None, None)).await;
    assert_eq!(conversation["turns"].as_array().unwrap().len(), 3);

    send(&app, request("DELETE", "/api/advisor", None, None)).await;
    let (_, conversation) = send(&app, request("GET", "/api/advisor", None, None)).await;
    assert_eq!(conversation["turns"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_advisor_navigation_action() {
    let app = setup_test_app();

    let (status, outcome) = send(
        &app,
        request("POST", "/api/advisor/action", None, Some(json!({"action": "tools"}))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["kind"], "navigate");
    assert_eq!(outcome["tab"], "tools");
}

#[tokio::test]
async fn test_advisor_rejects_input_while_pending() {
    let app = create_router(setup_state(false, Duration::from_millis(300)));

    let first = {
        let app = app.clone();
        tokio::spawn(async move {
            send(
                &app,
                request("POST", "/api/advisor/message", None, Some(json!({"message": "hello"}))),
            )
            .await
        })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    let (status, _) = send(
        &app,
        request("POST", "/api/advisor/message", None, Some(json!({"message": "again"}))),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = first.await.unwrap();
    assert_eq!(status, StatusCode::OK);
}

// ========== Storage Tests ==========

#[tokio::test]
async fn test_storage_status_local() {
    let app = setup_test_app();

    let (status, json) = send(&app, request("GET", "/api/storage", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["backend"], "local");
    assert_eq!(json["degraded"], false);

    let (status, json) = send(&app, request("POST", "/api/storage/reconcile", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["pushed"], false);
}

async fn remote_app(mock: &MockBackend) -> Router {
    let db = Database::in_memory().unwrap();
    let remote_store: Arc<dyn UserDataStore> = Arc::new(RemoteStore::new(mock.config()).unwrap());
    let local_store: Arc<dyn UserDataStore> = Arc::new(LocalStore::new(db.clone()));
    let storage = Storage::connect(Some(remote_store), local_store).await;

    let remote_auth: Arc<dyn AuthProvider> = Arc::new(RemoteAuth::new(mock.config()).unwrap());
    let local_auth: Arc<dyn AuthProvider> = Arc::new(LocalAuth::new(db.clone()));
    let auth = AuthService::new(Arc::new(FallbackAuth::new(remote_auth, local_auth)), db.clone());

    let state = AppState::new(
        db,
        ServerConfig::default(),
        auth,
        storage,
        Advisor::new(Duration::ZERO),
    );
    create_router(Arc::new(state))
}

#[tokio::test]
async fn test_outage_degrades_then_reconciles() {
    let mock = MockBackend::start().await;
    let app = remote_app(&mock).await;
    let token = sign_up(&app, "jordan@example.com").await;

    let (_, me) = send(&app, request("GET", "/api/me", Some(&token), None)).await;
    assert_eq!(me["isOnline"], true);
    let user_id = me["user"]["id"].as_str().unwrap().to_string();

    let investment = json!({"name": "Bonds", "type": "bonds", "amount": 500.0, "currentValue": 510.0});
    let (status, json) = send(
        &app,
        request("POST", "/api/investments", Some(&token), Some(investment.clone())),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["storage"]["degraded"], false);

    mock.set_available(false);
    let (status, json) = send(
        &app,
        request("POST", "/api/investments", Some(&token), Some(investment)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["storage"]["degraded"], true);

    let (_, status_json) = send(&app, request("GET", "/api/storage", Some(&token), None)).await;
    assert_eq!(status_json["degraded"], true);

    // Reads keep working from the local copy
    let (_, list) = send(&app, request("GET", "/api/investments", Some(&token), None)).await;
    assert_eq!(list.as_array().unwrap().len(), 2);

    let (status, _) = send(&app, request("POST", "/api/storage/reconcile", Some(&token), None)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    mock.set_available(true);
    let (status, json) = send(&app, request("POST", "/api/storage/reconcile", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["pushed"], true);

    let row = mock.row(&user_id).unwrap();
    assert_eq!(row["investments"].as_array().unwrap().len(), 2);
}
