//! Test utilities for wealthwise-core
//!
//! Provides a mock hosted backend (the `user_data` table plus auth endpoints)
//! and sample records for unit and integration tests.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Query, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::oneshot;

use crate::models::{
    Goal, GoalCategory, GoalPriority, Investment, InvestmentHorizon, InvestmentType, Profile,
    RiskTolerance,
};
use crate::store::RemoteConfig;

/// Project key the mock expects in the `apikey` header
pub const MOCK_KEY: &str = "mock-anon-key";

#[derive(Debug, Clone)]
struct MockAccount {
    id: String,
    email: String,
    name: String,
    password: String,
}

impl MockAccount {
    fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "email": self.email,
            "user_metadata": { "name": self.name },
        })
    }
}

#[derive(Default)]
struct MockState {
    available: AtomicBool,
    next_id: AtomicU64,
    rows: Mutex<HashMap<String, Value>>,
    accounts: Mutex<HashMap<String, MockAccount>>,
    tokens: Mutex<HashMap<String, String>>,
}

impl MockState {
    fn issue_token(&self, user_id: &str) -> String {
        let token = format!("mock-token-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        self.tokens
            .lock()
            .unwrap()
            .insert(token.clone(), user_id.to_string());
        token
    }

    fn account_for_token(&self, headers: &HeaderMap) -> Option<MockAccount> {
        let token = headers
            .get("authorization")?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")?;
        let user_id = self.tokens.lock().unwrap().get(token).cloned()?;
        self.accounts
            .lock()
            .unwrap()
            .values()
            .find(|a| a.id == user_id)
            .cloned()
    }
}

/// Mock hosted backend for testing
pub struct MockBackend {
    addr: SocketAddr,
    state: Arc<MockState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockBackend {
    /// Start the mock backend on an available port
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        state.available.store(true, Ordering::SeqCst);

        let app = Router::new()
            .route("/rest/v1/", get(handle_root))
            .route(
                "/rest/v1/user_data",
                get(handle_select).post(handle_upsert),
            )
            .route("/auth/v1/signup", post(handle_signup))
            .route("/auth/v1/token", post(handle_token))
            .route("/auth/v1/logout", post(handle_logout))
            .route("/auth/v1/recover", post(handle_recover))
            .route("/auth/v1/user", get(handle_user))
            .layer(middleware::from_fn_with_state(state.clone(), gate))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock backend
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Connection settings pointing at this mock
    pub fn config(&self) -> RemoteConfig {
        RemoteConfig::new(&self.url(), MOCK_KEY)
    }

    /// Simulate an outage (every request answers 503) or recovery
    pub fn set_available(&self, available: bool) {
        self.state.available.store(available, Ordering::SeqCst);
    }

    /// Number of `user_data` rows stored
    pub fn row_count(&self) -> usize {
        self.state.rows.lock().unwrap().len()
    }

    /// Raw `user_data` row for a user
    pub fn row(&self, user_id: &str) -> Option<Value> {
        self.state.rows.lock().unwrap().get(user_id).cloned()
    }

    /// Stop the mock backend
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Outage switch and project key check
async fn gate(State(state): State<Arc<MockState>>, request: Request, next: Next) -> Response {
    if !state.available.load(Ordering::SeqCst) {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"message": "Service unavailable"})),
        )
            .into_response();
    }
    if request.headers().get("apikey").and_then(|v| v.to_str().ok()) != Some(MOCK_KEY) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Invalid API key"})),
        )
            .into_response();
    }
    next.run(request).await
}

async fn handle_root() -> Json<Value> {
    Json(json!({}))
}

async fn handle_select(
    State(state): State<Arc<MockState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let user_id = params
        .get("user_id")
        .and_then(|v| v.strip_prefix("eq."))
        .unwrap_or_default();
    let rows = state.rows.lock().unwrap();
    match rows.get(user_id) {
        Some(row) => Json(json!([row])),
        None => Json(json!([])),
    }
}

async fn handle_upsert(State(state): State<Arc<MockState>>, Json(row): Json<Value>) -> Response {
    let Some(user_id) = row.get("user_id").and_then(|v| v.as_str()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "user_id is required"})),
        )
            .into_response();
    };
    state
        .rows
        .lock()
        .unwrap()
        .insert(user_id.to_string(), row.clone());
    StatusCode::CREATED.into_response()
}

#[derive(Deserialize)]
struct Credentials {
    email: String,
    password: String,
    #[serde(default)]
    data: Option<Value>,
}

async fn handle_signup(State(state): State<Arc<MockState>>, Json(body): Json<Credentials>) -> Response {
    let mut accounts = state.accounts.lock().unwrap();
    if accounts.contains_key(&body.email) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"msg": "User already registered"})),
        )
            .into_response();
    }

    let id = format!("user-{}", state.next_id.fetch_add(1, Ordering::SeqCst));
    let name = body
        .data
        .as_ref()
        .and_then(|d| d.get("name"))
        .and_then(|n| n.as_str())
        .unwrap_or_default()
        .to_string();
    let account = MockAccount {
        id: id.clone(),
        email: body.email.clone(),
        name,
        password: body.password,
    };
    let user = account.to_json();
    accounts.insert(body.email, account);
    drop(accounts);

    let token = state.issue_token(&id);
    Json(json!({"access_token": token, "token_type": "bearer", "user": user})).into_response()
}

async fn handle_token(State(state): State<Arc<MockState>>, Json(body): Json<Credentials>) -> Response {
    let account = state.accounts.lock().unwrap().get(&body.email).cloned();
    match account {
        Some(account) if account.password == body.password => {
            let token = state.issue_token(&account.id);
            Json(json!({"access_token": token, "token_type": "bearer", "user": account.to_json()}))
                .into_response()
        }
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "invalid_grant", "error_description": "Invalid login credentials"})),
        )
            .into_response(),
    }
}

async fn handle_logout(State(state): State<Arc<MockState>>, headers: HeaderMap) -> StatusCode {
    if let Some(token) = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    {
        state.tokens.lock().unwrap().remove(token);
    }
    StatusCode::NO_CONTENT
}

async fn handle_recover() -> Json<Value> {
    Json(json!({}))
}

async fn handle_user(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    match state.account_for_token(&headers) {
        Some(account) => Json(account.to_json()).into_response(),
        None => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"msg": "invalid JWT: unable to parse or verify signature"})),
        )
            .into_response(),
    }
}

/// A moderate-risk profile: 6000 income, 1500 saved, 3500 spent, 12000 cash
pub fn sample_profile() -> Profile {
    Profile {
        name: "Jordan Rivera".to_string(),
        email: "jordan@example.com".to_string(),
        age: 32,
        monthly_income: 6000.0,
        monthly_savings: 1500.0,
        monthly_expenses: 3500.0,
        current_savings: 12000.0,
        risk_tolerance: RiskTolerance::Moderate,
        investment_horizon: InvestmentHorizon::Long,
        goals: vec!["Build emergency fund".to_string()],
    }
}

pub fn sample_investment(id: &str, amount: f64, current_value: f64) -> Investment {
    Investment {
        id: id.to_string(),
        name: "Index Fund".to_string(),
        kind: InvestmentType::Etf,
        amount,
        current_value,
        returns: current_value - amount,
        purchase_date: NaiveDate::from_ymd_opt(2024, 1, 15),
    }
}

pub fn sample_goal(id: &str, target_amount: f64, current_amount: f64) -> Goal {
    Goal {
        id: id.to_string(),
        name: "Rainy day fund".to_string(),
        target_amount,
        current_amount,
        deadline: NaiveDate::from_ymd_opt(2030, 6, 30).unwrap_or_default(),
        category: GoalCategory::Emergency,
        priority: GoalPriority::High,
    }
}
