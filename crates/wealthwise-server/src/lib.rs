//! WealthWise Web Server
//!
//! Axum-based REST API for the WealthWise personal finance tracker.
//!
//! Security features:
//! - Session token authentication (secure by default, use --no-auth for local dev)
//! - Restrictive CORS policy
//! - Sanitized error responses

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use wealthwise_core::{
    achievements, Achievement, Advisor, AuthProvider, AuthService, Conversation, Database,
    FallbackAuth, LocalAuth, LocalStore, Owner, RemoteAuth, RemoteConfig, RemoteStore,
    SaveOutcome, Storage, User, UserData, UserDataStore,
};

mod handlers;

/// Authorization header carrying the session token
const AUTHORIZATION_HEADER: &str = "authorization";

/// User id for requests when authentication is disabled
pub const LOCAL_DEV_USER_ID: &str = "local-dev";

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// Whether authentication is required (secure by default)
    pub require_auth: bool,
    /// Allowed CORS origins (empty = same-origin only in production)
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            require_auth: true,
            allowed_origins: vec![],
        }
    }
}

/// The user a request acts for, set by the auth middleware
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub owner: Owner,
    /// Session token, absent for the local-dev user
    pub token: Option<String>,
}

impl CurrentUser {
    pub fn local_dev() -> Self {
        Self {
            user: User {
                id: LOCAL_DEV_USER_ID.to_string(),
                email: "local-dev@localhost".to_string(),
                name: "Local Dev".to_string(),
            },
            owner: Owner::local(LOCAL_DEV_USER_ID),
            token: None,
        }
    }
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub config: ServerConfig,
    pub auth: AuthService,
    pub storage: Storage,
    pub advisor: Advisor,
    /// Advisor transcripts by user id
    pub conversations: RwLock<HashMap<String, Arc<std::sync::Mutex<Conversation>>>>,
    /// Serializes load-modify-save of each user's record
    record_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl AppState {
    pub fn new(
        db: Database,
        config: ServerConfig,
        auth: AuthService,
        storage: Storage,
        advisor: Advisor,
    ) -> Self {
        Self {
            db,
            config,
            auth,
            storage,
            advisor,
            conversations: RwLock::new(HashMap::new()),
            record_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Local-only state (no hosted backend)
    pub fn local(db: Database, config: ServerConfig, advisor: Advisor) -> Self {
        let auth = AuthService::new(Arc::new(LocalAuth::new(db.clone())), db.clone());
        let storage = Storage::local_only(Arc::new(LocalStore::new(db.clone())));
        Self::new(db, config, auth, storage, advisor)
    }

    /// Load the current user's record
    pub async fn load(&self, current: &CurrentUser) -> Result<UserData, AppError> {
        Ok(self.storage.load(&current.owner).await?)
    }

    /// Apply a change to the user's record, evaluate achievements and persist.
    ///
    /// Nothing is saved if `change` fails.
    pub async fn update<T, F>(&self, current: &CurrentUser, change: F) -> Result<Saved<T>, AppError>
    where
        F: FnOnce(&mut UserData) -> wealthwise_core::Result<T>,
    {
        let lock = self.record_lock(&current.user.id).await;
        let result = {
            let _guard = lock.lock().await;
            self.apply_and_save(current, change).await
        };
        self.release_record_lock(&current.user.id, lock).await;
        result
    }

    async fn apply_and_save<T, F>(&self, current: &CurrentUser, change: F) -> Result<Saved<T>, AppError>
    where
        F: FnOnce(&mut UserData) -> wealthwise_core::Result<T>,
    {
        let mut data = self.storage.load(&current.owner).await?;
        let result = change(&mut data)?;

        let unlocked_ids = achievements::evaluate(&mut data, Utc::now());
        let unlocked = data
            .achievements
            .iter()
            .filter(|a| unlocked_ids.iter().any(|id| *id == a.id))
            .cloned()
            .collect();

        let storage = self.storage.save(&current.owner, &data).await?;
        if storage.degraded {
            warn!(user_id = %current.user.id, "Saved to local storage only");
        }

        Ok(Saved {
            data: result,
            unlocked,
            storage,
        })
    }

    async fn record_lock(&self, user_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.record_locks.lock().await;
        locks
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drop the user's lock entry once no other request holds a handle to it
    async fn release_record_lock(&self, user_id: &str, lock: Arc<Mutex<()>>) {
        let mut locks = self.record_locks.lock().await;
        // One handle in the map plus ours
        if Arc::strong_count(&lock) == 2 {
            locks.remove(user_id);
        }
    }
}

/// Response for a change to the user's record
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Saved<T> {
    pub data: T,
    /// Achievements unlocked by this change
    pub unlocked: Vec<Achievement>,
    pub storage: SaveOutcome,
}

/// Success response
#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Build state from the environment: hosted backend when configured,
/// otherwise local storage and accounts only
pub async fn build_state(db: Database, config: ServerConfig) -> anyhow::Result<AppState> {
    let advisor = Advisor::from_env();

    if !RemoteConfig::is_configured() {
        info!("ℹ️  Hosted backend not configured (set WEALTHWISE_BACKEND_URL and WEALTHWISE_BACKEND_KEY)");
        return Ok(AppState::local(db, config, advisor));
    }

    let remote_config = RemoteConfig::from_env()?;
    let remote_store: Arc<dyn UserDataStore> = Arc::new(RemoteStore::new(remote_config.clone())?);
    let local_store: Arc<dyn UserDataStore> = Arc::new(LocalStore::new(db.clone()));
    let storage = Storage::connect(Some(remote_store), local_store).await;

    let remote_auth: Arc<dyn AuthProvider> = Arc::new(RemoteAuth::new(remote_config)?);
    let local_auth: Arc<dyn AuthProvider> = Arc::new(LocalAuth::new(db.clone()));
    let auth = AuthService::new(
        Arc::new(FallbackAuth::new(remote_auth, local_auth)),
        db.clone(),
    );

    Ok(AppState::new(db, config, auth, storage, advisor))
}

/// Authentication middleware - resolves the bearer session token
///
/// With `require_auth` off, requests without a valid token act as the
/// local-dev user.
async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(AUTHORIZATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string());

    let session = match token.as_deref() {
        Some(token) => state.auth.current_session(token).await,
        None => None,
    };

    let current = match session {
        Some(session) => CurrentUser {
            owner: session.owner(),
            user: session.user.clone(),
            token: Some(session.token.clone()),
        },
        None if !state.config.require_auth => CurrentUser::local_dev(),
        None => {
            warn!(path = %request.uri().path(), "Unauthorized request - no valid session");
            return (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({
                    "error": "Authentication required"
                })),
            )
                .into_response();
        }
    };

    request.extensions_mut().insert(current);
    next.run(request).await
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let config = state.config.clone();

    // Account routes reachable without a session
    let public_routes = Router::new()
        .route("/auth/signup", post(handlers::sign_up))
        .route("/auth/signin", post(handlers::sign_in))
        .route("/auth/reset-password", post(handlers::reset_password));

    let protected_routes = Router::new()
        // Session
        .route("/auth/signout", post(handlers::sign_out))
        .route("/me", get(handlers::get_me))
        // Record
        .route("/data", get(handlers::get_data))
        .route(
            "/profile",
            get(handlers::get_profile).put(handlers::put_profile),
        )
        // Investments
        .route(
            "/investments",
            get(handlers::list_investments).post(handlers::create_investment),
        )
        .route(
            "/investments/:id",
            patch(handlers::update_investment).delete(handlers::delete_investment),
        )
        // Goals
        .route(
            "/goals",
            get(handlers::list_goals).post(handlers::create_goal),
        )
        .route(
            "/goals/:id",
            patch(handlers::update_goal).delete(handlers::delete_goal),
        )
        // Derived views
        .route("/achievements", get(handlers::list_achievements))
        .route("/dashboard", get(handlers::get_dashboard))
        .route("/health-score", get(handlers::get_health_score))
        // Calculators
        .route("/tools/compound", post(handlers::compound))
        .route("/tools/fire", post(handlers::fire))
        .route("/tools/fire/defaults", get(handlers::fire_defaults))
        .route("/tools/budget", post(handlers::budget))
        // Advisor
        .route(
            "/advisor",
            get(handlers::get_conversation).delete(handlers::reset_conversation),
        )
        .route("/advisor/message", post(handlers::send_message))
        .route("/advisor/action", post(handlers::run_action))
        // Storage
        .route("/storage", get(handlers::storage_status))
        .route("/storage/reconcile", post(handlers::reconcile_storage))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let api_routes = public_routes.merge(protected_routes);

    // Build CORS layer
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::PATCH,
        Method::DELETE,
        Method::OPTIONS,
    ];
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    };

    Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
        ))
}

/// Start the server
pub async fn serve(db: Database, host: &str, port: u16, config: ServerConfig) -> anyhow::Result<()> {
    if !config.require_auth {
        warn!("⚠️  Authentication disabled - do not expose to network!");
    }

    let state = build_state(db, config).await?;
    info!(
        storage = ?state.storage.backend(),
        auth = state.auth.provider_name(),
        "Backends selected"
    );

    let app = create_router(Arc::new(state));
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    fn with_status(status: StatusCode, msg: &str) -> Self {
        Self {
            status,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn bad_request(msg: &str) -> Self {
        Self::with_status(StatusCode::BAD_REQUEST, msg)
    }

    pub fn unauthorized(msg: &str) -> Self {
        Self::with_status(StatusCode::UNAUTHORIZED, msg)
    }

    pub fn forbidden(msg: &str) -> Self {
        Self::with_status(StatusCode::FORBIDDEN, msg)
    }

    pub fn not_found(msg: &str) -> Self {
        Self::with_status(StatusCode::NOT_FOUND, msg)
    }

    pub fn conflict(msg: &str) -> Self {
        Self::with_status(StatusCode::CONFLICT, msg)
    }

    pub fn unavailable(msg: &str) -> Self {
        Self::with_status(StatusCode::SERVICE_UNAVAILABLE, msg)
    }

    pub fn internal(msg: &str) -> Self {
        Self::with_status(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Message shown to the client
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        use wealthwise_core::Error as CoreError;

        let err = err.into();
        if let Some(core) = err.downcast_ref::<CoreError>() {
            match core {
                CoreError::Validation(msg) | CoreError::InvalidInput(msg) => {
                    return Self::bad_request(msg)
                }
                CoreError::NotFound(msg) => return Self::not_found(msg),
                CoreError::Auth(msg) => return Self::unauthorized(msg),
                CoreError::Busy(msg) => return Self::conflict(msg),
                CoreError::Http(_) | CoreError::Storage(_) => {
                    warn!(error = %core, "Hosted backend request failed");
                    return Self::unavailable("The hosted backend is unavailable. Please try again.");
                }
                _ => {}
            }
        }

        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}

#[cfg(test)]
mod tests;
