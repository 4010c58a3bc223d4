//! Session tokens and the remember-me session

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::{AuthProvider, Identity, ResetOutcome, SignInRequest, SignUpRequest};
use crate::db::Database;
use crate::error::Result;
use crate::models::User;
use crate::store::Owner;

/// Session timeout (12 hours of inactivity)
pub const SESSION_TIMEOUT: Duration = Duration::from_secs(12 * 60 * 60);

/// Timeout for sessions created with remember-me (30 days of inactivity)
pub const REMEMBERED_SESSION_TIMEOUT: Duration = Duration::from_secs(30 * 24 * 60 * 60);

const SESSION_KEY: &str = "wealthwise_session";
const REMEMBER_KEY: &str = "wealthwise_remember";

/// A signed-in session
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub user: User,
    #[serde(skip)]
    pub access_token: Option<String>,
    pub remember: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip)]
    last_activity: Instant,
}

impl Session {
    fn new(identity: Identity, remember: bool) -> Self {
        Self {
            token: new_token(),
            user: identity.user,
            access_token: identity.access_token,
            remember,
            created_at: Utc::now(),
            last_activity: Instant::now(),
        }
    }

    fn timeout(&self) -> Duration {
        if self.remember {
            REMEMBERED_SESSION_TIMEOUT
        } else {
            SESSION_TIMEOUT
        }
    }

    fn is_expired(&self) -> bool {
        self.last_activity.elapsed() > self.timeout()
    }

    fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    pub fn identity(&self) -> Identity {
        Identity {
            user: self.user.clone(),
            access_token: self.access_token.clone(),
        }
    }

    /// Storage owner for this session's user
    pub fn owner(&self) -> Owner {
        Owner {
            user_id: self.user.id.clone(),
            access_token: self.access_token.clone(),
        }
    }
}

/// Opaque bearer token: SHA-256 over the clock and 32 random bytes
fn new_token() -> String {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let mut noise = [0u8; 32];
    OsRng.fill_bytes(&mut noise);

    let mut hasher = Sha256::new();
    hasher.update(timestamp.to_le_bytes());
    hasher.update(noise);
    format!("ww_{}", hex::encode(hasher.finalize()))
}

/// Account operations plus in-memory session tracking
pub struct AuthService {
    provider: Arc<dyn AuthProvider>,
    sessions: RwLock<HashMap<String, Session>>,
    db: Database,
}

impl AuthService {
    pub fn new(provider: Arc<dyn AuthProvider>, db: Database) -> Self {
        Self {
            provider,
            sessions: RwLock::new(HashMap::new()),
            db,
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// See [`AuthProvider::issues_temporary_passwords`]
    pub fn issues_temporary_passwords(&self) -> bool {
        self.provider.issues_temporary_passwords()
    }

    /// Create an account and sign it in. New accounts are remembered.
    pub async fn sign_up(&self, req: &SignUpRequest) -> Result<Session> {
        req.validate()?;
        let identity = self
            .provider
            .sign_up(req.email.trim(), &req.password, req.name.trim())
            .await?;
        info!(user_id = %identity.user.id, provider = self.provider.name(), "Signed up");
        self.start(identity, true).await
    }

    pub async fn sign_in(&self, req: &SignInRequest) -> Result<Session> {
        req.validate()?;
        let identity = self
            .provider
            .sign_in(req.email.trim(), &req.password)
            .await?;
        info!(user_id = %identity.user.id, provider = self.provider.name(), "Signed in");
        self.start(identity, req.remember_me).await
    }

    /// End a session. Unknown tokens are ignored.
    pub async fn sign_out(&self, token: &str) -> Result<()> {
        let Some(session) = self.sessions.write().await.remove(token) else {
            return Ok(());
        };

        if let Err(e) = self.provider.sign_out(&session.identity()).await {
            warn!(user_id = %session.user.id, error = %e, "Provider sign-out failed");
        }

        if self.remembered_user()?.map(|u| u.id) == Some(session.user.id.clone()) {
            self.forget()?;
        }
        info!(user_id = %session.user.id, "Signed out");
        Ok(())
    }

    /// Reset an account's password. When the provider replaced the password
    /// outright, every session of that account is ended.
    pub async fn reset_password(&self, email: &str) -> Result<ResetOutcome> {
        super::validate_email(email)?;
        let outcome = self.provider.reset_password(email.trim()).await?;
        if outcome.temporary_password.is_some() {
            self.revoke_sessions(email).await?;
        }
        Ok(outcome)
    }

    /// Drop all live sessions of an account, and its remembered session
    async fn revoke_sessions(&self, email: &str) -> Result<()> {
        let email = email.trim().to_lowercase();
        let revoked = {
            let mut sessions = self.sessions.write().await;
            let before = sessions.len();
            sessions.retain(|_, s| s.user.email.to_lowercase() != email);
            before - sessions.len()
        };

        if self
            .remembered_user()?
            .is_some_and(|user| user.email.to_lowercase() == email)
        {
            self.forget()?;
        }
        info!(revoked, "Ended sessions after password reset");
        Ok(())
    }

    /// Look up a live session, refreshing its activity time
    pub async fn current_session(&self, token: &str) -> Option<Session> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(token)?;
        if session.is_expired() {
            sessions.remove(token);
            return None;
        }
        session.touch();
        Some(session.clone())
    }

    /// User of the remembered session, without contacting the provider
    pub fn remembered_user(&self) -> Result<Option<User>> {
        Ok(self.remembered()?.map(|identity| identity.user))
    }

    /// Resume the remembered session, if any.
    ///
    /// The identity is re-checked with the provider. A rejected identity is
    /// forgotten; an unreachable provider keeps the cached user.
    pub async fn restore_remembered(&self) -> Result<Option<Session>> {
        let Some(mut identity) = self.remembered()? else {
            return Ok(None);
        };

        match self.provider.verify(&identity).await {
            Ok(user) => identity.user = user,
            Err(e) if e.is_transport() => {
                warn!(user_id = %identity.user.id, error = %e, "Could not verify remembered session, using cached user");
            }
            Err(e) => {
                info!(user_id = %identity.user.id, error = %e, "Remembered session is no longer valid");
                self.forget()?;
                return Ok(None);
            }
        }

        let session = Session::new(identity, true);
        self.insert(session.clone()).await;
        Ok(Some(session))
    }

    async fn start(&self, identity: Identity, remember: bool) -> Result<Session> {
        if remember {
            self.db.put_json(SESSION_KEY, &identity)?;
            self.db.put_json(REMEMBER_KEY, &true)?;
        }
        let session = Session::new(identity, remember);
        self.insert(session.clone()).await;
        Ok(session)
    }

    async fn insert(&self, session: Session) {
        let mut sessions = self.sessions.write().await;

        // Clean up expired sessions while we're here
        sessions.retain(|_, s| !s.is_expired());

        sessions.insert(session.token.clone(), session);
    }

    fn remembered(&self) -> Result<Option<Identity>> {
        let remember: bool = self.db.get_json(REMEMBER_KEY)?.unwrap_or(false);
        if !remember {
            return Ok(None);
        }
        self.db.get_json(SESSION_KEY)
    }

    fn forget(&self) -> Result<()> {
        self.db.delete_key(SESSION_KEY)?;
        self.db.delete_key(REMEMBER_KEY)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::LocalAuth;
    use crate::error::Error;

    fn service() -> (Database, AuthService) {
        let db = Database::in_memory().unwrap();
        let auth = AuthService::new(Arc::new(LocalAuth::new(db.clone())), db.clone());
        (db, auth)
    }

    fn sign_up_req(email: &str) -> SignUpRequest {
        SignUpRequest {
            name: "Jo".to_string(),
            email: email.to_string(),
            password: "pw-123456".to_string(),
            confirm_password: Some("pw-123456".to_string()),
        }
    }

    fn sign_in_req(email: &str, remember_me: bool) -> SignInRequest {
        SignInRequest {
            email: email.to_string(),
            password: "pw-123456".to_string(),
            remember_me,
        }
    }

    #[test]
    fn test_tokens_are_unique() {
        let a = new_token();
        let b = new_token();
        assert_ne!(a, b);
        assert!(a.starts_with("ww_"));
        assert_eq!(a.len(), 3 + 64);
    }

    #[tokio::test]
    async fn test_sign_up_remembers_session() {
        let (_db, auth) = service();
        let session = auth.sign_up(&sign_up_req("jo@example.com")).await.unwrap();
        assert!(session.remember);
        assert_eq!(auth.remembered_user().unwrap(), Some(session.user.clone()));

        let current = auth.current_session(&session.token).await.unwrap();
        assert_eq!(current.user, session.user);
    }

    #[tokio::test]
    async fn test_sign_in_without_remember_is_not_persisted() {
        let (db, auth) = service();
        let created = auth.sign_up(&sign_up_req("jo@example.com")).await.unwrap();
        auth.sign_out(&created.token).await.unwrap();

        let session = auth.sign_in(&sign_in_req("jo@example.com", false)).await.unwrap();
        assert!(!session.remember);
        assert_eq!(auth.remembered_user().unwrap(), None);
        assert!(db.get_json::<bool>(REMEMBER_KEY).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sign_out_clears_session_and_remember_keys() {
        let (db, auth) = service();
        let session = auth.sign_up(&sign_up_req("jo@example.com")).await.unwrap();
        auth.sign_out(&session.token).await.unwrap();

        assert!(auth.current_session(&session.token).await.is_none());
        assert!(db.get_json::<serde_json::Value>(SESSION_KEY).unwrap().is_none());
        assert!(db.get_json::<bool>(REMEMBER_KEY).unwrap().is_none());

        // Signing out twice is harmless
        auth.sign_out(&session.token).await.unwrap();
    }

    #[tokio::test]
    async fn test_restore_remembered_session() {
        let (db, auth) = service();
        let first = auth.sign_up(&sign_up_req("jo@example.com")).await.unwrap();

        // A fresh service over the same database, as after a restart
        let restarted = AuthService::new(Arc::new(LocalAuth::new(db.clone())), db);
        let restored = restarted.restore_remembered().await.unwrap().unwrap();
        assert_eq!(restored.user, first.user);
        assert_ne!(restored.token, first.token);
        assert!(restarted.current_session(&restored.token).await.is_some());
    }

    #[tokio::test]
    async fn test_restore_forgets_unknown_account() {
        let (db, auth) = service();
        let stale = Identity::local(User {
            id: "local_0_gone".to_string(),
            email: "gone@example.com".to_string(),
            name: "Gone".to_string(),
        });
        db.put_json(SESSION_KEY, &stale).unwrap();
        db.put_json(REMEMBER_KEY, &true).unwrap();

        assert!(auth.restore_remembered().await.unwrap().is_none());
        assert!(auth.remembered_user().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_validation_runs_before_provider() {
        let (_db, auth) = service();
        let mut req = sign_up_req("jo@example.com");
        req.confirm_password = Some("different".to_string());
        let err = auth.sign_up(&req).await.unwrap_err();
        assert!(matches!(err, Error::Validation(ref m) if m == "Passwords do not match"));
    }

    #[tokio::test]
    async fn test_reset_ends_sessions_of_that_account() {
        let (db, auth) = service();
        let first = auth.sign_up(&sign_up_req("jo@example.com")).await.unwrap();
        let second = auth.sign_in(&sign_in_req("jo@example.com", false)).await.unwrap();
        let other = auth.sign_up(&sign_up_req("sam@example.com")).await.unwrap();
        // sam's sign-up replaced the remembered session; put jo's back
        auth.sign_in(&sign_in_req("JO@example.com", true)).await.unwrap();

        let outcome = auth.reset_password("Jo@Example.com").await.unwrap();
        assert!(outcome.temporary_password.is_some());

        assert!(auth.current_session(&first.token).await.is_none());
        assert!(auth.current_session(&second.token).await.is_none());
        assert!(auth.current_session(&other.token).await.is_some());
        assert!(auth.remembered_user().unwrap().is_none());
        assert!(db.get_json::<serde_json::Value>(SESSION_KEY).unwrap().is_none());
        assert!(auth.sign_in(&sign_in_req("jo@example.com", false)).await.is_err());
    }

    #[tokio::test]
    async fn test_reset_keeps_other_remembered_account() {
        let (_db, auth) = service();
        auth.sign_up(&sign_up_req("jo@example.com")).await.unwrap();
        let sam = auth.sign_up(&sign_up_req("sam@example.com")).await.unwrap();

        auth.reset_password("jo@example.com").await.unwrap();
        assert_eq!(auth.remembered_user().unwrap(), Some(sam.user));
        assert!(auth.issues_temporary_passwords());
    }

    #[tokio::test]
    async fn test_unknown_token_has_no_session() {
        let (_db, auth) = service();
        assert!(auth.current_session("ww_nope").await.is_none());
    }
}
