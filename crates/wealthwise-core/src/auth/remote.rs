//! Hosted auth provider (GoTrue-style endpoints under `/auth/v1`)

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use super::{name_from_email, AuthProvider, Identity, ResetOutcome};
use crate::error::{Error, Result};
use crate::models::{User, UserData};
use crate::store::{RemoteConfig, RemoteStore};

#[derive(Debug, Deserialize)]
struct ProviderUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: Option<serde_json::Value>,
}

impl ProviderUser {
    fn into_user(self, fallback_email: &str, name: Option<&str>) -> User {
        let email = self.email.unwrap_or_else(|| fallback_email.to_string());
        let name = name
            .map(String::from)
            .or_else(|| {
                self.user_metadata
                    .as_ref()
                    .and_then(|m| m.get("name"))
                    .and_then(|n| n.as_str())
                    .filter(|n| !n.is_empty())
                    .map(String::from)
            })
            .unwrap_or_else(|| name_from_email(&email));
        User {
            id: self.id,
            email,
            name,
        }
    }
}

/// Sign-up may answer with a session or, when email confirmation is on,
/// with the bare user object
#[derive(Debug, Deserialize)]
struct AuthResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    user: Option<ProviderUser>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: Option<serde_json::Value>,
}

impl AuthResponse {
    fn into_parts(self) -> (Option<String>, Option<ProviderUser>) {
        let user = self.user.or_else(|| {
            self.id.map(|id| ProviderUser {
                id,
                email: self.email,
                user_metadata: self.user_metadata,
            })
        });
        (self.access_token, user)
    }
}

/// Error body fields used by the hosted provider, in preference order
fn provider_message(body: &serde_json::Value) -> Option<String> {
    ["msg", "error_description", "message", "error"]
        .iter()
        .find_map(|field| body.get(*field).and_then(|v| v.as_str()))
        .map(String::from)
}

/// Map a response to an error. 4xx answers carry the provider's message and
/// become `Auth`; 5xx answers are treated like transport failures.
async fn check_auth_status(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let text = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&text)
        .ok()
        .and_then(|body| provider_message(&body))
        .unwrap_or_else(|| text.clone());

    if status.is_client_error() {
        Err(Error::Auth(message))
    } else {
        Err(Error::Storage(format!("Auth provider error ({}): {}", status, message)))
    }
}

/// Hosted authentication provider
pub struct RemoteAuth {
    config: RemoteConfig,
    client: Client,
    store: RemoteStore,
}

impl RemoteAuth {
    pub fn new(config: RemoteConfig) -> Result<Self> {
        let client = config.client()?;
        let store = RemoteStore::new(config.clone())?;
        Ok(Self {
            config,
            client,
            store,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.config.url, path)
    }

    /// Create the empty `user_data` row for a new account. Failures are
    /// logged; the first save creates the row anyway.
    async fn create_initial_record(&self, user_id: &str, token: Option<&str>) {
        let row = crate::store::remote::UserDataRow::from_data(
            user_id,
            &UserData::default(),
            Utc::now(),
        );
        if let Err(e) = self.store.upsert(&row, token).await {
            warn!(user_id, error = %e, "Failed to create initial user data record");
        }
    }
}

#[async_trait]
impl AuthProvider for RemoteAuth {
    fn name(&self) -> &str {
        "remote"
    }

    async fn sign_up(&self, email: &str, password: &str, name: &str) -> Result<Identity> {
        let req = self.client.post(self.endpoint("signup")).json(&json!({
            "email": email,
            "password": password,
            "data": { "name": name },
        }));
        let resp = self.config.authorize(req, None).send().await?;
        let body: AuthResponse = check_auth_status(resp).await?.json().await?;

        let (access_token, user) = body.into_parts();
        let user = user
            .ok_or_else(|| Error::Auth("Failed to create account".to_string()))?
            .into_user(email, Some(name));

        self.create_initial_record(&user.id, access_token.as_deref())
            .await;
        info!(user_id = %user.id, "Created hosted account");
        Ok(Identity { user, access_token })
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity> {
        let req = self
            .client
            .post(self.endpoint("token"))
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }));
        let resp = self.config.authorize(req, None).send().await?;
        let body: AuthResponse = check_auth_status(resp).await?.json().await?;

        let (access_token, user) = body.into_parts();
        let user = user
            .ok_or_else(|| Error::Auth("Failed to sign in".to_string()))?
            .into_user(email, None);
        Ok(Identity { user, access_token })
    }

    async fn sign_out(&self, identity: &Identity) -> Result<()> {
        let Some(token) = identity.access_token.as_deref() else {
            return Ok(());
        };
        let req = self.client.post(self.endpoint("logout"));
        let resp = self.config.authorize(req, Some(token)).send().await?;
        check_auth_status(resp).await?;
        Ok(())
    }

    async fn reset_password(&self, email: &str) -> Result<ResetOutcome> {
        let req = self
            .client
            .post(self.endpoint("recover"))
            .json(&json!({ "email": email }));
        let sent = match self.config.authorize(req, None).send().await {
            Ok(resp) => check_auth_status(resp).await,
            Err(e) => Err(e.into()),
        };

        match sent {
            Ok(_) => Ok(ResetOutcome {
                message: "Check your email for a password reset link.".to_string(),
                temporary_password: None,
            }),
            Err(e) if e.is_transport() => {
                warn!(error = %e, "Password reset request failed");
                Err(Error::Auth(
                    "Failed to send reset email. Please try again.".to_string(),
                ))
            }
            Err(e) => Err(e),
        }
    }

    async fn verify(&self, identity: &Identity) -> Result<User> {
        let token = identity
            .access_token
            .as_deref()
            .ok_or_else(|| Error::Auth("Session has no access token".to_string()))?;
        let req = self.client.get(self.endpoint("user"));
        let resp = self.config.authorize(req, Some(token)).send().await?;
        let user: ProviderUser = check_auth_status(resp).await?.json().await?;
        Ok(user.into_user(&identity.user.email, None))
    }
}
