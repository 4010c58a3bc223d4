//! Authentication with a hosted provider and a local fallback
//!
//! # Architecture
//!
//! - `AuthProvider` trait defines account operations against one backend
//! - `RemoteAuth` talks to the hosted backend's auth endpoints
//! - `LocalAuth` keeps an account registry in the local database
//! - `FallbackAuth` tries the hosted provider and falls back to local on
//!   transport failures only. Errors the provider reports are returned as-is.
//! - `AuthService` issues session tokens on top of a provider and persists the
//!   remember-me session

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::User;

mod fallback;
mod local;
mod remote;
mod session;

pub use fallback::FallbackAuth;
pub use local::LocalAuth;
pub use remote::RemoteAuth;
pub use session::{AuthService, Session, REMEMBERED_SESSION_TIMEOUT, SESSION_TIMEOUT};

/// A signed-in user plus the backend credential that goes with it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user: User,
    /// Hosted backend access token, absent for local accounts
    #[serde(default)]
    pub access_token: Option<String>,
}

impl Identity {
    pub fn local(user: User) -> Self {
        Self {
            user,
            access_token: None,
        }
    }
}

/// Result of a password reset request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetOutcome {
    pub message: String,
    /// Set only by the local provider, which has no way to send email
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temporary_password: Option<String>,
}

/// Trait for authentication backends
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Human-readable name for this provider
    fn name(&self) -> &str;

    /// Create an account and sign it in
    async fn sign_up(&self, email: &str, password: &str, name: &str) -> Result<Identity>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity>;

    /// End the identity's session with the provider
    async fn sign_out(&self, identity: &Identity) -> Result<()>;

    async fn reset_password(&self, email: &str) -> Result<ResetOutcome>;

    /// Whether `reset_password` replaces the password on the spot and hands
    /// back a temporary one instead of emailing a link
    fn issues_temporary_passwords(&self) -> bool {
        false
    }

    /// Check that a previously issued identity is still valid
    async fn verify(&self, identity: &Identity) -> Result<User>;
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub confirm_password: Option<String>,
}

impl SignUpRequest {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation("Name is required".to_string()));
        }
        validate_email(&self.email)?;
        if self.password.is_empty() {
            return Err(Error::Validation("Password is required".to_string()));
        }
        if let Some(confirm) = &self.confirm_password {
            if confirm != &self.password {
                return Err(Error::Validation("Passwords do not match".to_string()));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

impl SignInRequest {
    pub fn validate(&self) -> Result<()> {
        validate_email(&self.email)?;
        if self.password.is_empty() {
            return Err(Error::Validation("Password is required".to_string()));
        }
        Ok(())
    }
}

pub(crate) fn validate_email(email: &str) -> Result<()> {
    let email = email.trim();
    if email.is_empty() {
        return Err(Error::Validation("Email is required".to_string()));
    }
    if !email.contains('@') {
        return Err(Error::Validation(
            "Please enter a valid email address".to_string(),
        ));
    }
    Ok(())
}

/// Display name fallback: the part of the email before `@`
pub(crate) fn name_from_email(email: &str) -> String {
    match email.split('@').next() {
        Some(prefix) if !prefix.is_empty() => prefix.to_string(),
        _ => "User".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(confirm: Option<&str>) -> SignUpRequest {
        SignUpRequest {
            name: "Alex".to_string(),
            email: "alex@example.com".to_string(),
            password: "hunter22".to_string(),
            confirm_password: confirm.map(String::from),
        }
    }

    #[test]
    fn test_sign_up_validation() {
        assert!(request(None).validate().is_ok());
        assert!(request(Some("hunter22")).validate().is_ok());

        let err = request(Some("hunter23")).validate().unwrap_err();
        assert_eq!(err.to_string(), "Validation failed: Passwords do not match");

        let mut missing_name = request(None);
        missing_name.name = "  ".to_string();
        assert!(matches!(missing_name.validate(), Err(Error::Validation(_))));

        let mut bad_email = request(None);
        bad_email.email = "alex".to_string();
        assert!(matches!(bad_email.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_sign_in_request_defaults_remember_off() {
        let req: SignInRequest =
            serde_json::from_str(r#"{"email":"a@b.c","password":"x"}"#).unwrap();
        assert!(!req.remember_me);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_name_from_email() {
        assert_eq!(name_from_email("jamie.lee@example.com"), "jamie.lee");
        assert_eq!(name_from_email("@example.com"), "User");
    }
}
