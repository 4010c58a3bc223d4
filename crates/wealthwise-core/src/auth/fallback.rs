//! Hosted-first provider with a local fallback

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use super::{AuthProvider, Identity, ResetOutcome};
use crate::error::Result;
use crate::models::User;

/// Tries the hosted provider first. When the hosted call fails in transport
/// (unreachable, timeout, 5xx), sign-up and sign-in are retried against the
/// local provider. Password reset never falls back.
pub struct FallbackAuth {
    remote: Arc<dyn AuthProvider>,
    local: Arc<dyn AuthProvider>,
}

impl FallbackAuth {
    pub fn new(remote: Arc<dyn AuthProvider>, local: Arc<dyn AuthProvider>) -> Self {
        Self { remote, local }
    }

    /// Identities without a hosted token belong to the local provider
    fn owner_of(&self, identity: &Identity) -> &Arc<dyn AuthProvider> {
        if identity.access_token.is_some() {
            &self.remote
        } else {
            &self.local
        }
    }
}

#[async_trait]
impl AuthProvider for FallbackAuth {
    fn name(&self) -> &str {
        "fallback"
    }

    async fn sign_up(&self, email: &str, password: &str, name: &str) -> Result<Identity> {
        match self.remote.sign_up(email, password, name).await {
            Err(e) if e.is_transport() => {
                warn!(error = %e, "Hosted sign-up failed, creating local account");
                self.local.sign_up(email, password, name).await
            }
            other => other,
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity> {
        match self.remote.sign_in(email, password).await {
            Err(e) if e.is_transport() => {
                warn!(error = %e, "Hosted sign-in failed, trying local accounts");
                self.local.sign_in(email, password).await
            }
            other => other,
        }
    }

    async fn sign_out(&self, identity: &Identity) -> Result<()> {
        self.owner_of(identity).sign_out(identity).await
    }

    async fn reset_password(&self, email: &str) -> Result<ResetOutcome> {
        self.remote.reset_password(email).await
    }

    async fn verify(&self, identity: &Identity) -> Result<User> {
        self.owner_of(identity).verify(identity).await
    }
}
