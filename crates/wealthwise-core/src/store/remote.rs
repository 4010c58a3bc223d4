//! Hosted backend storage
//!
//! Talks to a PostgREST-style `user_data` table with one row per user:
//! `{user_id, profile, investments, goals, achievements, updated_at}`.
//!
//! # Configuration
//!
//! - `WEALTHWISE_BACKEND_URL` - project URL (e.g. https://xyz.supabase.co)
//! - `WEALTHWISE_BACKEND_KEY` - public project key

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Owner, UserDataStore};
use crate::error::{Error, Result};
use crate::models::{Achievement, Goal, Investment, Profile, UserData};

pub const BACKEND_URL_ENV: &str = "WEALTHWISE_BACKEND_URL";
pub const BACKEND_KEY_ENV: &str = "WEALTHWISE_BACKEND_KEY";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Hosted backend connection settings
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub url: String,
    pub key: String,
}

impl RemoteConfig {
    pub fn new(url: &str, key: &str) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            key: key.to_string(),
        }
    }

    /// Create config from environment variables
    pub fn from_env() -> Result<Self> {
        let url = std::env::var(BACKEND_URL_ENV).map_err(|_| {
            Error::InvalidInput(format!("{} environment variable not set", BACKEND_URL_ENV))
        })?;
        let key = std::env::var(BACKEND_KEY_ENV).map_err(|_| {
            Error::InvalidInput(format!("{} environment variable not set", BACKEND_KEY_ENV))
        })?;
        Ok(Self::new(&url, &key))
    }

    /// Check if the hosted backend is configured (both env vars set and non-empty)
    pub fn is_configured() -> bool {
        [BACKEND_URL_ENV, BACKEND_KEY_ENV]
            .iter()
            .all(|var| std::env::var(var).map(|v| !v.trim().is_empty()).unwrap_or(false))
    }

    pub(crate) fn client(&self) -> Result<Client> {
        Ok(Client::builder().timeout(REQUEST_TIMEOUT).build()?)
    }

    /// Attach the project key and a bearer credential (user token, else the key)
    pub(crate) fn authorize(&self, req: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        req.header("apikey", &self.key)
            .bearer_auth(token.unwrap_or(&self.key))
    }
}

/// Turn a non-2xx response into a storage error
pub(crate) async fn check_status(resp: Response, what: &str) -> Result<Response> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    Err(Error::Storage(format!("{} failed ({}): {}", what, status, body)))
}

/// One row of the `user_data` table
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct UserDataRow {
    pub user_id: String,
    #[serde(default)]
    pub profile: Option<Profile>,
    #[serde(default)]
    pub investments: Option<Vec<Investment>>,
    #[serde(default)]
    pub goals: Option<Vec<Goal>>,
    #[serde(default)]
    pub achievements: Option<Vec<Achievement>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserDataRow {
    pub fn from_data(user_id: &str, data: &UserData, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.to_string(),
            profile: data.profile.clone(),
            investments: Some(data.investments.clone()),
            goals: Some(data.goals.clone()),
            achievements: Some(data.achievements.clone()),
            updated_at: Some(now),
        }
    }

    pub fn into_data(self) -> UserData {
        UserData {
            profile: self.profile,
            investments: self.investments.unwrap_or_default(),
            goals: self.goals.unwrap_or_default(),
            achievements: self.achievements.unwrap_or_default(),
        }
    }
}

/// Hosted `user_data` table backend
pub struct RemoteStore {
    config: RemoteConfig,
    client: Client,
}

impl RemoteStore {
    pub fn new(config: RemoteConfig) -> Result<Self> {
        let client = config.client()?;
        Ok(Self { config, client })
    }

    /// Create from environment variables, `None` when not configured
    pub fn from_env() -> Result<Option<Self>> {
        if !RemoteConfig::is_configured() {
            return Ok(None);
        }
        Self::new(RemoteConfig::from_env()?).map(Some)
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/user_data", self.config.url)
    }

    /// Insert or replace a raw row
    pub(crate) async fn upsert(&self, row: &UserDataRow, token: Option<&str>) -> Result<()> {
        let req = self
            .client
            .post(self.table_url())
            .query(&[("on_conflict", "user_id")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(row);
        let resp = self.config.authorize(req, token).send().await?;
        check_status(resp, "Saving user data").await?;
        Ok(())
    }
}

#[async_trait]
impl UserDataStore for RemoteStore {
    fn name(&self) -> &str {
        "remote"
    }

    async fn load(&self, owner: &Owner) -> Result<Option<UserData>> {
        let req = self.client.get(self.table_url()).query(&[
            ("user_id", format!("eq.{}", owner.user_id)),
            ("select", "*".to_string()),
        ]);
        let resp = self
            .config
            .authorize(req, owner.access_token.as_deref())
            .send()
            .await?;
        let rows: Vec<UserDataRow> = check_status(resp, "Loading user data").await?.json().await?;

        debug!(user_id = %owner.user_id, rows = rows.len(), "Loaded user data row");
        Ok(rows.into_iter().next().map(UserDataRow::into_data))
    }

    async fn save(&self, owner: &Owner, data: &UserData) -> Result<()> {
        let row = UserDataRow::from_data(&owner.user_id, data, Utc::now());
        self.upsert(&row, owner.access_token.as_deref()).await
    }

    async fn health_check(&self) -> bool {
        let req = self.client.get(format!("{}/rest/v1/", self.config.url));
        match self.config.authorize(req, None).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{sample_investment, sample_profile, MockBackend};

    #[test]
    fn test_config_trims_trailing_slash() {
        let config = RemoteConfig::new("https://example.test/", "k");
        assert_eq!(config.url, "https://example.test");
    }

    #[test]
    fn test_row_with_null_lists_decodes_empty() {
        let row: UserDataRow = serde_json::from_str(
            r#"{"user_id":"u1","profile":null,"investments":null,"goals":[],"achievements":null}"#,
        )
        .unwrap();
        assert_eq!(row.into_data(), UserData::default());
    }

    #[tokio::test]
    async fn test_save_and_load_against_mock() {
        let mock = MockBackend::start().await;
        let store = RemoteStore::new(mock.config()).unwrap();
        assert!(store.health_check().await);

        let owner = Owner::local("u1");
        assert!(store.load(&owner).await.unwrap().is_none());

        let data = UserData {
            profile: Some(sample_profile()),
            investments: vec![sample_investment("inv_1", 500.0, 650.0)],
            ..Default::default()
        };
        store.save(&owner, &data).await.unwrap();
        store.save(&owner, &data).await.unwrap();

        assert_eq!(store.load(&owner).await.unwrap(), Some(data));
        assert_eq!(mock.row_count(), 1);
    }

    #[tokio::test]
    async fn test_outage_surfaces_transport_error() {
        let mock = MockBackend::start().await;
        let store = RemoteStore::new(mock.config()).unwrap();
        mock.set_available(false);

        assert!(!store.health_check().await);
        let err = store.load(&Owner::local("u1")).await.unwrap_err();
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_unhealthy() {
        let store = RemoteStore::new(RemoteConfig::new("http://127.0.0.1:1", "k")).unwrap();
        assert!(!store.health_check().await);
    }
}
