//! Local account registry
//!
//! Accounts live under a single key-value entry (`wealthwise_users`) mapping
//! email to the stored account. Passwords are Argon2id PHC strings.

use std::collections::HashMap;

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use async_trait::async_trait;
use chrono::Utc;
use rand::rngs::OsRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::info;

use super::{AuthProvider, Identity, ResetOutcome};
use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::User;

pub const USERS_KEY: &str = "wealthwise_users";

const TEMP_PASSWORD_LEN: usize = 8;
const ID_SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredAccount {
    id: String,
    email: String,
    name: String,
    password_hash: String,
}

impl StoredAccount {
    fn user(&self) -> User {
        User {
            id: self.id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
        }
    }
}

/// Local-mode accounts backed by the key-value store
pub struct LocalAuth {
    db: Database,
    /// Serializes read-modify-write of the registry
    registry_lock: Mutex<()>,
}

impl LocalAuth {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            registry_lock: Mutex::new(()),
        }
    }

    fn registry(&self) -> Result<HashMap<String, StoredAccount>> {
        Ok(self.db.get_json(USERS_KEY)?.unwrap_or_default())
    }

    fn save_registry(&self, registry: &HashMap<String, StoredAccount>) -> Result<()> {
        self.db.put_json(USERS_KEY, registry)
    }
}

/// Registry key for an email address
fn account_key(email: &str) -> String {
    email.trim().to_lowercase()
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::InvalidInput(format!("Password hashing failed: {}", e)))
}

fn verify_password(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

fn base36(len: usize) -> String {
    let mut rng = OsRng;
    (0..len)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}

/// `local_<millis>_<9 base36 chars>`
fn new_user_id() -> String {
    format!(
        "local_{}_{}",
        Utc::now().timestamp_millis(),
        base36(ID_SUFFIX_LEN)
    )
}

#[async_trait]
impl AuthProvider for LocalAuth {
    fn name(&self) -> &str {
        "local"
    }

    async fn sign_up(&self, email: &str, password: &str, name: &str) -> Result<Identity> {
        let _guard = self.registry_lock.lock().await;
        let mut registry = self.registry()?;
        let key = account_key(email);
        if registry.contains_key(&key) {
            return Err(Error::Auth("Email already registered".to_string()));
        }

        let account = StoredAccount {
            id: new_user_id(),
            email: email.trim().to_string(),
            name: name.trim().to_string(),
            password_hash: hash_password(password)?,
        };
        let user = account.user();
        registry.insert(key, account);
        self.save_registry(&registry)?;

        info!(user_id = %user.id, "Created local account");
        Ok(Identity::local(user))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity> {
        let registry = self.registry()?;
        let account = registry
            .get(&account_key(email))
            .ok_or_else(|| Error::Auth("No account found with this email".to_string()))?;

        if !verify_password(password, &account.password_hash) {
            return Err(Error::Auth("Incorrect password".to_string()));
        }
        Ok(Identity::local(account.user()))
    }

    async fn sign_out(&self, _identity: &Identity) -> Result<()> {
        Ok(())
    }

    async fn reset_password(&self, email: &str) -> Result<ResetOutcome> {
        let _guard = self.registry_lock.lock().await;
        let mut registry = self.registry()?;
        let account = registry.get_mut(&account_key(email)).ok_or_else(|| {
            Error::Auth("No account found with this email address.".to_string())
        })?;

        let temporary = base36(TEMP_PASSWORD_LEN);
        account.password_hash = hash_password(&temporary)?;
        let user_id = account.id.clone();
        self.save_registry(&registry)?;

        info!(user_id = %user_id, "Reset local account password");
        Ok(ResetOutcome {
            message: "Your temporary password is shown below. Use it to sign in, then update your password.".to_string(),
            temporary_password: Some(temporary),
        })
    }

    fn issues_temporary_passwords(&self) -> bool {
        true
    }

    async fn verify(&self, identity: &Identity) -> Result<User> {
        self.registry()?
            .values()
            .find(|account| account.id == identity.user.id)
            .map(StoredAccount::user)
            .ok_or_else(|| Error::Auth("Account no longer exists".to_string()))
    }
}
