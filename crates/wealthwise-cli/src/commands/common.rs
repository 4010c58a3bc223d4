//! Shared command utilities and init
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `connect` - Select backends and resolve the acting user
//! - `cmd_init` - Initialize the database

use std::path::Path;

use anyhow::{Context as _, Result};
use serde::Serialize;
use wealthwise_core::{db::Database, Owner, RemoteConfig, User};
use wealthwise_server::{build_state, AppError, AppState, CurrentUser, ServerConfig};

/// Open the database, creating its directory if needed
pub fn open_db(db_path: &Path) -> Result<Database> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    Database::new(&db_path.to_string_lossy()).context("Failed to open database")
}

/// Backends plus the user commands act for
pub struct Context {
    pub state: AppState,
    pub current: CurrentUser,
}

/// How results are printed
#[derive(Debug, Clone, Copy, Default)]
pub struct Output {
    pub json: bool,
}

impl Output {
    /// Print `value` as JSON when requested. Returns true if it did.
    pub fn json<T: Serialize>(&self, value: &T) -> Result<bool> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        Ok(self.json)
    }
}

/// Open the database, pick backends from the environment and resolve the user.
///
/// `--user` wins, then the remembered session, then the local-dev user.
pub async fn connect(db_path: &Path, user: Option<&str>) -> Result<Context> {
    let db = open_db(db_path)?;
    let state = build_state(db, ServerConfig::default()).await?;
    let current = resolve_user(&state, user).await?;
    Ok(Context { state, current })
}

pub async fn resolve_user(state: &AppState, user: Option<&str>) -> Result<CurrentUser> {
    if let Some(id) = user {
        return Ok(CurrentUser {
            user: User {
                id: id.to_string(),
                email: String::new(),
                name: String::new(),
            },
            owner: Owner::local(id),
            token: None,
        });
    }

    match state.auth.restore_remembered().await? {
        Some(session) => Ok(CurrentUser {
            owner: session.owner(),
            user: session.user.clone(),
            token: Some(session.token),
        }),
        None => Ok(CurrentUser::local_dev()),
    }
}

/// Server-layer errors carry their client message
pub fn app_err(err: AppError) -> anyhow::Error {
    anyhow::anyhow!("{}", err.message())
}

pub fn cmd_init(db_path: &Path) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    open_db(db_path)?;

    if RemoteConfig::is_configured() {
        println!("   ☁️  Hosted backend: configured");
    } else {
        println!("   💾 Hosted backend: not configured (local storage only)");
        println!("      Set WEALTHWISE_BACKEND_URL and WEALTHWISE_BACKEND_KEY to sync");
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Create an account: wealthwise signup --name NAME --email EMAIL --password PASSWORD");
    println!("  2. Set up your profile: wealthwise profile set --name NAME --age AGE --income N --savings N --expenses N");
    println!("  3. Start web UI: wealthwise serve");

    Ok(())
}
