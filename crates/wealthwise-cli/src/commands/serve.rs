//! Server command implementation

use std::path::Path;

use anyhow::Result;
use wealthwise_core::RemoteConfig;
use wealthwise_server::ServerConfig;

use super::open_db;

pub async fn cmd_serve(
    db_path: &Path,
    host: &str,
    port: u16,
    no_auth: bool,
    allowed_origins: Vec<String>,
) -> Result<()> {
    println!("🚀 Starting WealthWise web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);

    if RemoteConfig::is_configured() {
        println!("   ☁️  Hosted backend: configured (falls back to local storage if unreachable)");
    } else {
        println!("   💾 Hosted backend: not configured (local storage and accounts)");
    }

    if no_auth {
        println!();
        println!("   ⚠️  Authentication DISABLED - do not expose to network!");
    } else {
        println!("   🔒 Authentication: session tokens (POST /api/auth/signin)");
    }
    if !allowed_origins.is_empty() {
        println!("   🌐 CORS origins: {}", allowed_origins.join(", "));
    }

    let db = open_db(db_path)?;
    let config = ServerConfig {
        require_auth: !no_auth,
        allowed_origins,
    };

    wealthwise_server::serve(db, host, port, config).await
}
