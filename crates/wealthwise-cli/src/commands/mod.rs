//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `common` - Shared utilities (open_db, connect, output) and init
//! - `account` - Sign up, sign in, sign out, password reset
//! - `records` - Profile, investment and goal editing
//! - `reports` - Dashboard, health score, achievements
//! - `tools` - Calculators and the advisor
//! - `serve` - Web server command
//! - `status` - Storage status and reconciliation

pub mod account;
pub mod common;
pub mod records;
pub mod reports;
pub mod serve;
pub mod status;
pub mod tools;

// Re-export command functions for main.rs
pub use account::*;
pub use common::*;
pub use records::*;
pub use reports::*;
pub use serve::*;
pub use status::*;
pub use tools::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Text progress bar for a 0..=100 value
pub fn bar(percent: f64, width: usize) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}
