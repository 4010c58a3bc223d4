//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod advisor;
pub mod auth;
pub mod dashboard;
pub mod goals;
pub mod investments;
pub mod profile;
pub mod storage;
pub mod tools;

// Re-export all handlers for use in router
pub use advisor::*;
pub use auth::*;
pub use dashboard::*;
pub use goals::*;
pub use investments::*;
pub use profile::*;
pub use storage::*;
pub use tools::*;
