//! Status and reconcile commands

use anyhow::Result;
use serde::Serialize;
use wealthwise_core::{Backend, StorageStatus, CATALOG};

use super::{Context, Output};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusReport<'a> {
    user_id: &'a str,
    email: &'a str,
    auth_provider: &'a str,
    storage: StorageStatus,
    has_profile: bool,
    investments: usize,
    goals: usize,
    achievements: usize,
}

pub async fn cmd_status(ctx: &Context, out: Output) -> Result<()> {
    let data = ctx.state.storage.load(&ctx.current.owner).await?;
    let report = StatusReport {
        user_id: &ctx.current.user.id,
        email: &ctx.current.user.email,
        auth_provider: ctx.state.auth.provider_name(),
        storage: ctx.state.storage.status(),
        has_profile: data.profile.is_some(),
        investments: data.investments.len(),
        goals: data.goals.len(),
        achievements: data.achievements.len(),
    };
    if out.json(&report)? {
        return Ok(());
    }

    println!("📊 WealthWise Status");
    println!();
    println!("   Database: {}", ctx.state.db.path());
    if ctx.current.token.is_some() {
        println!("   Signed in: {} ({})", report.email, report.user_id);
    } else {
        println!("   Acting as: {}", report.user_id);
    }
    println!("   Accounts: {}", report.auth_provider);

    let backend = match report.storage.backend {
        Backend::Remote => "☁️  hosted backend",
        Backend::Local => "💾 local database",
    };
    println!("   Storage: {}", backend);
    if report.storage.degraded {
        println!(
            "   ⚠️  Degraded: hosted backend unreachable, {} user(s) with unsynced changes",
            report.storage.pending_users
        );
    }

    println!();
    println!("   Profile: {}", if report.has_profile { "yes" } else { "not set" });
    println!("   Investments: {}", report.investments);
    println!("   Goals: {}", report.goals);
    println!("   Achievements: {}/{}", report.achievements, CATALOG.len());
    Ok(())
}

pub async fn cmd_reconcile(ctx: &Context) -> Result<()> {
    if ctx.state.storage.backend() == Backend::Local {
        println!("💾 Using local storage only - nothing to reconcile.");
        return Ok(());
    }

    let outcome = ctx.state.storage.reconcile(&ctx.current.owner).await?;
    if outcome.pushed {
        println!("✅ Local changes pushed to the hosted backend");
    } else if outcome.degraded {
        println!("⚠️  Hosted backend still unreachable - try again later");
    } else {
        println!("✅ Already in sync");
    }
    Ok(())
}
