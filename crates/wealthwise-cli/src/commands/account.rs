//! Account commands
//!
//! Sessions started here are always remembered, so later commands act for
//! the signed-in user.

use anyhow::Result;
use wealthwise_core::{SignInRequest, SignUpRequest};

use super::Context;

pub async fn cmd_signup(ctx: &Context, name: &str, email: &str, password: &str) -> Result<()> {
    let req = SignUpRequest {
        name: name.to_string(),
        email: email.to_string(),
        password: password.to_string(),
        confirm_password: None,
    };
    let session = ctx.state.auth.sign_up(&req).await?;

    println!("✅ Account created for {}", session.user.email);
    println!("   User ID: {}", session.user.id);
    println!("   Provider: {}", ctx.state.auth.provider_name());
    Ok(())
}

pub async fn cmd_signin(ctx: &Context, email: &str, password: &str) -> Result<()> {
    let req = SignInRequest {
        email: email.to_string(),
        password: password.to_string(),
        remember_me: true,
    };
    let session = ctx.state.auth.sign_in(&req).await?;

    println!("✅ Signed in as {} ({})", session.user.name, session.user.email);
    Ok(())
}

pub async fn cmd_signout(ctx: &Context) -> Result<()> {
    let Some(token) = &ctx.current.token else {
        println!("Not signed in.");
        return Ok(());
    };
    ctx.state.auth.sign_out(token).await?;
    println!("👋 Signed out {}", ctx.current.user.email);
    Ok(())
}

pub async fn cmd_reset_password(ctx: &Context, email: &str) -> Result<()> {
    let outcome = ctx.state.auth.reset_password(email).await?;

    println!("📧 {}", outcome.message);
    if let Some(temporary) = outcome.temporary_password {
        println!("   Temporary password: {}", temporary);
    }
    Ok(())
}
