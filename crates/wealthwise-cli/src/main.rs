//! WealthWise CLI - Personal finance tracker
//!
//! Usage:
//!   wealthwise init                      Initialize database
//!   wealthwise profile set --name ...    Create or replace the profile
//!   wealthwise dashboard                 Show the dashboard summary
//!   wealthwise ask "how do I save more"  Ask the advisor
//!   wealthwise serve --port 3000         Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let db_path = cli
        .db
        .clone()
        .unwrap_or_else(wealthwise_core::db::default_db_path);
    let out = commands::Output { json: cli.json };

    match cli.command {
        Commands::Init => commands::cmd_init(&db_path),
        Commands::Serve {
            port,
            host,
            no_auth,
            allowed_origins,
        } => commands::cmd_serve(&db_path, &host, port, no_auth, allowed_origins).await,
        Commands::Signup {
            name,
            email,
            password,
        } => {
            let ctx = commands::connect(&db_path, cli.user.as_deref()).await?;
            commands::cmd_signup(&ctx, &name, &email, &password).await
        }
        Commands::Signin { email, password } => {
            let ctx = commands::connect(&db_path, cli.user.as_deref()).await?;
            commands::cmd_signin(&ctx, &email, &password).await
        }
        Commands::Signout => {
            let ctx = commands::connect(&db_path, cli.user.as_deref()).await?;
            commands::cmd_signout(&ctx).await
        }
        Commands::ResetPassword { email } => {
            let ctx = commands::connect(&db_path, cli.user.as_deref()).await?;
            commands::cmd_reset_password(&ctx, &email).await
        }
        Commands::Profile { action } => {
            let ctx = commands::connect(&db_path, cli.user.as_deref()).await?;
            match action {
                None => commands::cmd_profile_show(&ctx, out).await,
                Some(ProfileAction::Set {
                    name,
                    email,
                    age,
                    income,
                    savings,
                    expenses,
                    current_savings,
                    risk,
                    horizon,
                }) => {
                    let profile = commands::build_profile(
                        &ctx,
                        commands::ProfileArgs {
                            name,
                            email,
                            age,
                            income,
                            savings,
                            expenses,
                            current_savings,
                            risk,
                            horizon,
                        },
                    )?;
                    commands::cmd_profile_set(&ctx, profile, out).await
                }
            }
        }
        Commands::Investments { action } => {
            let ctx = commands::connect(&db_path, cli.user.as_deref()).await?;
            match action {
                None | Some(InvestmentsAction::List) => {
                    commands::cmd_investments_list(&ctx, out).await
                }
                Some(InvestmentsAction::Add {
                    name,
                    kind,
                    amount,
                    value,
                    date,
                }) => {
                    commands::cmd_investments_add(
                        &ctx,
                        &name,
                        &kind,
                        amount,
                        value,
                        date.as_deref(),
                        out,
                    )
                    .await
                }
                Some(InvestmentsAction::Value { id, value }) => {
                    commands::cmd_investments_value(&ctx, &id, value, out).await
                }
                Some(InvestmentsAction::Remove { id }) => {
                    commands::cmd_investments_remove(&ctx, &id).await
                }
            }
        }
        Commands::Goals { action } => {
            let ctx = commands::connect(&db_path, cli.user.as_deref()).await?;
            match action {
                None | Some(GoalsAction::List) => commands::cmd_goals_list(&ctx, out).await,
                Some(GoalsAction::Add {
                    name,
                    target,
                    current,
                    deadline,
                    category,
                    priority,
                }) => {
                    commands::cmd_goals_add(
                        &ctx, &name, target, current, &deadline, &category, &priority, out,
                    )
                    .await
                }
                Some(GoalsAction::Progress { id, amount }) => {
                    commands::cmd_goals_progress(&ctx, &id, amount, out).await
                }
                Some(GoalsAction::Remove { id }) => commands::cmd_goals_remove(&ctx, &id).await,
            }
        }
        Commands::Dashboard => {
            let ctx = commands::connect(&db_path, cli.user.as_deref()).await?;
            commands::cmd_dashboard(&ctx, out).await
        }
        Commands::Health => {
            let ctx = commands::connect(&db_path, cli.user.as_deref()).await?;
            commands::cmd_health(&ctx, out).await
        }
        Commands::Achievements => {
            let ctx = commands::connect(&db_path, cli.user.as_deref()).await?;
            commands::cmd_achievements(&ctx, out).await
        }
        Commands::Compound {
            principal,
            monthly,
            years,
            rate,
        } => commands::cmd_compound(principal, monthly, years, rate, out),
        Commands::Fire {
            expenses,
            investments,
            monthly,
            withdrawal_rate,
            expected_return,
            inflation,
        } => {
            let ctx = commands::connect(&db_path, cli.user.as_deref()).await?;
            let overrides = commands::FireOverrides {
                expenses,
                investments,
                monthly,
                withdrawal_rate,
                expected_return,
                inflation,
            };
            commands::cmd_fire(&ctx, overrides, out).await
        }
        Commands::Budget { income } => {
            let ctx = commands::connect(&db_path, cli.user.as_deref()).await?;
            commands::cmd_budget(&ctx, income, out).await
        }
        Commands::Ask { message } => {
            let ctx = commands::connect(&db_path, cli.user.as_deref()).await?;
            commands::cmd_ask(&ctx, &message.join(" "), out).await
        }
        Commands::Status => {
            let ctx = commands::connect(&db_path, cli.user.as_deref()).await?;
            commands::cmd_status(&ctx, out).await
        }
        Commands::Reconcile => {
            let ctx = commands::connect(&db_path, cli.user.as_deref()).await?;
            commands::cmd_reconcile(&ctx).await
        }
    }
}
