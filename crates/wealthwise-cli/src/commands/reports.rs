//! Dashboard, health score and achievement commands

use anyhow::Result;
use chrono::Local;
use wealthwise_core::achievements::catalog_status;
use wealthwise_core::{dashboard, format, health};

use super::{bar, Context, Output};

pub async fn cmd_dashboard(ctx: &Context, out: Output) -> Result<()> {
    let data = ctx.state.storage.load(&ctx.current.owner).await?;
    let summary = dashboard::summarize(&data, Local::now().date_naive());
    if out.json(&summary)? {
        return Ok(());
    }

    println!("📊 WealthWise Dashboard");
    println!("═══════════════════════");
    if !summary.has_profile {
        println!();
        println!("Set up your profile to see savings and health figures:");
        println!("  wealthwise profile set --name NAME --age AGE --income N --savings N --expenses N");
    }
    println!();
    println!("  Net worth:        ${}", format::whole(summary.net_worth));
    println!("  Total invested:   ${}", format::whole(summary.total_invested));
    println!("  Monthly savings:  ${}", format::whole(summary.monthly_savings));
    println!(
        "  Savings rate:     {:>5.1}%  {}",
        summary.savings_rate,
        bar(summary.savings_rate_bar, 20)
    );
    println!(
        "  Emergency fund:   {:>5.1} mo {}",
        summary.emergency_months,
        bar(summary.emergency_bar, 20)
    );
    println!(
        "  Health score:     {} {}/100",
        summary.health.grade().marker(),
        summary.health.overall
    );

    let portfolio = &summary.portfolio;
    if !portfolio.holdings.is_empty() {
        println!();
        println!("💼 Portfolio");
        println!(
            "  Value ${} | Returns ${} ({:+.1}%)",
            format::whole(portfolio.total_value),
            format::whole(portfolio.total_returns),
            portfolio.return_percent
        );
        for (kind, value) in &portfolio.allocation {
            let share = if portfolio.total_value > 0.0 {
                value / portfolio.total_value * 100.0
            } else {
                0.0
            };
            println!("  {:<12} {:>5.1}%  ${}", kind, share, format::whole(*value));
        }
    }

    if !summary.goals.is_empty() {
        println!();
        println!("🎯 Goals");
        for goal in &summary.goals {
            let when = if goal.complete {
                "done".to_string()
            } else if goal.days_left < 0 {
                "overdue".to_string()
            } else {
                format!("{} days left", goal.days_left)
            };
            println!(
                "  {:<24} {} {:>3.0}%  {}",
                super::truncate(&goal.name, 24),
                bar(goal.display_progress, 20),
                goal.progress,
                when
            );
        }
    }

    Ok(())
}

pub async fn cmd_health(ctx: &Context, out: Output) -> Result<()> {
    let data = ctx.state.storage.load(&ctx.current.owner).await?;
    let score = health::calculate(data.profile.as_ref(), data.total_invested(), &data.goals);
    if out.json(&score)? {
        return Ok(());
    }

    if data.profile.is_none() {
        println!("No profile yet - the health score needs your income and expenses.");
        return Ok(());
    }

    println!("{} Financial health: {}/100", score.grade().marker(), score.overall);
    println!();
    let parts = [
        ("Savings", score.savings),
        ("Emergency fund", score.emergency),
        ("Debt", score.debt),
        ("Investing", score.investing),
        ("Goals", score.goals),
    ];
    for (label, value) in parts {
        println!("  {:<16} {} {:>3}", label, bar(f64::from(value), 20), value);
    }
    Ok(())
}

pub async fn cmd_achievements(ctx: &Context, out: Output) -> Result<()> {
    let data = ctx.state.storage.load(&ctx.current.owner).await?;
    let catalog = catalog_status(&data.achievements);
    if out.json(&catalog)? {
        return Ok(());
    }

    let unlocked = catalog.iter().filter(|a| a.unlocked).count();
    println!("🏆 Achievements ({}/{})", unlocked, catalog.len());
    println!();
    for a in &catalog {
        match a.unlocked_at {
            Some(at) => println!(
                "  {} {:<22} {} (unlocked {})",
                a.icon,
                a.name,
                a.description,
                format::short_date(at.date_naive())
            ),
            None => println!("  🔒 {:<22} {}", a.name, a.description),
        }
    }
    Ok(())
}
