//! Profile, investment and goal commands

use anyhow::{anyhow, Context as _, Result};
use chrono::{NaiveDate, Utc};
use wealthwise_core::format;
use wealthwise_core::{
    Achievement, GoalCategory, GoalPriority, GoalUpdate, InvestmentHorizon, InvestmentType,
    InvestmentUpdate, NewGoal, NewInvestment, Profile, RiskTolerance,
};
use wealthwise_server::Saved;

use super::{app_err, truncate, Context, Output};

/// Flags for `profile set`
pub struct ProfileArgs {
    pub name: String,
    pub email: String,
    pub age: u32,
    pub income: f64,
    pub savings: f64,
    pub expenses: f64,
    pub current_savings: f64,
    pub risk: String,
    pub horizon: String,
}

/// Build a profile from flags. The email defaults to the signed-in user's.
pub fn build_profile(ctx: &Context, args: ProfileArgs) -> Result<Profile> {
    let risk_tolerance: RiskTolerance = args.risk.parse().map_err(|e: String| anyhow!(e))?;
    let investment_horizon: InvestmentHorizon =
        args.horizon.parse().map_err(|e: String| anyhow!(e))?;
    let email = if args.email.is_empty() {
        ctx.current.user.email.clone()
    } else {
        args.email
    };

    Ok(Profile {
        name: args.name,
        email,
        age: args.age,
        monthly_income: args.income,
        monthly_savings: args.savings,
        monthly_expenses: args.expenses,
        current_savings: args.current_savings,
        risk_tolerance,
        investment_horizon,
        goals: Vec::new(),
    })
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("Invalid date: {} (expected YYYY-MM-DD)", s))
}

fn print_unlocked(unlocked: &[Achievement]) {
    for a in unlocked {
        println!("   🏆 Achievement unlocked: {} {} - {}", a.icon, a.name, a.description);
    }
}

fn print_saved<T>(saved: &Saved<T>) {
    print_unlocked(&saved.unlocked);
    if saved.storage.degraded {
        println!("   ⚠️  Hosted backend unavailable - saved locally, run `wealthwise reconcile` later");
    }
}

// ========== Profile ==========

pub async fn cmd_profile_show(ctx: &Context, out: Output) -> Result<()> {
    let data = ctx.state.storage.load(&ctx.current.owner).await?;
    if out.json(&data.profile)? {
        return Ok(());
    }

    let Some(p) = data.profile else {
        println!("No profile yet. Create one with: wealthwise profile set --name NAME --age AGE --income N --savings N --expenses N");
        return Ok(());
    };

    println!("👤 {} (age {})", p.name, p.age);
    if !p.email.is_empty() {
        println!("   Email:            {}", p.email);
    }
    println!("   Monthly income:   ${}", format::amount(p.monthly_income));
    println!("   Monthly savings:  ${}", format::amount(p.monthly_savings));
    println!("   Monthly expenses: ${}", format::amount(p.monthly_expenses));
    println!("   Current savings:  ${}", format::amount(p.current_savings));
    println!("   Risk tolerance:   {}", p.risk_tolerance);
    println!("   Horizon:          {}", p.investment_horizon);
    Ok(())
}

pub async fn cmd_profile_set(ctx: &Context, profile: Profile, out: Output) -> Result<()> {
    let saved = ctx
        .state
        .update(&ctx.current, move |data| {
            data.set_profile(profile.clone())?;
            Ok(profile)
        })
        .await
        .map_err(app_err)?;
    if out.json(&saved)? {
        return Ok(());
    }

    println!("✅ Profile saved for {}", saved.data.name);
    println!("   Savings rate: {:.1}%", saved.data.savings_rate());
    print_saved(&saved);
    Ok(())
}

// ========== Investments ==========

pub async fn cmd_investments_list(ctx: &Context, out: Output) -> Result<()> {
    let data = ctx.state.storage.load(&ctx.current.owner).await?;
    if out.json(&data.investments)? {
        return Ok(());
    }

    if data.investments.is_empty() {
        println!("No investments yet. Add one with: wealthwise investments add --name NAME --amount N");
        return Ok(());
    }

    println!("💼 Investments");
    println!();
    println!(
        "{:<24} {:<26} {:<12} {:>12} {:>12} {:>8}",
        "ID", "Name", "Type", "Invested", "Value", "Return"
    );
    println!("{}", "-".repeat(99));
    for inv in &data.investments {
        println!(
            "{:<24} {:<26} {:<12} {:>12} {:>12} {:>7.1}%",
            inv.id,
            truncate(&inv.name, 26),
            inv.kind.as_str(),
            format!("${}", format::whole(inv.amount)),
            format!("${}", format::whole(inv.current_value)),
            inv.return_percent()
        );
    }
    println!();
    println!("Total value: ${}", format::whole(data.total_invested()));
    Ok(())
}

pub async fn cmd_investments_add(
    ctx: &Context,
    name: &str,
    kind: &str,
    amount: f64,
    value: Option<f64>,
    date: Option<&str>,
    out: Output,
) -> Result<()> {
    let kind: InvestmentType = kind.parse().map_err(|e: String| anyhow!(e))?;
    let purchase_date = date.map(parse_date).transpose()?;
    let new = NewInvestment {
        name: name.to_string(),
        kind,
        amount,
        current_value: value.unwrap_or(amount),
        purchase_date,
    };

    let saved = ctx
        .state
        .update(&ctx.current, |data| data.add_investment(new, Utc::now()).cloned())
        .await
        .map_err(app_err)?;
    if out.json(&saved)? {
        return Ok(());
    }

    println!("✅ Added {} ({})", saved.data.name, saved.data.id);
    print_saved(&saved);
    Ok(())
}

pub async fn cmd_investments_value(ctx: &Context, id: &str, value: f64, out: Output) -> Result<()> {
    let update = InvestmentUpdate {
        current_value: Some(value),
        ..Default::default()
    };
    let saved = ctx
        .state
        .update(&ctx.current, |data| data.update_investment(id, update).cloned())
        .await
        .map_err(app_err)?;
    if out.json(&saved)? {
        return Ok(());
    }

    println!(
        "✅ {} is now worth ${} ({:+.1}%)",
        saved.data.name,
        format::amount(saved.data.current_value),
        saved.data.return_percent()
    );
    print_saved(&saved);
    Ok(())
}

pub async fn cmd_investments_remove(ctx: &Context, id: &str) -> Result<()> {
    ctx.state
        .update(&ctx.current, |data| data.delete_investment(id))
        .await
        .map_err(app_err)?;
    println!("🗑️  Removed investment {}", id);
    Ok(())
}

// ========== Goals ==========

pub async fn cmd_goals_list(ctx: &Context, out: Output) -> Result<()> {
    let data = ctx.state.storage.load(&ctx.current.owner).await?;
    if out.json(&data.goals)? {
        return Ok(());
    }

    if data.goals.is_empty() {
        println!("No goals yet. Add one with: wealthwise goals add --name NAME --target N --deadline YYYY-MM-DD");
        return Ok(());
    }

    println!("🎯 Goals");
    println!();
    for goal in &data.goals {
        let status = if goal.is_complete() { "✅" } else { "⏳" };
        println!(
            "{} {} [{}] {} / {} ({:.0}%) by {}",
            status,
            goal.name,
            goal.id,
            format!("${}", format::whole(goal.current_amount)),
            format!("${}", format::whole(goal.target_amount)),
            goal.progress_percent(),
            format::short_date(goal.deadline)
        );
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub async fn cmd_goals_add(
    ctx: &Context,
    name: &str,
    target: f64,
    current: f64,
    deadline: &str,
    category: &str,
    priority: &str,
    out: Output,
) -> Result<()> {
    let new = NewGoal {
        name: name.to_string(),
        target_amount: target,
        current_amount: current,
        deadline: parse_date(deadline)?,
        category: category.parse::<GoalCategory>().map_err(|e| anyhow!(e))?,
        priority: priority.parse::<GoalPriority>().map_err(|e| anyhow!(e))?,
    };

    let saved = ctx
        .state
        .update(&ctx.current, |data| data.add_goal(new, Utc::now()).cloned())
        .await
        .map_err(app_err)?;
    if out.json(&saved)? {
        return Ok(());
    }

    println!("✅ Added goal {} ({})", saved.data.name, saved.data.id);
    print_saved(&saved);
    Ok(())
}

pub async fn cmd_goals_progress(ctx: &Context, id: &str, amount: f64, out: Output) -> Result<()> {
    let update = GoalUpdate {
        current_amount: Some(amount),
        ..Default::default()
    };
    let saved = ctx
        .state
        .update(&ctx.current, |data| data.update_goal(id, update).cloned())
        .await
        .map_err(app_err)?;
    if out.json(&saved)? {
        return Ok(());
    }

    println!(
        "✅ {}: ${} of ${} ({:.0}%)",
        saved.data.name,
        format::whole(saved.data.current_amount),
        format::whole(saved.data.target_amount),
        saved.data.progress_percent()
    );
    if saved.data.is_complete() {
        println!("   🎉 Goal reached!");
    }
    print_saved(&saved);
    Ok(())
}

pub async fn cmd_goals_remove(ctx: &Context, id: &str) -> Result<()> {
    ctx.state
        .update(&ctx.current, |data| data.delete_goal(id))
        .await
        .map_err(app_err)?;
    println!("🗑️  Removed goal {}", id);
    Ok(())
}
