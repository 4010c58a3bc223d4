//! Calculator and advisor commands

use anyhow::Result;
use chrono::{Local, Timelike};
use wealthwise_core::advisor::welcome;
use wealthwise_core::calculators::{budget, compound, fire};
use wealthwise_core::{format, ChatTurn, CompoundInputs, FireInputs};

use super::{Context, Output};

pub fn cmd_compound(principal: f64, monthly: f64, years: u32, rate: f64, out: Output) -> Result<()> {
    let inputs = CompoundInputs {
        principal,
        monthly_contribution: monthly,
        years,
        annual_rate: rate,
    };
    let result = compound::project(&inputs)?;
    if out.json(&result)? {
        return Ok(());
    }

    println!(
        "📈 ${} plus ${}/month for {} years at {}%",
        format::amount(principal),
        format::amount(monthly),
        years,
        format::amount(rate)
    );
    println!();
    println!("  Future value:      ${}", format::whole(result.future_value));
    println!("  Total contributed: ${}", format::whole(result.total_contributed));
    println!("  Interest earned:   ${}", format::whole(result.interest_earned));
    Ok(())
}

/// Flags that replace profile-derived FIRE inputs
#[derive(Debug, Default)]
pub struct FireOverrides {
    pub expenses: Option<f64>,
    pub investments: Option<f64>,
    pub monthly: Option<f64>,
    pub withdrawal_rate: Option<f64>,
    pub expected_return: Option<f64>,
    pub inflation: Option<f64>,
}

impl FireOverrides {
    fn apply(&self, inputs: &mut FireInputs) {
        if let Some(v) = self.expenses {
            inputs.monthly_expenses = v;
        }
        if let Some(v) = self.investments {
            inputs.current_investments = v;
        }
        if let Some(v) = self.monthly {
            inputs.monthly_investment = v;
        }
        if let Some(v) = self.withdrawal_rate {
            inputs.withdrawal_rate = v;
        }
        if let Some(v) = self.expected_return {
            inputs.expected_return = v;
        }
        if let Some(v) = self.inflation {
            inputs.inflation_rate = v;
        }
    }
}

pub async fn cmd_fire(ctx: &Context, overrides: FireOverrides, out: Output) -> Result<()> {
    let data = ctx.state.storage.load(&ctx.current.owner).await?;
    let mut inputs = FireInputs::for_profile(data.profile.as_ref());
    let invested = data.total_invested();
    if invested > 0.0 {
        inputs.current_investments = invested;
    }
    overrides.apply(&mut inputs);

    let projection = fire::project(&inputs)?;
    if out.json(&projection)? {
        return Ok(());
    }

    println!("🔥 FIRE projection");
    println!();
    println!("  FIRE number:       ${}", format::whole(projection.fire_number));
    println!("  Lean FIRE:         ${}", format::whole(projection.lean_fire_number));
    println!("  Fat FIRE:          ${}", format::whole(projection.fat_fire_number));
    println!("  Coast FIRE:        ${}", format::whole(projection.coast_fire_number));
    println!("  Progress:          {:.1}%", projection.progress);
    println!();
    if projection.reachable {
        println!(
            "  🎯 Financial independence in {} years, at age {}",
            projection.years_to_fire, projection.fire_age
        );
        println!(
            "     Monthly income at FIRE: ${}",
            format::whole(projection.monthly_income_at_fire)
        );
    } else {
        println!(
            "  ⚠️  Not reached within {} years at this rate - try investing more each month",
            projection.years_to_fire
        );
    }

    println!();
    println!("  Withdrawal rate scenarios:");
    for s in &projection.scenarios {
        println!(
            "    {:>4}%  ${:>14}  lasts ~{} years",
            format::amount(s.withdrawal_rate),
            format::whole(s.required),
            s.horizon_years
        );
    }
    Ok(())
}

pub async fn cmd_budget(ctx: &Context, income: Option<f64>, out: Output) -> Result<()> {
    let income = match income {
        Some(income) => income,
        None => ctx
            .state
            .storage
            .load(&ctx.current.owner)
            .await?
            .profile
            .map(|p| p.monthly_income)
            .unwrap_or_default(),
    };
    let split = budget::split(income)?;
    if out.json(&split)? {
        return Ok(());
    }

    println!("💵 50/30/20 budget for ${}/month", format::whole(split.monthly_income));
    println!();
    println!("  Needs (50%):   ${}", format::whole(split.needs));
    println!("  Wants (30%):   ${}", format::whole(split.wants));
    println!("  Savings (20%): ${}", format::whole(split.savings));
    Ok(())
}

fn print_turn(turn: &ChatTurn) {
    println!("🤖 {}", turn.content);
    if !turn.actions.is_empty() {
        println!();
        for action in &turn.actions {
            println!("   • {} → wealthwise ask {}", action.label, action.action);
        }
    }
}

/// One advisor exchange. With no message, prints the greeting.
pub async fn cmd_ask(ctx: &Context, message: &str, out: Output) -> Result<()> {
    let data = ctx.state.storage.load(&ctx.current.owner).await?;

    let turn = if message.trim().is_empty() {
        welcome(data.profile.as_ref(), Local::now().hour())
    } else {
        ctx.state.advisor.respond(&data, message)
    };
    if out.json(&turn)? {
        return Ok(());
    }

    print_turn(&turn);
    Ok(())
}
