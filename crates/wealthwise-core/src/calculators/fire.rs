//! FIRE (financial independence, retire early) projector
//!
//! Computes the regular, lean, fat and coast targets for a withdrawal rate,
//! simulates monthly growth until the regular target is reached, and builds
//! a year-by-year projection plus a static withdrawal-rate reference table.

use serde::{Deserialize, Serialize};

use super::{finite, finite_result, non_negative, within};
use crate::error::{Error, Result};
use crate::models::Profile;

/// Simulation stops after this many years even if the target is never reached
pub const MAX_YEARS: u32 = 100;

/// The projection table never runs past this many years
pub const MAX_PROJECTION_YEARS: u32 = 40;

/// Extra years shown in the projection after the target year
pub const PROJECTION_TAIL_YEARS: u32 = 5;

pub const DEFAULT_CURRENT_AGE: u32 = 30;
pub const TRADITIONAL_RETIREMENT_AGE: u32 = 65;

/// Ages and the coast horizon are bounded by this many years
pub const MAX_AGE: u32 = 120;

const LEAN_FACTOR: f64 = 0.6;
const FAT_FACTOR: f64 = 1.5;

/// (withdrawal rate %, horizon label in years)
const SCENARIOS: [(f64, u32); 4] = [(3.0, 50), (3.5, 40), (4.0, 30), (4.5, 25)];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FireInputs {
    pub monthly_expenses: f64,
    pub current_investments: f64,
    pub monthly_investment: f64,
    /// Percent, e.g. 4.0
    pub withdrawal_rate: f64,
    /// Percent nominal annual return
    pub expected_return: f64,
    /// Percent
    pub inflation_rate: f64,
    /// Years until a traditional retirement, the Coast FIRE horizon
    pub years_to_retirement: u32,
    #[serde(default)]
    pub current_age: Option<u32>,
}

impl Default for FireInputs {
    fn default() -> Self {
        Self {
            monthly_expenses: 4_000.0,
            current_investments: 50_000.0,
            monthly_investment: 1_500.0,
            withdrawal_rate: 4.0,
            expected_return: 7.0,
            inflation_rate: 2.5,
            years_to_retirement: 25,
            current_age: None,
        }
    }
}

impl FireInputs {
    /// Starting inputs for the calculator, pre-filled from a profile when one
    /// exists. Zero profile figures fall back to the defaults.
    pub fn for_profile(profile: Option<&Profile>) -> Self {
        let mut inputs = Self::default();
        if let Some(p) = profile {
            if p.monthly_expenses > 0.0 {
                inputs.monthly_expenses = p.monthly_expenses;
            }
            if p.monthly_savings > 0.0 {
                inputs.monthly_investment = p.monthly_savings;
            }
            if p.age > 0 {
                inputs.years_to_retirement = TRADITIONAL_RETIREMENT_AGE.saturating_sub(p.age);
                inputs.current_age = Some(p.age);
            }
        }
        inputs
    }

    fn validate(&self) -> Result<()> {
        non_negative("monthlyExpenses", self.monthly_expenses)?;
        non_negative("currentInvestments", self.current_investments)?;
        non_negative("monthlyInvestment", self.monthly_investment)?;
        finite("expectedReturn", self.expected_return)?;
        finite("inflationRate", self.inflation_rate)?;
        if !(self.withdrawal_rate.is_finite() && self.withdrawal_rate > 0.0) {
            return Err(Error::InvalidInput(
                "withdrawalRate must be greater than zero".to_string(),
            ));
        }
        within("yearsToRetirement", self.years_to_retirement, 0, MAX_AGE)?;
        if let Some(age) = self.current_age {
            within("currentAge", age, 1, MAX_AGE - 1)?;
        }
        Ok(())
    }
}

/// Required capital for a given withdrawal rate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FireScenario {
    pub withdrawal_rate: f64,
    pub horizon_years: u32,
    pub required: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearProjection {
    pub year: u32,
    /// Whole currency units
    pub amount: f64,
    pub reached_fire: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FireProjection {
    pub annual_expenses: f64,
    pub fire_number: f64,
    pub lean_fire_number: f64,
    pub fat_fire_number: f64,
    pub coast_fire_number: f64,
    pub years_to_fire: u32,
    /// False when the simulation hit MAX_YEARS without reaching the target
    pub reachable: bool,
    pub current_age: u32,
    pub fire_age: u32,
    pub monthly_income_at_fire: f64,
    pub progress: f64,
    pub lean_progress: f64,
    pub fat_progress: f64,
    pub scenarios: Vec<FireScenario>,
    pub projections: Vec<YearProjection>,
}

pub fn project(inputs: &FireInputs) -> Result<FireProjection> {
    inputs.validate()?;

    let annual_expenses = finite_result("annualExpenses", inputs.monthly_expenses * 12.0)?;
    let withdrawal = inputs.withdrawal_rate / 100.0;
    let fire_number = finite_result("fireNumber", annual_expenses / withdrawal)?;
    let lean_fire_number = fire_number * LEAN_FACTOR;
    let fat_fire_number = finite_result("fatFireNumber", fire_number * FAT_FACTOR)?;

    let real_return = (inputs.expected_return - inputs.inflation_rate) / 100.0;
    // years_to_retirement is bounded by validate, so the cast is lossless
    let coast_fire_number = finite_result(
        "coastFireNumber",
        fire_number / (1.0 + real_return).powi(inputs.years_to_retirement as i32),
    )?;

    let (years_to_fire, reachable) = years_to_target(
        inputs.current_investments,
        inputs.monthly_investment,
        inputs.expected_return,
        fire_number,
    );

    let current_age = inputs.current_age.unwrap_or(DEFAULT_CURRENT_AGE);

    let projections = yearly_projection(inputs, fire_number, years_to_fire);
    for year in &projections {
        finite_result("projected balance", year.amount)?;
    }

    Ok(FireProjection {
        annual_expenses,
        fire_number,
        lean_fire_number,
        fat_fire_number,
        coast_fire_number,
        years_to_fire,
        reachable,
        current_age,
        fire_age: current_age + years_to_fire,
        monthly_income_at_fire: fire_number * withdrawal / 12.0,
        progress: percent_of(inputs.current_investments, fire_number),
        lean_progress: percent_of(inputs.current_investments, lean_fire_number),
        fat_progress: percent_of(inputs.current_investments, fat_fire_number),
        scenarios: scenarios(fire_number),
        projections,
    })
}

/// Simulate month by month, compounding then contributing, and return the
/// whole number of years (rounded up) needed to reach `target`.
///
/// Months are counted as integers so a target hit exactly at a year boundary
/// never spills into the following year.
fn years_to_target(start: f64, monthly: f64, annual_return: f64, target: f64) -> (u32, bool) {
    let monthly_rate = annual_return / 100.0 / 12.0;
    let max_months = MAX_YEARS * 12;

    let mut balance = start;
    let mut months = 0u32;
    while balance < target && months < max_months {
        balance = balance * (1.0 + monthly_rate) + monthly;
        months += 1;
    }

    (months.div_ceil(12), balance >= target)
}

fn yearly_projection(inputs: &FireInputs, fire_number: f64, years_to_fire: u32) -> Vec<YearProjection> {
    let count = (years_to_fire + PROJECTION_TAIL_YEARS).min(MAX_PROJECTION_YEARS);
    let growth = 1.0 + inputs.expected_return / 100.0;
    let yearly_contribution = inputs.monthly_investment * 12.0;

    let mut balance = inputs.current_investments;
    (1..=count)
        .map(|year| {
            balance = balance * growth + yearly_contribution;
            YearProjection {
                year,
                amount: balance.round(),
                reached_fire: balance >= fire_number,
            }
        })
        .collect()
}

/// Reference table: capital needed at each withdrawal rate, scaled from the
/// 4% target
fn scenarios(fire_number: f64) -> Vec<FireScenario> {
    SCENARIOS
        .iter()
        .map(|&(rate, horizon)| FireScenario {
            withdrawal_rate: rate,
            horizon_years: horizon,
            required: fire_number * 4.0 / rate,
        })
        .collect()
}

fn percent_of(value: f64, target: f64) -> f64 {
    if target > 0.0 {
        value / target * 100.0
    } else {
        0.0
    }
}
