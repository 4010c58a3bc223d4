//! Compound interest with monthly compounding and end-of-month contributions

use serde::{Deserialize, Serialize};

use super::{finite, finite_result, non_negative, within};
use crate::error::Result;

/// Longest projection horizon accepted, in years
pub const MAX_YEARS: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompoundInputs {
    pub principal: f64,
    pub monthly_contribution: f64,
    pub years: u32,
    /// Annual rate in percent, e.g. 7.0
    pub annual_rate: f64,
}

impl Default for CompoundInputs {
    fn default() -> Self {
        Self {
            principal: 10_000.0,
            monthly_contribution: 500.0,
            years: 20,
            annual_rate: 7.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompoundResult {
    pub future_value: f64,
    pub total_contributed: f64,
    pub interest_earned: f64,
}

/// Project the future value.
///
/// A zero rate falls back to linear accumulation instead of dividing by zero.
pub fn project(inputs: &CompoundInputs) -> Result<CompoundResult> {
    let principal = non_negative("principal", inputs.principal)?;
    let monthly = non_negative("monthlyContribution", inputs.monthly_contribution)?;
    let rate = finite("annualRate", inputs.annual_rate)?;
    let years = within("years", inputs.years, 1, MAX_YEARS)?;

    let r = rate / 100.0 / 12.0;
    let n = f64::from(years * 12);

    let future_value = if r == 0.0 {
        principal + monthly * n
    } else {
        let growth = (1.0 + r).powf(n);
        principal * growth + monthly * ((growth - 1.0) / r)
    };
    let future_value = finite_result("futureValue", future_value)?;
    let total_contributed = finite_result("totalContributed", principal + monthly * n)?;

    Ok(CompoundResult {
        future_value,
        total_contributed,
        interest_earned: finite_result("interestEarned", future_value - total_contributed)?,
    })
}
