//! 50/30/20 budget split

use serde::{Deserialize, Serialize};

use super::non_negative;
use crate::error::Result;

/// Whole-currency allocation of monthly income
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetSplit {
    pub monthly_income: f64,
    /// Housing, utilities, groceries
    pub needs: f64,
    /// Entertainment, dining, hobbies
    pub wants: f64,
    /// Investments, emergency fund
    pub savings: f64,
}

pub fn split(monthly_income: f64) -> Result<BudgetSplit> {
    let income = non_negative("monthlyIncome", monthly_income)?;
    Ok(BudgetSplit {
        monthly_income: income,
        needs: (income * 0.5).round(),
        wants: (income * 0.3).round(),
        savings: (income * 0.2).round(),
    })
}
