//! Presentation summaries derived from a user's snapshot

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::health::{self, HealthScore, EMERGENCY_TARGET_MONTHS};
use crate::models::{InvestmentType, RiskTolerance, UserData};

/// Savings rate (percent) that fills the savings-rate bar
pub const SAVINGS_RATE_BAR_TARGET: f64 = 30.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub has_profile: bool,
    pub net_worth: f64,
    pub total_invested: f64,
    pub monthly_savings: f64,
    pub savings_rate: f64,
    pub emergency_months: f64,
    /// 0..=100
    pub emergency_bar: f64,
    /// 0..=100
    pub savings_rate_bar: f64,
    pub health: HealthScore,
    pub portfolio: PortfolioSummary,
    pub goals: Vec<GoalProgress>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub total_value: f64,
    pub total_invested: f64,
    pub total_returns: f64,
    pub return_percent: f64,
    /// Current value per type, keyed by the type's wire name
    pub allocation: BTreeMap<String, f64>,
    pub holdings: Vec<HoldingSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingSummary {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: InvestmentType,
    pub current_value: f64,
    pub returns: f64,
    pub return_percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalProgress {
    pub id: String,
    pub name: String,
    pub current_amount: f64,
    pub target_amount: f64,
    /// Uncapped
    pub progress: f64,
    /// Capped at 100 for progress bars
    pub display_progress: f64,
    pub complete: bool,
    pub deadline: NaiveDate,
    /// Negative once the deadline has passed
    pub days_left: i64,
}

/// A canned holding suggestion tuned to risk tolerance
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub risk: &'static str,
    pub expected_return: &'static str,
    pub reason: &'static str,
}

pub fn summarize(data: &UserData, today: NaiveDate) -> Dashboard {
    let total_invested = data.total_invested();
    let profile = data.profile.as_ref();

    let current_savings = profile.map_or(0.0, |p| p.current_savings);
    let savings_rate = profile.map_or(0.0, |p| p.savings_rate());
    let emergency_months = profile.map_or(0.0, |p| p.emergency_months());

    Dashboard {
        has_profile: profile.is_some(),
        net_worth: current_savings + total_invested,
        total_invested,
        monthly_savings: profile.map_or(0.0, |p| p.monthly_savings),
        savings_rate,
        emergency_months,
        emergency_bar: bar(emergency_months / EMERGENCY_TARGET_MONTHS * 100.0),
        savings_rate_bar: bar(savings_rate / SAVINGS_RATE_BAR_TARGET * 100.0),
        health: health::calculate(profile, total_invested, &data.goals),
        portfolio: portfolio_summary(data),
        goals: goal_progress(data, today),
    }
}

pub fn portfolio_summary(data: &UserData) -> PortfolioSummary {
    let total_value = data.total_invested();
    let total_invested = data.total_contributed();
    let total_returns = total_value - total_invested;
    let return_percent = if total_invested > 0.0 {
        total_returns / total_invested * 100.0
    } else {
        0.0
    };

    let mut allocation = BTreeMap::new();
    for inv in &data.investments {
        *allocation.entry(inv.kind.as_str().to_string()).or_insert(0.0) += inv.current_value;
    }

    PortfolioSummary {
        total_value,
        total_invested,
        total_returns,
        return_percent,
        allocation,
        holdings: data
            .investments
            .iter()
            .map(|inv| HoldingSummary {
                id: inv.id.clone(),
                name: inv.name.clone(),
                kind: inv.kind,
                current_value: inv.current_value,
                returns: inv.returns,
                return_percent: inv.return_percent(),
            })
            .collect(),
    }
}

pub fn goal_progress(data: &UserData, today: NaiveDate) -> Vec<GoalProgress> {
    data.goals
        .iter()
        .map(|g| {
            let progress = g.progress_percent();
            GoalProgress {
                id: g.id.clone(),
                name: g.name.clone(),
                current_amount: g.current_amount,
                target_amount: g.target_amount,
                progress,
                display_progress: bar(progress),
                complete: g.is_complete(),
                deadline: g.deadline,
                days_left: (g.deadline - today).num_days(),
            }
        })
        .collect()
}

/// Three holding suggestions for a risk tolerance
pub fn suggestions(risk: RiskTolerance) -> Vec<Suggestion> {
    let aggressive = risk == RiskTolerance::Aggressive;
    vec![
        Suggestion {
            name: "S&P 500 Index Fund",
            kind: "ETF",
            risk: "Moderate",
            expected_return: "8-10%",
            reason: if risk == RiskTolerance::Conservative {
                "Core holding for steady growth"
            } else {
                "Foundation of any portfolio"
            },
        },
        if aggressive {
            Suggestion {
                name: "Growth Tech ETF",
                kind: "ETF",
                risk: "High",
                expected_return: "12-15%",
                reason: "High growth potential",
            }
        } else {
            Suggestion {
                name: "Total Bond Market",
                kind: "Bonds",
                risk: "Low",
                expected_return: "4-5%",
                reason: "Stability and income",
            }
        },
        Suggestion {
            name: "Real Estate Investment Trust",
            kind: "REIT",
            risk: "Moderate",
            expected_return: "6-8%",
            reason: "Diversification and passive income",
        },
    ]
}

fn bar(percent: f64) -> f64 {
    if percent.is_finite() {
        percent.clamp(0.0, 100.0)
    } else {
        0.0
    }
}
