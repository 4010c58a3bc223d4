//! Financial health score
//!
//! Five sub-scores in 0..=100 and an overall score that is the rounded mean
//! of the rounded sub-scores, so it always agrees with what is displayed.

use serde::{Deserialize, Serialize};

use crate::models::{Goal, Profile};

/// Placeholder until debt tracking exists
pub const DEBT_SCORE: u8 = 80;

/// Score used for the goals component when no goals are set
pub const NO_GOALS_SCORE: u8 = 50;

/// Months of expenses that earn a full emergency score
pub const EMERGENCY_TARGET_MONTHS: f64 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HealthScore {
    pub overall: u8,
    pub savings: u8,
    pub emergency: u8,
    pub debt: u8,
    pub investing: u8,
    pub goals: u8,
}

/// Traffic-light bucket for the overall score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grade {
    Good,
    Fair,
    Poor,
}

impl Grade {
    pub fn marker(&self) -> &'static str {
        match self {
            Self::Good => "🟢",
            Self::Fair => "🟡",
            Self::Poor => "🔴",
        }
    }
}

impl HealthScore {
    pub fn grade(&self) -> Grade {
        if self.overall >= 70 {
            Grade::Good
        } else if self.overall >= 50 {
            Grade::Fair
        } else {
            Grade::Poor
        }
    }
}

/// Compute the health score. `total_invested` is the sum of current values.
pub fn calculate(profile: Option<&Profile>, total_invested: f64, goals: &[Goal]) -> HealthScore {
    let Some(profile) = profile else {
        return HealthScore::default();
    };

    let savings = clamp_score(profile.savings_rate() * 5.0);
    let emergency =
        clamp_score(profile.emergency_months() / EMERGENCY_TARGET_MONTHS * 100.0);

    let annual_income = profile.monthly_income * 12.0;
    let investing = if annual_income > 0.0 {
        clamp_score(total_invested / annual_income * 100.0)
    } else {
        0
    };

    let goals_score = if goals.is_empty() {
        NO_GOALS_SCORE
    } else {
        let completed = goals.iter().filter(|g| g.is_complete()).count();
        clamp_score(completed as f64 / goals.len() as f64 * 100.0)
    };

    let parts = [savings, emergency, DEBT_SCORE, investing, goals_score];
    let sum: u32 = parts.iter().map(|&p| u32::from(p)).sum();
    let overall = (f64::from(sum) / parts.len() as f64).round() as u8;

    HealthScore {
        overall,
        savings,
        emergency,
        debt: DEBT_SCORE,
        investing,
        goals: goals_score,
    }
}

/// Round into 0..=100; anything non-finite counts as 0
fn clamp_score(raw: f64) -> u8 {
    if !raw.is_finite() {
        return 0;
    }
    raw.round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GoalCategory, GoalPriority, InvestmentHorizon, RiskTolerance};
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn profile(income: f64, savings: f64, expenses: f64, current: f64) -> Profile {
        Profile {
            name: "Sam Rivera".to_string(),
            email: "sam@example.com".to_string(),
            age: 30,
            monthly_income: income,
            monthly_savings: savings,
            monthly_expenses: expenses,
            current_savings: current,
            risk_tolerance: RiskTolerance::Moderate,
            investment_horizon: InvestmentHorizon::Long,
            goals: vec![],
        }
    }

    fn goal(target: f64, current: f64) -> Goal {
        Goal {
            id: format!("goal_{}", target),
            name: "Goal".to_string(),
            target_amount: target,
            current_amount: current,
            deadline: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            category: GoalCategory::Other,
            priority: GoalPriority::Medium,
        }
    }

    #[test]
    fn test_no_profile_is_all_zero() {
        assert_eq!(calculate(None, 50_000.0, &[]), HealthScore::default());
    }

    #[test]
    fn test_reference_profile() {
        // 20% savings rate, 4 months of expenses, 36k invested on 72k income
        let p = profile(6000.0, 1200.0, 3500.0, 14000.0);
        let score = calculate(Some(&p), 36_000.0, &[goal(1000.0, 1000.0), goal(1000.0, 10.0)]);
        assert_eq!(score.savings, 100);
        assert_eq!(score.emergency, 67);
        assert_eq!(score.debt, 80);
        assert_eq!(score.investing, 50);
        assert_eq!(score.goals, 50);
        // (100 + 67 + 80 + 50 + 50) / 5 = 69.4
        assert_eq!(score.overall, 69);
        assert_eq!(score.grade(), Grade::Fair);
    }

    #[test]
    fn test_zero_income_is_finite() {
        let p = profile(0.0, 0.0, 0.0, 0.0);
        let score = calculate(Some(&p), 10_000.0, &[]);
        assert_eq!(score.savings, 0);
        assert_eq!(score.investing, 0);
        assert_eq!(score.emergency, 0);
        assert_eq!(score.goals, NO_GOALS_SCORE);
    }

    #[test]
    fn test_over_target_goal_counts_as_complete() {
        let p = profile(5000.0, 500.0, 2000.0, 1000.0);
        let score = calculate(Some(&p), 0.0, &[goal(500.0, 900.0)]);
        assert_eq!(score.goals, 100);
    }

    #[test]
    fn test_grade_buckets() {
        let mut s = HealthScore { overall: 70, ..Default::default() };
        assert_eq!(s.grade(), Grade::Good);
        s.overall = 50;
        assert_eq!(s.grade(), Grade::Fair);
        s.overall = 49;
        assert_eq!(s.grade(), Grade::Poor);
        assert_eq!(Grade::Poor.marker(), "🔴");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_overall_is_rounded_mean_of_parts(
            income in 0.0f64..50_000.0,
            savings in 0.0f64..20_000.0,
            expenses in 0.0f64..20_000.0,
            current in 0.0f64..500_000.0,
            invested in 0.0f64..2_000_000.0,
            done in 0usize..4,
            open in 0usize..4,
        ) {
            let p = profile(income, savings, expenses, current);
            let mut goals: Vec<Goal> = (0..done).map(|_| goal(100.0, 150.0)).collect();
            goals.extend((0..open).map(|_| goal(100.0, 10.0)));

            let s = calculate(Some(&p), invested, &goals);
            let parts = [s.savings, s.emergency, s.debt, s.investing, s.goals];
            for part in parts {
                prop_assert!(part <= 100);
            }
            let mean = parts.iter().map(|&v| f64::from(v)).sum::<f64>() / 5.0;
            prop_assert_eq!(s.overall, mean.round() as u8);
            prop_assert!(s.overall <= 100);
        }
    }
}
