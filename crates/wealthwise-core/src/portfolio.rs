//! Mutations on a user's snapshot: profile, holdings and goals
//!
//! Callers pass the current time in so ids and tests stay deterministic.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{
    check_amount, check_finite, Goal, GoalUpdate, Investment, InvestmentUpdate, NewGoal, NewInvestment, Profile,
    UserData,
};

impl UserData {
    /// Sum of current values across holdings
    pub fn total_invested(&self) -> f64 {
        self.investments.iter().map(|i| i.current_value).sum()
    }

    /// Sum of amounts originally put in
    pub fn total_contributed(&self) -> f64 {
        self.investments.iter().map(|i| i.amount).sum()
    }

    /// Replace the profile wholesale
    pub fn set_profile(&mut self, profile: Profile) -> Result<()> {
        profile.validate()?;
        self.profile = Some(profile);
        Ok(())
    }

    pub fn investment(&self, id: &str) -> Option<&Investment> {
        self.investments.iter().find(|i| i.id == id)
    }

    pub fn add_investment(&mut self, new: NewInvestment, now: DateTime<Utc>) -> Result<&Investment> {
        require_name(&new.name)?;
        check_finite("amount", new.amount)?;
        check_finite("currentValue", new.current_value)?;

        let id = unique_id("inv", now, |candidate| self.investment(candidate).is_some());
        debug!(id = %id, name = %new.name, "Adding investment");
        self.investments.push(Investment {
            id,
            name: new.name.trim().to_string(),
            kind: new.kind,
            amount: new.amount,
            current_value: new.current_value,
            returns: new.current_value - new.amount,
            purchase_date: new.purchase_date,
        });
        Ok(&self.investments[self.investments.len() - 1])
    }

    /// Merge the provided fields into an existing holding
    pub fn update_investment(&mut self, id: &str, update: InvestmentUpdate) -> Result<&Investment> {
        if let Some(name) = &update.name {
            require_name(name)?;
        }
        if let Some(amount) = update.amount {
            check_finite("amount", amount)?;
        }
        if let Some(value) = update.current_value {
            check_finite("currentValue", value)?;
        }

        let inv = self
            .investments
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| Error::NotFound(format!("Investment {}", id)))?;

        if let Some(name) = update.name {
            inv.name = name.trim().to_string();
        }
        if let Some(kind) = update.kind {
            inv.kind = kind;
        }
        if let Some(amount) = update.amount {
            inv.amount = amount;
        }
        if let Some(value) = update.current_value {
            inv.current_value = value;
        }
        if update.purchase_date.is_some() {
            inv.purchase_date = update.purchase_date;
        }
        inv.returns = inv.current_value - inv.amount;
        Ok(inv)
    }

    pub fn delete_investment(&mut self, id: &str) -> Result<()> {
        let before = self.investments.len();
        self.investments.retain(|i| i.id != id);
        if self.investments.len() == before {
            return Err(Error::NotFound(format!("Investment {}", id)));
        }
        Ok(())
    }

    pub fn goal(&self, id: &str) -> Option<&Goal> {
        self.goals.iter().find(|g| g.id == id)
    }

    pub fn add_goal(&mut self, new: NewGoal, now: DateTime<Utc>) -> Result<&Goal> {
        require_name(&new.name)?;
        require_target(new.target_amount)?;
        check_amount("currentAmount", new.current_amount)?;

        let id = unique_id("goal", now, |candidate| self.goal(candidate).is_some());
        debug!(id = %id, name = %new.name, "Adding goal");
        self.goals.push(Goal {
            id,
            name: new.name.trim().to_string(),
            target_amount: new.target_amount,
            current_amount: new.current_amount,
            deadline: new.deadline,
            category: new.category,
            priority: new.priority,
        });
        Ok(&self.goals[self.goals.len() - 1])
    }

    pub fn update_goal(&mut self, id: &str, update: GoalUpdate) -> Result<&Goal> {
        if let Some(name) = &update.name {
            require_name(name)?;
        }
        if let Some(target) = update.target_amount {
            require_target(target)?;
        }
        if let Some(current) = update.current_amount {
            check_amount("currentAmount", current)?;
        }

        let goal = self
            .goals
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| Error::NotFound(format!("Goal {}", id)))?;

        if let Some(name) = update.name {
            goal.name = name.trim().to_string();
        }
        if let Some(target) = update.target_amount {
            goal.target_amount = target;
        }
        if let Some(current) = update.current_amount {
            goal.current_amount = current;
        }
        if let Some(deadline) = update.deadline {
            goal.deadline = deadline;
        }
        if let Some(category) = update.category {
            goal.category = category;
        }
        if let Some(priority) = update.priority {
            goal.priority = priority;
        }
        Ok(goal)
    }

    pub fn delete_goal(&mut self, id: &str) -> Result<()> {
        let before = self.goals.len();
        self.goals.retain(|g| g.id != id);
        if self.goals.len() == before {
            return Err(Error::NotFound(format!("Goal {}", id)));
        }
        Ok(())
    }
}

fn require_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::Validation("Name is required".to_string()));
    }
    Ok(())
}

fn require_target(target: f64) -> Result<()> {
    if !target.is_finite() || target <= 0.0 {
        return Err(Error::Validation(
            "targetAmount must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

/// `<prefix>_<millis>`, suffixed with a counter if that id is already taken
fn unique_id(prefix: &str, now: DateTime<Utc>, taken: impl Fn(&str) -> bool) -> String {
    let base = format!("{}_{}", prefix, now.timestamp_millis());
    if !taken(&base) {
        return base;
    }
    (1u32..)
        .map(|n| format!("{}_{}", base, n))
        .find(|candidate| !taken(candidate))
        .unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GoalCategory, GoalPriority, InvestmentType};
    use chrono::{NaiveDate, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_760_000_000_000).unwrap()
    }

    fn new_inv(name: &str, amount: f64, value: f64) -> NewInvestment {
        NewInvestment {
            name: name.to_string(),
            kind: InvestmentType::Stocks,
            amount,
            current_value: value,
            purchase_date: None,
        }
    }

    fn new_goal(target: f64, current: f64) -> NewGoal {
        NewGoal {
            name: "House".to_string(),
            target_amount: target,
            current_amount: current,
            deadline: NaiveDate::from_ymd_opt(2031, 5, 1).unwrap(),
            category: GoalCategory::House,
            priority: GoalPriority::High,
        }
    }

    #[test]
    fn test_add_investment_derives_returns_and_id() {
        let mut data = UserData::default();
        let inv = data.add_investment(new_inv("AAPL", 1000.0, 850.0), now()).unwrap();
        assert_eq!(inv.id, "inv_1760000000000");
        assert_eq!(inv.returns, -150.0);
        assert_eq!(data.total_invested(), 850.0);
        assert_eq!(data.total_contributed(), 1000.0);
    }

    #[test]
    fn test_ids_stay_unique_within_a_millisecond() {
        let mut data = UserData::default();
        data.add_investment(new_inv("A", 1.0, 1.0), now()).unwrap();
        data.add_investment(new_inv("B", 1.0, 1.0), now()).unwrap();
        data.add_investment(new_inv("C", 1.0, 1.0), now()).unwrap();
        let ids: Vec<&str> = data.investments.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["inv_1760000000000", "inv_1760000000000_1", "inv_1760000000000_2"]
        );
    }

    #[test]
    fn test_update_merges_and_recomputes_returns() {
        let mut data = UserData::default();
        let id = data
            .add_investment(new_inv("BTC", 500.0, 500.0), now())
            .unwrap()
            .id
            .clone();
        let updated = data
            .update_investment(
                &id,
                InvestmentUpdate {
                    current_value: Some(1200.0),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.name, "BTC");
        assert_eq!(updated.returns, 700.0);
    }

    #[test]
    fn test_update_unknown_investment() {
        let mut data = UserData::default();
        let err = data
            .update_investment("inv_missing", InvestmentUpdate::default())
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_add_then_delete_restores_list() {
        let mut data = UserData::default();
        data.add_investment(new_inv("VTI", 100.0, 110.0), now()).unwrap();
        let before = data.investments.clone();

        let later = now() + chrono::Duration::milliseconds(5);
        let id = data.add_investment(new_inv("BND", 50.0, 49.0), later).unwrap().id.clone();
        data.delete_investment(&id).unwrap();
        assert_eq!(data.investments, before);
        assert!(data.delete_investment(&id).is_err());
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut data = UserData::default();
        for (i, name) in ["one", "two", "three"].iter().enumerate() {
            let t = now() + chrono::Duration::milliseconds(i as i64);
            data.add_investment(new_inv(name, 1.0, 1.0), t).unwrap();
        }
        let names: Vec<&str> = data.investments.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_negative_investment_values_are_kept() {
        let mut data = UserData::default();
        let inv = data.add_investment(new_inv("Short", -200.0, -350.0), now()).unwrap();
        assert_eq!(inv.returns, -150.0);
        let id = inv.id.clone();

        let updated = data
            .update_investment(
                &id,
                InvestmentUpdate {
                    current_value: Some(-50.0),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.returns, 150.0);
    }

    #[test]
    fn test_validation_errors() {
        let mut data = UserData::default();
        assert!(matches!(
            data.add_investment(new_inv("  ", 1.0, 1.0), now()),
            Err(Error::Validation(_))
        ));
        assert!(data.add_investment(new_inv("X", f64::NAN, 1.0), now()).is_err());
        assert!(data.add_investment(new_inv("X", 1.0, f64::INFINITY), now()).is_err());
        assert!(data.add_goal(new_goal(0.0, 0.0), now()).is_err());
        assert!(data.investments.is_empty());
        assert!(data.goals.is_empty());
    }

    #[test]
    fn test_goal_over_target_is_stored_unclamped() {
        let mut data = UserData::default();
        let id = data.add_goal(new_goal(1000.0, 0.0), now()).unwrap().id.clone();
        assert_eq!(id, "goal_1760000000000");
        let goal = data
            .update_goal(
                &id,
                GoalUpdate {
                    current_amount: Some(2500.0),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(goal.current_amount, 2500.0);
        assert!((goal.progress_percent() - 250.0).abs() < 1e-9);
    }

    #[test]
    fn test_delete_goal() {
        let mut data = UserData::default();
        let id = data.add_goal(new_goal(10.0, 1.0), now()).unwrap().id.clone();
        data.delete_goal(&id).unwrap();
        assert!(data.goals.is_empty());
        assert!(matches!(data.delete_goal(&id), Err(Error::NotFound(_))));
    }
}
