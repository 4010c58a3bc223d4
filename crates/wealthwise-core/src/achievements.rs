//! Achievement catalog and unlock evaluation
//!
//! Unlocks are monotonic: once an id is in the user's list it is never
//! re-evaluated or removed, and an id is never added twice.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::health::EMERGENCY_TARGET_MONTHS;
use crate::models::{Achievement, UserData};

/// Savings rate (percent) that unlocks `saver_20`
pub const SUPER_SAVER_RATE: f64 = 20.0;

/// A fixed catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub category: &'static str,
}

pub const CATALOG: [CatalogEntry; 6] = [
    CatalogEntry {
        id: "first_profile",
        name: "Getting Started",
        description: "Created your financial profile",
        icon: "🎯",
        category: "learning",
    },
    CatalogEntry {
        id: "first_1k",
        name: "First $1,000",
        description: "Invested your first $1,000",
        icon: "💰",
        category: "investing",
    },
    CatalogEntry {
        id: "first_10k",
        name: "Five Figure Investor",
        description: "Total investments reached $10,000",
        icon: "🚀",
        category: "investing",
    },
    CatalogEntry {
        id: "first_goal",
        name: "Goal Setter",
        description: "Set your first financial goal",
        icon: "🎯",
        category: "goals",
    },
    CatalogEntry {
        id: "emergency_fund",
        name: "Safety Net",
        description: "Built 6 months emergency fund",
        icon: "🛡️",
        category: "savings",
    },
    CatalogEntry {
        id: "saver_20",
        name: "Super Saver",
        description: "Achieved 20% savings rate",
        icon: "💪",
        category: "savings",
    },
];

impl CatalogEntry {
    fn unlock(&self, at: DateTime<Utc>) -> Achievement {
        Achievement {
            id: self.id.to_string(),
            name: self.name.to_string(),
            description: self.description.to_string(),
            icon: self.icon.to_string(),
            category: self.category.to_string(),
            unlocked_at: at,
        }
    }

    /// Whether the current state satisfies this entry
    fn is_satisfied(&self, data: &UserData, total_invested: f64) -> bool {
        match self.id {
            "first_profile" => data.profile.is_some(),
            "first_1k" => total_invested >= 1_000.0,
            "first_10k" => total_invested >= 10_000.0,
            "first_goal" => !data.goals.is_empty(),
            "emergency_fund" => data.profile.as_ref().is_some_and(|p| {
                p.monthly_expenses > 0.0 && p.emergency_months() >= EMERGENCY_TARGET_MONTHS
            }),
            "saver_20" => data
                .profile
                .as_ref()
                .is_some_and(|p| p.monthly_income > 0.0 && p.savings_rate() >= SUPER_SAVER_RATE),
            _ => false,
        }
    }
}

pub fn catalog_entry(id: &str) -> Option<&'static CatalogEntry> {
    CATALOG.iter().find(|e| e.id == id)
}

/// Append every newly satisfied achievement, stamped with `now`.
///
/// Returns the ids that were added, so callers can skip a save when nothing
/// changed.
pub fn evaluate(data: &mut UserData, now: DateTime<Utc>) -> Vec<&'static str> {
    let total_invested = data.total_invested();
    let mut added = Vec::new();

    for entry in CATALOG.iter() {
        if data.achievements.iter().any(|a| a.id == entry.id) {
            continue;
        }
        if entry.is_satisfied(data, total_invested) {
            data.achievements.push(entry.unlock(now));
            added.push(entry.id);
        }
    }

    if !added.is_empty() {
        info!(achievements = ?added, "Unlocked achievements");
    }
    added
}

/// One catalog row for the achievements view
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementStatus {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub category: String,
    pub unlocked: bool,
    pub unlocked_at: Option<DateTime<Utc>>,
}

/// The whole catalog with each entry's unlock state
pub fn catalog_status(unlocked: &[Achievement]) -> Vec<AchievementStatus> {
    CATALOG
        .iter()
        .map(|entry| {
            let hit = unlocked.iter().find(|a| a.id == entry.id);
            AchievementStatus {
                id: entry.id.to_string(),
                name: entry.name.to_string(),
                description: entry.description.to_string(),
                icon: entry.icon.to_string(),
                category: entry.category.to_string(),
                unlocked: hit.is_some(),
                unlocked_at: hit.map(|a| a.unlocked_at),
            }
        })
        .collect()
}
