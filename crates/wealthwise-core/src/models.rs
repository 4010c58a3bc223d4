//! Domain models for WealthWise
//!
//! Persisted shapes use camelCase field names so records written by the
//! hosted backend's other clients deserialize unchanged.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The authenticated identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
}

/// A user's financial profile. One per user, replaced wholesale on edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub name: String,
    pub email: String,
    pub age: u32,
    pub monthly_income: f64,
    pub monthly_savings: f64,
    pub monthly_expenses: f64,
    pub current_savings: f64,
    pub risk_tolerance: RiskTolerance,
    pub investment_horizon: InvestmentHorizon,
    /// Free-text goal labels picked during onboarding
    #[serde(default)]
    pub goals: Vec<String>,
}

impl Profile {
    /// Check field ranges before the profile is stored
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation("Name is required".to_string()));
        }
        if self.age == 0 || self.age >= 120 {
            return Err(Error::Validation(format!(
                "Age must be between 1 and 119, got {}",
                self.age
            )));
        }
        let amounts = [
            ("monthlyIncome", self.monthly_income),
            ("monthlySavings", self.monthly_savings),
            ("monthlyExpenses", self.monthly_expenses),
            ("currentSavings", self.current_savings),
        ];
        for (field, value) in amounts {
            check_amount(field, value)?;
        }
        Ok(())
    }

    /// First word of the name, used in greetings
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or("")
    }

    /// Monthly savings as a percentage of income (0 when there is no income)
    pub fn savings_rate(&self) -> f64 {
        if self.monthly_income > 0.0 {
            self.monthly_savings / self.monthly_income * 100.0
        } else {
            0.0
        }
    }

    /// How many months of expenses current savings cover (0 when expenses are 0)
    pub fn emergency_months(&self) -> f64 {
        if self.monthly_expenses > 0.0 {
            self.current_savings / self.monthly_expenses
        } else {
            0.0
        }
    }
}

/// Reject negative or non-finite money amounts
pub(crate) fn check_amount(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::Validation(format!(
            "{} must be a non-negative number",
            field
        )));
    }
    Ok(())
}

/// Investment figures may go negative (written-down or short holdings) but
/// must still be real numbers
pub(crate) fn check_finite(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(Error::Validation(format!("{} must be a number", field)));
    }
    Ok(())
}

/// Investor risk tolerance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RiskTolerance {
    Conservative,
    #[default]
    Moderate,
    Aggressive,
}

impl RiskTolerance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Conservative => "conservative",
            Self::Moderate => "moderate",
            Self::Aggressive => "aggressive",
        }
    }
}

impl std::str::FromStr for RiskTolerance {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "conservative" => Ok(Self::Conservative),
            "moderate" => Ok(Self::Moderate),
            "aggressive" => Ok(Self::Aggressive),
            _ => Err(format!("Unknown risk tolerance: {}", s)),
        }
    }
}

impl std::fmt::Display for RiskTolerance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Investment horizon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InvestmentHorizon {
    Short,
    Medium,
    #[default]
    Long,
}

impl InvestmentHorizon {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Medium => "medium",
            Self::Long => "long",
        }
    }
}

impl std::str::FromStr for InvestmentHorizon {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "short" => Ok(Self::Short),
            "medium" => Ok(Self::Medium),
            "long" => Ok(Self::Long),
            _ => Err(format!("Unknown investment horizon: {}", s)),
        }
    }
}

impl std::fmt::Display for InvestmentHorizon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single holding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Investment {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: InvestmentType,
    /// Amount originally put in
    pub amount: f64,
    pub current_value: f64,
    /// current_value - amount, recomputed on every create/update
    pub returns: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<NaiveDate>,
}

impl Investment {
    /// Return on this holding as a percentage of the amount put in
    pub fn return_percent(&self) -> f64 {
        if self.amount > 0.0 {
            self.returns / self.amount * 100.0
        } else {
            0.0
        }
    }
}

/// Fields for a new holding (id and returns are assigned)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInvestment {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: InvestmentType,
    pub amount: f64,
    pub current_value: f64,
    #[serde(default)]
    pub purchase_date: Option<NaiveDate>,
}

/// Partial update to a holding; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentUpdate {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<InvestmentType>,
    pub amount: Option<f64>,
    pub current_value: Option<f64>,
    pub purchase_date: Option<NaiveDate>,
}

/// Kinds of holdings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InvestmentType {
    Stocks,
    Bonds,
    Etf,
    Crypto,
    RealEstate,
    MutualFund,
    Savings,
}

impl InvestmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stocks => "stocks",
            Self::Bonds => "bonds",
            Self::Etf => "etf",
            Self::Crypto => "crypto",
            Self::RealEstate => "real-estate",
            Self::MutualFund => "mutual-fund",
            Self::Savings => "savings",
        }
    }
}

impl std::str::FromStr for InvestmentType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stocks" | "stock" => Ok(Self::Stocks),
            "bonds" | "bond" => Ok(Self::Bonds),
            "etf" => Ok(Self::Etf),
            "crypto" => Ok(Self::Crypto),
            "real-estate" | "real_estate" => Ok(Self::RealEstate),
            "mutual-fund" | "mutual_fund" => Ok(Self::MutualFund),
            "savings" => Ok(Self::Savings),
            _ => Err(format!("Unknown investment type: {}", s)),
        }
    }
}

impl std::fmt::Display for InvestmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A savings goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub name: String,
    pub target_amount: f64,
    /// May exceed target_amount once the goal is met
    pub current_amount: f64,
    pub deadline: NaiveDate,
    pub category: GoalCategory,
    pub priority: GoalPriority,
}

impl Goal {
    pub fn is_complete(&self) -> bool {
        self.current_amount >= self.target_amount
    }

    /// Raw progress percentage, uncapped. 0 when the target is not positive.
    pub fn progress_percent(&self) -> f64 {
        if self.target_amount > 0.0 {
            self.current_amount / self.target_amount * 100.0
        } else {
            0.0
        }
    }
}

/// Fields for a new goal
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGoal {
    pub name: String,
    pub target_amount: f64,
    #[serde(default)]
    pub current_amount: f64,
    pub deadline: NaiveDate,
    #[serde(default)]
    pub category: GoalCategory,
    #[serde(default)]
    pub priority: GoalPriority,
}

/// Partial update to a goal
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalUpdate {
    pub name: Option<String>,
    pub target_amount: Option<f64>,
    pub current_amount: Option<f64>,
    pub deadline: Option<NaiveDate>,
    pub category: Option<GoalCategory>,
    pub priority: Option<GoalPriority>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GoalCategory {
    Emergency,
    Retirement,
    House,
    Car,
    Vacation,
    Education,
    #[default]
    Other,
}

impl GoalCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Emergency => "emergency",
            Self::Retirement => "retirement",
            Self::House => "house",
            Self::Car => "car",
            Self::Vacation => "vacation",
            Self::Education => "education",
            Self::Other => "other",
        }
    }
}

impl std::str::FromStr for GoalCategory {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "emergency" => Ok(Self::Emergency),
            "retirement" => Ok(Self::Retirement),
            "house" => Ok(Self::House),
            "car" => Ok(Self::Car),
            "vacation" => Ok(Self::Vacation),
            "education" => Ok(Self::Education),
            "other" => Ok(Self::Other),
            _ => Err(format!("Unknown goal category: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GoalPriority {
    High,
    #[default]
    Medium,
    Low,
}

impl GoalPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl std::str::FromStr for GoalPriority {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(format!("Unknown goal priority: {}", s)),
        }
    }
}

/// An unlocked achievement. The descriptive fields are copied from the
/// catalog at unlock time so stored records are self-contained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub category: String,
    pub unlocked_at: DateTime<Utc>,
}

/// Everything stored for one user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserData {
    #[serde(default)]
    pub profile: Option<Profile>,
    #[serde(default)]
    pub investments: Vec<Investment>,
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub achievements: Vec<Achievement>,
}

/// Top-level views a client can navigate to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    Dashboard,
    Advisor,
    Investments,
    Goals,
    Tools,
    Achievements,
    Profile,
}

impl Tab {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Advisor => "advisor",
            Self::Investments => "investments",
            Self::Goals => "goals",
            Self::Tools => "tools",
            Self::Achievements => "achievements",
            Self::Profile => "profile",
        }
    }
}

impl std::str::FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "dashboard" => Ok(Self::Dashboard),
            "advisor" => Ok(Self::Advisor),
            "investments" => Ok(Self::Investments),
            "goals" => Ok(Self::Goals),
            "tools" => Ok(Self::Tools),
            "achievements" => Ok(Self::Achievements),
            "profile" => Ok(Self::Profile),
            _ => Err(format!("Unknown tab: {}", s)),
        }
    }
}

impl std::fmt::Display for Tab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
