//! Advisor rules: keyword predicates and canned reply templates

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ChatAction, ChatTurn};
use crate::format::{amount, short_date};
use crate::health::{self, HealthScore};
use crate::models::{Profile, RiskTolerance, UserData};

/// Which canned reply was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    ProfileRequired,
    Analysis,
    Investment,
    Savings,
    Retirement,
    Goals,
    Help,
}

impl Topic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProfileRequired => "profile_required",
            Self::Analysis => "analysis",
            Self::Investment => "investment",
            Self::Savings => "savings",
            Self::Retirement => "retirement",
            Self::Goals => "goals",
            Self::Help => "help",
        }
    }
}

/// Values a reply builder can interpolate
pub struct AdvisorContext<'a> {
    pub profile: &'a Profile,
    pub data: &'a UserData,
    pub health: HealthScore,
    pub total_invested: f64,
}

impl<'a> AdvisorContext<'a> {
    pub fn new(profile: &'a Profile, data: &'a UserData) -> Self {
        let total_invested = data.total_invested();
        Self {
            profile,
            data,
            health: health::calculate(Some(profile), total_invested, &data.goals),
            total_invested,
        }
    }
}

/// A keyword predicate paired with the reply it produces
pub struct AdvisorRule {
    pub topic: Topic,
    /// Matched as case-insensitive substrings of the input
    pub keywords: &'static [&'static str],
    pub build: fn(&AdvisorContext<'_>) -> ChatTurn,
}

impl AdvisorRule {
    fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|k| lowered.contains(k))
    }
}

/// Ordered rule list; the first matching rule answers
pub struct AdvisorEngine {
    rules: Vec<AdvisorRule>,
}

impl Default for AdvisorEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AdvisorEngine {
    /// Engine with the built-in rules in priority order
    pub fn new() -> Self {
        Self {
            rules: vec![
                AdvisorRule {
                    topic: Topic::Analysis,
                    keywords: &["analyze", "overview", "summary", "how am i doing"],
                    build: analysis_reply,
                },
                AdvisorRule {
                    topic: Topic::Investment,
                    keywords: &["invest", "stock", "portfolio"],
                    build: investment_reply,
                },
                AdvisorRule {
                    topic: Topic::Savings,
                    keywords: &["save", "saving", "budget"],
                    build: savings_reply,
                },
                AdvisorRule {
                    topic: Topic::Retirement,
                    keywords: &["retire", "fire", "401k", "ira"],
                    build: retirement_reply,
                },
                AdvisorRule {
                    topic: Topic::Goals,
                    keywords: &["goal"],
                    build: goals_reply,
                },
            ],
        }
    }

    /// Which topic the input would be answered with
    pub fn classify(&self, data: &UserData, input: &str) -> Topic {
        if data.profile.is_none() {
            return Topic::ProfileRequired;
        }
        let lowered = input.to_lowercase();
        self.rules
            .iter()
            .find(|r| r.matches(&lowered))
            .map(|r| r.topic)
            .unwrap_or(Topic::Help)
    }

    pub fn respond(&self, data: &UserData, input: &str) -> ChatTurn {
        let Some(profile) = data.profile.as_ref() else {
            debug!(topic = Topic::ProfileRequired.as_str(), "Advisor reply");
            return profile_required_reply();
        };

        let lowered = input.to_lowercase();
        let ctx = AdvisorContext::new(profile, data);
        match self.rules.iter().find(|r| r.matches(&lowered)) {
            Some(rule) => {
                debug!(topic = rule.topic.as_str(), "Advisor reply");
                (rule.build)(&ctx)
            }
            None => {
                debug!(topic = Topic::Help.as_str(), "Advisor reply");
                help_reply()
            }
        }
    }
}

fn profile_required_reply() -> ChatTurn {
    ChatTurn::assistant(
        "I'd love to help you, but first I need to know more about your financial situation. \
         Please complete your profile so I can give you personalized advice!"
            .to_string(),
        vec![ChatAction::new("Complete Profile", "profile")],
    )
}

fn analysis_reply(ctx: &AdvisorContext<'_>) -> ChatTurn {
    let p = ctx.profile;
    let savings_rate = p.savings_rate();
    let months = p.emergency_months();
    let fund_marker = if months >= 6.0 {
        "✅"
    } else if months >= 3.0 {
        "⚠️"
    } else {
        "❌"
    };

    let mut out = format!("📊 **Financial Analysis for {}**\n\n", p.name);
    out.push_str(&format!(
        "**Health Score: {}/100** {}\n\n",
        ctx.health.overall,
        ctx.health.grade().marker()
    ));
    out.push_str("**Income & Savings:**\n");
    out.push_str(&format!("• Monthly Income: ${}\n", amount(p.monthly_income)));
    out.push_str(&format!(
        "• Monthly Savings: ${} ({:.1}%)\n",
        amount(p.monthly_savings),
        savings_rate
    ));
    out.push_str(&format!("• Current Savings: ${}\n\n", amount(p.current_savings)));
    out.push_str("**Emergency Fund:**\n");
    out.push_str(&format!(
        "• {:.1} months of expenses saved {}\n\n",
        months, fund_marker
    ));
    out.push_str("**Investments:**\n");
    out.push_str(&format!("• Total Invested: ${}\n", amount(ctx.total_invested)));
    out.push_str(&format!(
        "• Number of Holdings: {}\n\n",
        ctx.data.investments.len()
    ));

    if savings_rate < 20.0 {
        out.push_str("💡 **Recommendation:** Try to increase your savings rate to at least 20%.");
    } else if months < 6.0 {
        out.push_str("💡 **Recommendation:** Focus on building your emergency fund to 6 months.");
    } else {
        out.push_str(
            "💡 **Great job!** You're on a solid financial path. Consider increasing investments.",
        );
    }

    ChatTurn::assistant(
        out,
        vec![
            ChatAction::new("View Dashboard", "dashboard"),
            ChatAction::new("Add Investment", "investments"),
        ],
    )
}

fn investment_reply(ctx: &AdvisorContext<'_>) -> ChatTurn {
    let p = ctx.profile;
    let mut out = String::from("📈 **Investment Advice Based on Your Profile**\n\n");
    out.push_str("**Your Profile:**\n");
    out.push_str(&format!("• Risk Tolerance: {}\n", p.risk_tolerance));
    out.push_str(&format!(
        "• Investment Horizon: {}-term\n\n",
        p.investment_horizon
    ));

    let (allocation, picks): ([&str; 3], [&str; 3]) = match p.risk_tolerance {
        RiskTolerance::Conservative => (
            [
                "60% Bonds (Government & Corporate)",
                "30% Index Funds (S&P 500)",
                "10% Cash/Money Market",
            ],
            [
                "Vanguard Total Bond Market ETF (BND)",
                "iShares Core US Aggregate Bond (AGG)",
                "High-Yield Savings Account (4-5% APY)",
            ],
        ),
        RiskTolerance::Moderate => (
            ["60% Stocks (Diversified)", "30% Bonds", "10% REITs/Alternatives"],
            [
                "Vanguard Total Stock Market ETF (VTI)",
                "Schwab US Dividend Equity ETF (SCHD)",
                "Vanguard Real Estate ETF (VNQ)",
            ],
        ),
        RiskTolerance::Aggressive => (
            [
                "80% Stocks (Growth-focused)",
                "15% Crypto/Alternatives",
                "5% Speculative",
            ],
            [
                "Invesco QQQ Trust (QQQ)",
                "ARK Innovation ETF (ARKK)",
                "Bitcoin & Ethereum (5-10% max)",
            ],
        ),
    };

    out.push_str("**Recommended Allocation:**\n");
    for line in allocation {
        out.push_str(&format!("• {}\n", line));
    }
    out.push_str("\n**Suggested Investments:**\n");
    out.push_str(
        &picks
            .iter()
            .map(|pick| format!("• {}", pick))
            .collect::<Vec<_>>()
            .join("\n"),
    );

    ChatTurn::assistant(
        out,
        vec![
            ChatAction::new("Add Investment", "investments"),
            ChatAction::new("Use Calculator", "tools"),
        ],
    )
}

fn savings_reply(ctx: &AdvisorContext<'_>) -> ChatTurn {
    let p = ctx.profile;
    let income = p.monthly_income;
    let disposable = income - p.monthly_expenses;

    let mut out = String::from("💰 **Personalized Savings Tips**\n\n");
    out.push_str("**Your Current Situation:**\n");
    out.push_str(&format!("• Income: ${}/month\n", amount(income)));
    out.push_str(&format!("• Expenses: ${}/month\n", amount(p.monthly_expenses)));
    out.push_str(&format!("• Disposable: ${}/month\n\n", amount(disposable)));
    out.push_str("**50/30/20 Budget for You:**\n");
    out.push_str(&format!("• Needs (50%): ${}\n", amount(income * 0.5)));
    out.push_str(&format!("• Wants (30%): ${}\n", amount(income * 0.3)));
    out.push_str(&format!("• Savings (20%): ${}\n\n", amount(income * 0.2)));
    out.push_str("**Action Items:**\n");
    out.push_str(&format!(
        "1. Automate ${}/month to savings\n",
        amount((income * 0.2).round())
    ));
    out.push_str("2. Review subscriptions - cancel unused ones\n");
    out.push_str("3. Use cashback apps for regular purchases\n");
    out.push_str("4. Cook at home 4+ nights per week");

    ChatTurn::assistant(
        out,
        vec![
            ChatAction::new("Set Savings Goal", "goals"),
            ChatAction::new("Use Budget Tool", "tools"),
        ],
    )
}

/// Growth rate assumed for the rough years-to-FIRE estimate
const ESTIMATE_GROWTH: f64 = 1.07;

fn retirement_reply(ctx: &AdvisorContext<'_>) -> ChatTurn {
    let annual_income = ctx.profile.monthly_income * 12.0;
    let fire_number = annual_income * 25.0;
    let invested = ctx.total_invested;

    let years = ((fire_number / invested.max(1.0)).ln() / ESTIMATE_GROWTH.ln()).max(0.0);
    let years = if years.is_finite() { years } else { 0.0 };
    let progress = if fire_number > 0.0 {
        invested / fire_number * 100.0
    } else {
        0.0
    };

    let mut out = String::from("🏖️ **Retirement & FIRE Planning**\n\n");
    out.push_str(&format!("**Your FIRE Number:** ${}\n", amount(fire_number)));
    out.push_str("(25x your annual expenses for 4% withdrawal rate)\n\n");
    out.push_str("**Current Progress:**\n");
    out.push_str(&format!("• Invested: ${}\n", amount(invested)));
    out.push_str(&format!("• Progress: {:.1}%\n", progress));
    out.push_str(&format!("• Est. Years to FIRE: {:.0} years\n\n", years));
    out.push_str("**Recommended Actions:**\n");
    out.push_str("1. Max out 401(k): $23,000/year (2024)\n");
    out.push_str("2. Max out Roth IRA: $7,000/year\n");
    out.push_str("3. Invest additional in taxable brokerage\n");
    out.push_str("4. Aim for 15-20% of income to retirement");

    ChatTurn::assistant(
        out,
        vec![
            ChatAction::new("FIRE Calculator", "tools"),
            ChatAction::new("Add Investment", "investments"),
        ],
    )
}

fn goals_reply(ctx: &AdvisorContext<'_>) -> ChatTurn {
    let mut out = String::from("🎯 **Your Financial Goals**\n\n");

    if ctx.data.goals.is_empty() {
        out.push_str("You haven't set any goals yet! Here are some recommended goals:\n\n");
        out.push_str(&format!(
            "1. **Emergency Fund** - 6 months expenses (${})\n",
            amount(ctx.profile.monthly_expenses * 6.0)
        ));
        out.push_str("2. **Retirement Savings** - Start with $100K milestone\n");
        out.push_str("3. **Vacation Fund** - Dream trip budget\n");
        out.push_str("4. **Debt Payoff** - If applicable");
    } else {
        for goal in &ctx.data.goals {
            out.push_str(&format!("**{}**\n", goal.name));
            out.push_str(&format!(
                "• Progress: {:.0}% (${} / ${})\n",
                goal.progress_percent(),
                amount(goal.current_amount),
                amount(goal.target_amount)
            ));
            out.push_str(&format!("• Deadline: {}\n\n", short_date(goal.deadline)));
        }
    }

    ChatTurn::assistant(out, vec![ChatAction::new("Manage Goals", "goals")])
}

fn help_reply() -> ChatTurn {
    ChatTurn::assistant(
        "I can help you with:\n\n\
         • **\"Analyze my finances\"** - Get a complete overview\n\
         • **\"Investment advice\"** - Personalized portfolio suggestions\n\
         • **\"How to save more\"** - Budget tips and strategies\n\
         • **\"Retirement planning\"** - FIRE number and 401(k) advice\n\
         • **\"My goals\"** - Track and manage financial goals\n\n\
         What would you like to know?"
            .to_string(),
        vec![
            ChatAction::new("Analyze Finances", "analyze"),
            ChatAction::new("Investment Tips", "invest"),
            ChatAction::new("Savings Help", "save"),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Goal, GoalCategory, GoalPriority, Investment, InvestmentHorizon, InvestmentType};
    use chrono::NaiveDate;

    fn profile(risk: RiskTolerance) -> Profile {
        Profile {
            name: "Alex Chen".to_string(),
            email: "alex@example.com".to_string(),
            age: 34,
            monthly_income: 6000.0,
            monthly_savings: 900.0,
            monthly_expenses: 4000.0,
            current_savings: 10_000.0,
            risk_tolerance: risk,
            investment_horizon: InvestmentHorizon::Medium,
            goals: vec![],
        }
    }

    fn data(risk: RiskTolerance) -> UserData {
        UserData {
            profile: Some(profile(risk)),
            investments: vec![Investment {
                id: "inv_1".to_string(),
                name: "VTI".to_string(),
                kind: InvestmentType::Etf,
                amount: 20_000.0,
                current_value: 25_000.0,
                returns: 5_000.0,
                purchase_date: None,
            }],
            ..Default::default()
        }
    }

    fn labels(turn: &ChatTurn) -> Vec<(&str, &str)> {
        turn.actions
            .iter()
            .map(|a| (a.label.as_str(), a.action.as_str()))
            .collect()
    }

    #[test]
    fn test_no_profile_asks_for_one() {
        let engine = AdvisorEngine::new();
        let turn = engine.respond(&UserData::default(), "analyze my finances");
        assert!(turn.content.starts_with("I'd love to help you"));
        assert_eq!(labels(&turn), vec![("Complete Profile", "profile")]);
        assert_eq!(
            engine.classify(&UserData::default(), "invest"),
            Topic::ProfileRequired
        );
    }

    #[test]
    fn test_priority_order() {
        let engine = AdvisorEngine::new();
        let d = data(RiskTolerance::Moderate);
        // "analyze" beats "invest", "invest" beats "save"
        assert_eq!(engine.classify(&d, "Analyze my investments"), Topic::Analysis);
        assert_eq!(engine.classify(&d, "should I invest or save?"), Topic::Investment);
        assert_eq!(engine.classify(&d, "BUDGET help"), Topic::Savings);
        assert_eq!(engine.classify(&d, "When can I retire"), Topic::Retirement);
        assert_eq!(engine.classify(&d, "my goals"), Topic::Goals);
        assert_eq!(engine.classify(&d, "hello there"), Topic::Help);
        // substring matching: "firewall" contains "fire"
        assert_eq!(engine.classify(&d, "firewall"), Topic::Retirement);
    }

    #[test]
    fn test_analysis_reply() {
        let d = data(RiskTolerance::Moderate);
        let turn = AdvisorEngine::new().respond(&d, "How am I doing?");
        assert!(turn.content.starts_with("📊 **Financial Analysis for Alex Chen**"));
        assert!(turn.content.contains("• Monthly Income: $6,000\n"));
        assert!(turn.content.contains("• Monthly Savings: $900 (15.0%)\n"));
        assert!(turn.content.contains("• 2.5 months of expenses saved ❌"));
        assert!(turn.content.contains("• Total Invested: $25,000\n"));
        assert!(turn.content.contains("• Number of Holdings: 1\n"));
        assert!(turn.content.ends_with("increase your savings rate to at least 20%."));
        assert_eq!(
            labels(&turn),
            vec![("View Dashboard", "dashboard"), ("Add Investment", "investments")]
        );
    }

    #[test]
    fn test_analysis_recommendation_branches() {
        let engine = AdvisorEngine::new();
        let mut d = data(RiskTolerance::Moderate);
        if let Some(p) = d.profile.as_mut() {
            p.monthly_savings = 1500.0;
        }
        let turn = engine.respond(&d, "summary");
        assert!(turn.content.contains("Focus on building your emergency fund"));

        if let Some(p) = d.profile.as_mut() {
            p.current_savings = 30_000.0;
        }
        let turn = engine.respond(&d, "summary");
        assert!(turn.content.contains("7.5 months of expenses saved ✅"));
        assert!(turn.content.contains("**Great job!**"));
    }

    #[test]
    fn test_investment_reply_per_risk() {
        let engine = AdvisorEngine::new();
        let conservative = engine.respond(&data(RiskTolerance::Conservative), "stock tips");
        assert!(conservative.content.contains("• Risk Tolerance: conservative\n"));
        assert!(conservative.content.contains("• Investment Horizon: medium-term\n"));
        assert!(conservative.content.contains("• 60% Bonds (Government & Corporate)\n"));
        assert!(conservative.content.ends_with("• High-Yield Savings Account (4-5% APY)"));

        let moderate = engine.respond(&data(RiskTolerance::Moderate), "portfolio");
        assert!(moderate.content.contains("Schwab US Dividend Equity ETF (SCHD)"));

        let aggressive = engine.respond(&data(RiskTolerance::Aggressive), "invest");
        assert!(aggressive.content.contains("• 80% Stocks (Growth-focused)\n"));
        assert_eq!(
            labels(&aggressive),
            vec![("Add Investment", "investments"), ("Use Calculator", "tools")]
        );
    }

    #[test]
    fn test_savings_reply() {
        let turn = AdvisorEngine::new().respond(&data(RiskTolerance::Moderate), "saving");
        assert!(turn.content.contains("• Disposable: $2,000/month\n"));
        assert!(turn.content.contains("• Needs (50%): $3,000\n"));
        assert!(turn.content.contains("• Wants (30%): $1,800\n"));
        assert!(turn.content.contains("1. Automate $1,200/month to savings\n"));
        assert_eq!(
            labels(&turn),
            vec![("Set Savings Goal", "goals"), ("Use Budget Tool", "tools")]
        );
    }

    #[test]
    fn test_retirement_reply() {
        let turn = AdvisorEngine::new().respond(&data(RiskTolerance::Moderate), "401k");
        // 6000 * 12 * 25
        assert!(turn.content.contains("**Your FIRE Number:** $1,800,000\n"));
        assert!(turn.content.contains("• Progress: 1.4%\n"));
        // ln(72) / ln(1.07) = 63.2
        assert!(turn.content.contains("• Est. Years to FIRE: 63 years\n"));
    }

    #[test]
    fn test_retirement_reply_with_zero_income() {
        let mut d = data(RiskTolerance::Moderate);
        if let Some(p) = d.profile.as_mut() {
            p.monthly_income = 0.0;
        }
        let turn = AdvisorEngine::new().respond(&d, "retire");
        assert!(turn.content.contains("• Progress: 0.0%\n"));
        assert!(turn.content.contains("• Est. Years to FIRE: 0 years\n"));
    }

    #[test]
    fn test_goals_reply() {
        let engine = AdvisorEngine::new();
        let mut d = data(RiskTolerance::Moderate);
        let empty = engine.respond(&d, "goal ideas");
        assert!(empty.content.contains("6 months expenses ($24,000)"));

        d.goals.push(Goal {
            id: "goal_1".to_string(),
            name: "New Car".to_string(),
            target_amount: 20_000.0,
            current_amount: 25_000.0,
            deadline: NaiveDate::from_ymd_opt(2027, 3, 15).unwrap(),
            category: GoalCategory::Car,
            priority: GoalPriority::Medium,
        });
        let listed = engine.respond(&d, "my goals");
        assert!(listed.content.contains("**New Car**\n"));
        assert!(listed.content.contains("• Progress: 125% ($25,000 / $20,000)\n"));
        assert!(listed.content.contains("• Deadline: 3/15/2027\n"));
        assert_eq!(labels(&listed), vec![("Manage Goals", "goals")]);
    }

    #[test]
    fn test_help_reply() {
        let turn = AdvisorEngine::new().respond(&data(RiskTolerance::Moderate), "hi");
        assert!(turn.content.starts_with("I can help you with:"));
        assert_eq!(turn.actions.len(), 3);
        assert_eq!(turn.actions[0].action, "analyze");
    }

    #[test]
    fn test_replies_are_deterministic() {
        let engine = AdvisorEngine::new();
        let d = data(RiskTolerance::Aggressive);
        for input in ["analyze", "invest", "save", "retire", "goal", "hello"] {
            assert_eq!(engine.respond(&d, input), engine.respond(&d, input));
        }
    }
}
