//! WealthWise Core Library
//!
//! Shared functionality for the WealthWise personal finance tracker:
//! - Profile, investment, goal and achievement records
//! - Financial health score
//! - Compound interest, FIRE and 50/30/20 budget calculators
//! - Rule-based advisor chat with navigation actions
//! - Achievement evaluation against a fixed catalog
//! - User data storage with a hosted backend and local fallback
//! - Authentication with hosted and local account providers

pub mod achievements;
pub mod advisor;
pub mod auth;
pub mod calculators;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod format;
pub mod health;
pub mod models;
pub mod portfolio;
pub mod store;

/// Test utilities including the mock hosted backend
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use achievements::{AchievementStatus, CatalogEntry, CATALOG};
pub use advisor::{
    ActionOutcome, ActionTarget, Advisor, AdvisorEngine, ChatAction, ChatRole, ChatTurn,
    Conversation, Topic,
};
pub use auth::{
    AuthProvider, AuthService, FallbackAuth, Identity, LocalAuth, RemoteAuth, ResetOutcome,
    Session, SignInRequest, SignUpRequest,
};
pub use calculators::{
    BudgetSplit, CompoundInputs, CompoundResult, FireInputs, FireProjection, FireScenario,
    YearProjection,
};
pub use dashboard::{Dashboard, GoalProgress, PortfolioSummary};
pub use db::Database;
pub use error::{Error, Result};
pub use health::{Grade, HealthScore};
pub use models::{
    Achievement, Goal, GoalCategory, GoalPriority, GoalUpdate, Investment, InvestmentHorizon,
    InvestmentType, InvestmentUpdate, NewGoal, NewInvestment, Profile, RiskTolerance, Tab, User,
    UserData,
};
pub use store::{
    Backend, LocalStore, Owner, ReconcileOutcome, RemoteConfig, RemoteStore, SaveOutcome,
    Storage, StorageStatus, UserDataStore,
};
