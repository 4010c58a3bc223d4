//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// WealthWise - Track your money, plan your future
#[derive(Parser)]
#[command(name = "wealthwise")]
#[command(about = "Personal finance tracker with calculators and an advisor", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path (defaults to $WEALTHWISE_DB or the platform data directory)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Act as this user id instead of the remembered session
    #[arg(long, global = true)]
    pub user: Option<String>,

    /// Print JSON instead of formatted text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Disable authentication (for local development only)
        ///
        /// WARNING: Do not use this flag when exposing the server to a network.
        /// Requests without a session act as the local-dev user.
        #[arg(long)]
        no_auth: bool,

        /// Allowed CORS origin (repeatable)
        #[arg(long = "allow-origin")]
        allowed_origins: Vec<String>,
    },

    /// Create an account and remember it for later commands
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Sign in and remember the account for later commands
    Signin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Forget the remembered account
    Signout,

    /// Request a password reset
    ResetPassword {
        #[arg(long)]
        email: String,
    },

    /// Show or edit the financial profile
    Profile {
        #[command(subcommand)]
        action: Option<ProfileAction>,
    },

    /// Manage investment holdings
    Investments {
        #[command(subcommand)]
        action: Option<InvestmentsAction>,
    },

    /// Manage savings goals
    Goals {
        #[command(subcommand)]
        action: Option<GoalsAction>,
    },

    /// Show the dashboard summary
    Dashboard,

    /// Show the financial health score
    Health,

    /// List achievements and their unlock state
    Achievements,

    /// Compound interest calculator
    Compound {
        #[arg(long, default_value = "10000")]
        principal: f64,
        /// Monthly contribution
        #[arg(long, default_value = "500")]
        monthly: f64,
        #[arg(long, default_value = "20")]
        years: u32,
        /// Annual rate in percent
        #[arg(long, default_value = "7")]
        rate: f64,
    },

    /// FIRE projection, pre-filled from the profile
    Fire {
        #[arg(long)]
        expenses: Option<f64>,
        /// Current invested assets
        #[arg(long)]
        investments: Option<f64>,
        /// Monthly amount invested
        #[arg(long)]
        monthly: Option<f64>,
        /// Safe withdrawal rate in percent
        #[arg(long)]
        withdrawal_rate: Option<f64>,
        /// Expected annual return in percent
        #[arg(long = "return")]
        expected_return: Option<f64>,
        /// Annual inflation in percent
        #[arg(long)]
        inflation: Option<f64>,
    },

    /// 50/30/20 budget split
    Budget {
        /// Monthly income (defaults to the profile's)
        #[arg(long)]
        income: Option<f64>,
    },

    /// Ask the advisor a question (prints the greeting without one)
    Ask {
        message: Vec<String>,
    },

    /// Show storage backend, account and record status
    Status,

    /// Push locally saved changes to the hosted backend
    Reconcile,
}

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Create or replace the profile
    Set {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long)]
        age: u32,
        /// Monthly income
        #[arg(long)]
        income: f64,
        /// Monthly savings
        #[arg(long)]
        savings: f64,
        /// Monthly expenses
        #[arg(long)]
        expenses: f64,
        /// Savings on hand
        #[arg(long, default_value = "0")]
        current_savings: f64,
        /// conservative, moderate or aggressive
        #[arg(long, default_value = "moderate")]
        risk: String,
        /// short, medium or long
        #[arg(long, default_value = "long")]
        horizon: String,
    },
}

#[derive(Subcommand)]
pub enum InvestmentsAction {
    /// List holdings
    List,
    /// Add a holding
    Add {
        #[arg(long)]
        name: String,
        /// stocks, bonds, etf, crypto, real-estate, mutual-fund, savings
        #[arg(long = "type", default_value = "stocks")]
        kind: String,
        /// Amount put in
        #[arg(long)]
        amount: f64,
        /// Current value (defaults to the amount)
        #[arg(long)]
        value: Option<f64>,
        /// Purchase date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },
    /// Update a holding's current value
    Value { id: String, value: f64 },
    /// Remove a holding
    Remove { id: String },
}

#[derive(Subcommand)]
pub enum GoalsAction {
    /// List goals
    List,
    /// Add a goal
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        target: f64,
        #[arg(long, default_value = "0")]
        current: f64,
        /// Deadline (YYYY-MM-DD)
        #[arg(long)]
        deadline: String,
        /// emergency, retirement, house, car, vacation, education, other
        #[arg(long, default_value = "other")]
        category: String,
        /// low, medium or high
        #[arg(long, default_value = "medium")]
        priority: String,
    },
    /// Set how much has been saved toward a goal
    Progress { id: String, amount: f64 },
    /// Remove a goal
    Remove { id: String },
}
