//! Rule-based financial advisor chat
//!
//! # Architecture
//!
//! - `AdvisorRule` pairs a keyword predicate with a reply builder
//! - `AdvisorEngine` holds the rules in priority order; the first match wins
//! - `Conversation` is the append-only transcript with a pending-reply guard
//! - `Advisor` runs a turn end to end, including the cosmetic reply delay
//!
//! Replies are pure functions of the user's snapshot and the matched rule.
//! No turn affects how later input is classified.

use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::models::{Profile, Tab, UserData};

mod conversation;
mod rules;

pub use conversation::Conversation;
pub use rules::{AdvisorContext, AdvisorEngine, AdvisorRule, Topic};

/// Environment variable overriding the reply delay in milliseconds
pub const DELAY_ENV: &str = "WEALTHWISE_ADVISOR_DELAY_MS";

pub const DEFAULT_DELAY: Duration = Duration::from_millis(1000);

/// Action tokens that navigate rather than re-prompt
const NAVIGATION_TOKENS: [Tab; 5] = [
    Tab::Dashboard,
    Tab::Investments,
    Tab::Goals,
    Tab::Tools,
    Tab::Profile,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// A button attached to an advisor reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatAction {
    pub label: String,
    /// Either a tab id or text to submit as the next prompt
    pub action: String,
}

impl ChatAction {
    pub fn new(label: &str, action: &str) -> Self {
        Self {
            label: label.to_string(),
            action: action.to_string(),
        }
    }
}

/// What an action token does when activated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ActionTarget {
    Navigate(Tab),
    Prompt(String),
}

impl ActionTarget {
    pub fn resolve(token: &str) -> Self {
        match token.parse::<Tab>() {
            Ok(tab) if NAVIGATION_TOKENS.contains(&tab) => Self::Navigate(tab),
            _ => Self::Prompt(token.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<ChatAction>,
}

impl ChatTurn {
    pub fn user(content: &str) -> Self {
        Self {
            role: ChatRole::User,
            content: content.to_string(),
            actions: Vec::new(),
        }
    }

    pub fn assistant(content: String, actions: Vec<ChatAction>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content,
            actions,
        }
    }
}

/// The opening assistant turn. `hour` is the local hour of day (0-23).
pub fn welcome(profile: Option<&Profile>, hour: u32) -> ChatTurn {
    let greeting = if hour < 12 {
        "Good morning"
    } else if hour < 18 {
        "Good afternoon"
    } else {
        "Good evening"
    };
    let name = profile
        .map(|p| format!(", {}", p.first_name()))
        .unwrap_or_default();

    ChatTurn::assistant(
        format!(
            "{}{}! 👋\n\nI'm your AI Financial Advisor. I can analyze your finances, suggest \
             investments based on your risk profile, help you save more, and plan for \
             retirement.\n\nWhat would you like to know today?",
            greeting, name
        ),
        vec![
            ChatAction::new("📊 Analyze My Finances", "analyze my finances"),
            ChatAction::new("📈 Investment Advice", "investment advice"),
            ChatAction::new("💰 How to Save More", "how can I save more money"),
            ChatAction::new("🏖️ Retirement Planning", "help me plan for retirement"),
        ],
    )
}

/// Result of activating an action token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ActionOutcome {
    Navigate { tab: Tab },
    Reply { turn: ChatTurn },
}

/// Runs advisor turns against a conversation
pub struct Advisor {
    engine: AdvisorEngine,
    delay: Duration,
}

impl Default for Advisor {
    fn default() -> Self {
        Self::new(DEFAULT_DELAY)
    }
}

impl Advisor {
    pub fn new(delay: Duration) -> Self {
        Self {
            engine: AdvisorEngine::new(),
            delay,
        }
    }

    /// Delay from `WEALTHWISE_ADVISOR_DELAY_MS`, falling back to one second
    pub fn from_env() -> Self {
        let delay = std::env::var(DELAY_ENV)
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_DELAY);
        Self::new(delay)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Build a reply without touching any transcript
    pub fn respond(&self, data: &UserData, input: &str) -> ChatTurn {
        self.engine.respond(data, input)
    }

    /// Record the user's input, wait out the delay, then append the reply.
    ///
    /// Fails with `Error::Busy` if a reply is already pending on this
    /// conversation.
    pub async fn send(
        &self,
        conversation: &Mutex<Conversation>,
        data: &UserData,
        input: &str,
    ) -> Result<ChatTurn> {
        lock(conversation).begin(input)?;
        let _pending = PendingGuard(conversation);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let reply = self.engine.respond(data, input);
        Ok(lock(conversation).finish(reply))
    }

    /// Activate an action token: navigation tokens resolve immediately,
    /// anything else is submitted as a prompt
    pub async fn act(
        &self,
        conversation: &Mutex<Conversation>,
        data: &UserData,
        token: &str,
    ) -> Result<ActionOutcome> {
        match ActionTarget::resolve(token) {
            ActionTarget::Navigate(tab) => {
                debug!(tab = %tab, "Advisor action navigates");
                Ok(ActionOutcome::Navigate { tab })
            }
            ActionTarget::Prompt(text) => {
                let turn = self.send(conversation, data, &text).await?;
                Ok(ActionOutcome::Reply { turn })
            }
        }
    }
}

fn lock(conversation: &Mutex<Conversation>) -> std::sync::MutexGuard<'_, Conversation> {
    conversation.lock().unwrap_or_else(|e| e.into_inner())
}

/// Clears the pending flag if a reply is abandoned mid-delay
struct PendingGuard<'a>(&'a Mutex<Conversation>);

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        lock(self.0).clear_pending();
    }
}
