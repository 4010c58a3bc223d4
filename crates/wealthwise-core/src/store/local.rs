//! Local key-value storage backend

use async_trait::async_trait;

use super::{Owner, UserDataStore};
use crate::db::Database;
use crate::error::Result;
use crate::models::{Achievement, Goal, Investment, Profile, UserData};

const PROFILE: &str = "profile";
const INVESTMENTS: &str = "investments";
const GOALS: &str = "goals";
const ACHIEVEMENTS: &str = "achievements";

/// Stores each part of a user's record as its own JSON value
pub struct LocalStore {
    db: Database,
}

impl LocalStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn key(part: &str, user_id: &str) -> String {
        format!("wealthwise_{}_{}", part, user_id)
    }
}

#[async_trait]
impl UserDataStore for LocalStore {
    fn name(&self) -> &str {
        "local"
    }

    async fn load(&self, owner: &Owner) -> Result<Option<UserData>> {
        let id = owner.user_id.as_str();
        let profile: Option<Profile> = self.db.get_json(&Self::key(PROFILE, id))?;
        let investments: Option<Vec<Investment>> = self.db.get_json(&Self::key(INVESTMENTS, id))?;
        let goals: Option<Vec<Goal>> = self.db.get_json(&Self::key(GOALS, id))?;
        let achievements: Option<Vec<Achievement>> =
            self.db.get_json(&Self::key(ACHIEVEMENTS, id))?;

        if profile.is_none() && investments.is_none() && goals.is_none() && achievements.is_none() {
            return Ok(None);
        }

        Ok(Some(UserData {
            profile,
            investments: investments.unwrap_or_default(),
            goals: goals.unwrap_or_default(),
            achievements: achievements.unwrap_or_default(),
        }))
    }

    async fn save(&self, owner: &Owner, data: &UserData) -> Result<()> {
        let id = owner.user_id.as_str();
        // An absent profile leaves any stored one in place
        if let Some(profile) = &data.profile {
            self.db.put_json(&Self::key(PROFILE, id), profile)?;
        }
        self.db.put_json(&Self::key(INVESTMENTS, id), &data.investments)?;
        self.db.put_json(&Self::key(GOALS, id), &data.goals)?;
        self.db.put_json(&Self::key(ACHIEVEMENTS, id), &data.achievements)?;
        Ok(())
    }

    async fn health_check(&self) -> bool {
        self.db.conn().is_ok()
    }
}
