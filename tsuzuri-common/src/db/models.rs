//! Database models

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Upper bound for characters-per-second
pub const MAX_CPS: i64 = 1000;

/// Upper bound for accuracy percentage
pub const MAX_ACCURACY: i64 = 100;

/// Registered account
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Public view of an account (never carries the password hash)
#[derive(Debug, Clone, Serialize)]
pub struct AccountProfile {
    pub id: i64,
    pub username: String,
    pub email: String,
}

impl From<&Account> for AccountProfile {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            username: account.username.clone(),
            email: account.email.clone(),
        }
    }
}

/// One stored typing result
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PracticeRecord {
    pub id: i64,
    #[serde(skip_serializing)]
    pub user_id: i64,
    pub cps: i64,
    pub accuracy: i64,
    pub created_at: DateTime<Utc>,
}

/// Typing result ready for insertion, already clamped to valid ranges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewPracticeRecord {
    cps: i64,
    accuracy: i64,
}

impl NewPracticeRecord {
    /// Clamp `cps` to [0, 1000] and `accuracy` to [0, 100]
    pub fn clamped(cps: i64, accuracy: i64) -> Self {
        Self {
            cps: cps.clamp(0, MAX_CPS),
            accuracy: accuracy.clamp(0, MAX_ACCURACY),
        }
    }

    pub fn cps(&self) -> i64 {
        self.cps
    }

    pub fn accuracy(&self) -> i64 {
        self.accuracy
    }
}
