//! Attempt entity used for per-client rate limiting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A mutating operation counted against a client's budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttemptAction {
    Create,
    Update,
}

impl AttemptAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
        }
    }
}

impl fmt::Display for AttemptAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttemptAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(Self::Create),
            "update" => Ok(Self::Update),
            other => Err(format!("unknown attempt action '{other}'")),
        }
    }
}

/// Append-only record of one mutating operation by a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAttempt {
    pub client_id: String,
    pub action: AttemptAction,
    pub created_at: DateTime<Utc>,
}

/// Attempts a client made inside a rate-limit window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttemptWindow {
    pub count: i64,
    /// Timestamp of the oldest attempt still inside the window.
    pub oldest: Option<DateTime<Utc>>,
}
