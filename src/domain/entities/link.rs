//! Link entity representing a short code to target URL mapping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Who created a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Creator {
    Admin,
    Client,
}

impl Creator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Client => "client",
        }
    }
}

impl fmt::Display for Creator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Creator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "client" => Ok(Self::Client),
            other => Err(format!("unknown creator '{other}'")),
        }
    }
}

/// A stored short link.
///
/// `code` is unique among live records; the store enforces it with a unique
/// constraint so concurrent inserts of the same code cannot both succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub id: i64,
    pub code: String,
    pub target_url: String,
    pub click_count: i64,
    pub created_by: Creator,
    pub owner_client_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub last_clicked_at: Option<DateTime<Utc>>,
}

impl Link {
    /// Returns true if the link was created by an anonymous client.
    pub fn is_client_owned(&self) -> bool {
        self.created_by == Creator::Client
    }
}

/// Input data for inserting a new link.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub code: String,
    pub target_url: String,
    pub created_by: Creator,
    pub owner_client_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Rebinds an existing link to a new target.
#[derive(Debug, Clone)]
pub struct LinkPatch {
    pub target_url: String,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creator_round_trips_through_str() {
        assert_eq!("admin".parse::<Creator>().unwrap(), Creator::Admin);
        assert_eq!("client".parse::<Creator>().unwrap(), Creator::Client);
        assert_eq!(Creator::Client.to_string(), "client");
        assert!("root".parse::<Creator>().is_err());
    }

    #[test]
    fn test_creator_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Creator::Admin).unwrap(),
            "\"admin\""
        );
    }

    #[test]
    fn test_is_client_owned() {
        let link = Link {
            id: 1,
            code: "abc123".to_string(),
            target_url: "https://example.com".to_string(),
            click_count: 0,
            created_by: Creator::Client,
            owner_client_id: Some("client-1".to_string()),
            created_at: Utc::now(),
            updated_at: None,
            last_clicked_at: None,
        };

        assert!(link.is_client_owned());
    }
}
