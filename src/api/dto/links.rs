//! DTOs for link creation, rebinding and listing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::domain::entities::{Creator, Link};
use crate::utils::base_url::short_url;

/// Request to create a short link.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLinkRequest {
    /// Target URL (must be HTTP/HTTPS).
    #[validate(length(min = 1, max = 2048, message = "URL must be 1-2048 characters"))]
    pub url: String,

    /// Optional custom short code; a random one is generated when absent,
    /// empty or blank.
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(length(min = 3, max = 20, message = "Code must be 3-20 characters"))]
    pub custom_code: Option<String>,
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|code| !code.trim().is_empty()))
}

/// Request to point an existing code at a new target.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateLinkRequest {
    #[validate(length(min = 1, max = 2048, message = "URL must be 1-2048 characters"))]
    pub url: String,
}

/// JSON representation of a link.
#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub code: String,
    pub short_url: String,
    pub target_url: String,
    pub click_count: i64,
    pub created_by: Creator,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_client_id: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_clicked_at: Option<DateTime<Utc>>,
}

impl LinkResponse {
    /// Builds the response, resolving the short URL against `base_url`.
    pub fn from_link(link: Link, base_url: &str) -> Self {
        Self {
            short_url: short_url(base_url, &link.code),
            code: link.code,
            target_url: link.target_url,
            click_count: link.click_count,
            created_by: link.created_by,
            owner_client_id: link.owner_client_id,
            created_at: link.created_at,
            updated_at: link.updated_at,
            last_clicked_at: link.last_clicked_at,
        }
    }
}

/// Page of links for the admin listing.
#[derive(Debug, Serialize)]
pub struct LinkListResponse {
    pub items: Vec<LinkResponse>,
    pub pagination: PaginationMeta,
}

#[derive(Debug, Serialize)]
pub struct PaginationMeta {
    pub page: u32,
    pub page_size: u32,
    pub total: i64,
    pub total_pages: i64,
}
