//! DTOs for the statistics endpoint.

use serde::Serialize;

use super::links::LinkResponse;

/// Service-wide link statistics.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_links: i64,
    pub total_clicks: i64,
    pub links_today: i64,
    pub average_clicks: i64,
    pub top_links: Vec<LinkResponse>,
}
