//! Admin-only link management and statistics.
//!
//! All routes here sit behind [`crate::api::middleware::auth::layer`].

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
};
use chrono::Utc;

use super::base_url;
use crate::api::dto::links::{LinkListResponse, LinkResponse, PaginationMeta};
use crate::api::dto::pagination::PaginationParams;
use crate::api::dto::stats::StatsResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Lists links newest first.
///
/// # Endpoint
///
/// `GET /api/admin/links?page=1&page_size=25`
pub async fn list_links_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<PaginationParams>,
) -> Result<Json<LinkListResponse>, AppError> {
    let (page, page_size) = params.validate()?;

    let result = state.link_service.list_links(page, page_size).await?;
    let base = base_url(&state, &headers);

    Ok(Json(LinkListResponse {
        items: result
            .items
            .into_iter()
            .map(|link| LinkResponse::from_link(link, &base))
            .collect(),
        pagination: PaginationMeta {
            page: result.page,
            page_size: result.page_size,
            total: result.total,
            total_pages: result.total_pages,
        },
    }))
}

/// `GET /api/admin/links/{code}`, without counting a click.
pub async fn get_link_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<LinkResponse>, AppError> {
    let link = state.link_service.get_link(&code).await?;

    Ok(Json(LinkResponse::from_link(
        link,
        &base_url(&state, &headers),
    )))
}

/// `DELETE /api/admin/links/{code}`.
///
/// Responds `204 No Content`, or 404 if the code does not exist.
pub async fn delete_link_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state.link_service.delete_link(&code).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Service-wide totals and the most clicked links.
///
/// # Endpoint
///
/// `GET /api/admin/stats`
pub async fn stats_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<StatsResponse>, AppError> {
    let summary = state.stats_service.summary(Utc::now()).await?;
    let base = base_url(&state, &headers);

    Ok(Json(StatsResponse {
        total_links: summary.total_links,
        total_clicks: summary.total_clicks,
        links_today: summary.links_today,
        average_clicks: summary.average_clicks,
        top_links: summary
            .top_links
            .into_iter()
            .map(|link| LinkResponse::from_link(link, &base))
            .collect(),
    }))
}
