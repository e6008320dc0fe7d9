//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::{FromRow, PgPool};
use std::sync::Arc;

use crate::domain::entities::{Creator, Link, LinkPatch, NewLink};
use crate::domain::repositories::{LinkRepository, LinkSummary};
use crate::error::AppError;

const LINK_COLUMNS: &str = "id, code, target_url, click_count, created_by, owner_client_id, \
                            created_at, updated_at, last_clicked_at";

/// Raw `links` row as returned by SQLx.
#[derive(Debug, FromRow)]
struct LinkRow {
    id: i64,
    code: String,
    target_url: String,
    click_count: i64,
    created_by: String,
    owner_client_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
    last_clicked_at: Option<DateTime<Utc>>,
}

impl TryFrom<LinkRow> for Link {
    type Error = AppError;

    fn try_from(row: LinkRow) -> Result<Self, Self::Error> {
        let created_by = row.created_by.parse::<Creator>().map_err(|reason| {
            AppError::internal("Corrupt link record", json!({ "code": row.code, "reason": reason }))
        })?;

        Ok(Link {
            id: row.id,
            code: row.code,
            target_url: row.target_url,
            click_count: row.click_count,
            created_by,
            owner_client_id: row.owner_client_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            last_clicked_at: row.last_clicked_at,
        })
    }
}

/// PostgreSQL repository for link storage and retrieval.
///
/// Code uniqueness is enforced by the `links_code_key` constraint; a losing
/// concurrent insert surfaces as [`AppError::AlreadyExists`].
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(&format!(
            "SELECT {LINK_COLUMNS} FROM links WHERE code = $1"
        ))
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(Link::try_from).transpose()
    }

    async fn insert(&self, new_link: NewLink) -> Result<Link, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(&format!(
            r#"
            INSERT INTO links (code, target_url, created_by, owner_client_id, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {LINK_COLUMNS}
            "#
        ))
        .bind(&new_link.code)
        .bind(&new_link.target_url)
        .bind(new_link.created_by.as_str())
        .bind(&new_link.owner_client_id)
        .bind(new_link.created_at)
        .fetch_one(self.pool.as_ref())
        .await?;

        Link::try_from(row)
    }

    async fn update(&self, code: &str, patch: LinkPatch) -> Result<Link, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(&format!(
            r#"
            UPDATE links
            SET target_url = $2, updated_at = $3
            WHERE code = $1
            RETURNING {LINK_COLUMNS}
            "#
        ))
        .bind(code)
        .bind(&patch.target_url)
        .bind(patch.updated_at)
        .fetch_optional(self.pool.as_ref())
        .await?;

        match row {
            Some(row) => Link::try_from(row),
            None => Err(AppError::not_found(
                "Short code not found",
                json!({ "code": code }),
            )),
        }
    }

    async fn delete(&self, code: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM links WHERE code = $1")
            .bind(code)
            .execute(self.pool.as_ref())
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(
                "Short code not found",
                json!({ "code": code }),
            ));
        }

        Ok(())
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<(Vec<Link>, i64), AppError> {
        let rows = sqlx::query_as::<_, LinkRow>(&format!(
            r#"
            SELECT {LINK_COLUMNS}
            FROM links
            ORDER BY created_at DESC, id DESC
            LIMIT $1 OFFSET $2
            "#
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool.as_ref())
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links")
            .fetch_one(self.pool.as_ref())
            .await?;

        let links = rows
            .into_iter()
            .map(Link::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((links, total))
    }

    async fn record_click(
        &self,
        code: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<Link>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(&format!(
            r#"
            UPDATE links
            SET click_count = click_count + 1, last_clicked_at = $2
            WHERE code = $1
            RETURNING {LINK_COLUMNS}
            "#
        ))
        .bind(code)
        .bind(at)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(Link::try_from).transpose()
    }

    async fn summary(&self, since: DateTime<Utc>, top: i64) -> Result<LinkSummary, AppError> {
        let (total_links, total_clicks, links_since): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COALESCE(SUM(click_count), 0)::BIGINT,
                COUNT(*) FILTER (WHERE created_at >= $1)
            FROM links
            "#,
        )
        .bind(since)
        .fetch_one(self.pool.as_ref())
        .await?;

        let rows = sqlx::query_as::<_, LinkRow>(&format!(
            r#"
            SELECT {LINK_COLUMNS}
            FROM links
            ORDER BY click_count DESC, created_at ASC, id ASC
            LIMIT $1
            "#
        ))
        .bind(top)
        .fetch_all(self.pool.as_ref())
        .await?;

        let top_links = rows
            .into_iter()
            .map(Link::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(LinkSummary {
            total_links,
            total_clicks,
            links_since,
            top_links,
        })
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(self.pool.as_ref()).await?;
        Ok(())
    }
}
