//! Process-local record store.
//!
//! Backs both repository traits with in-memory maps guarded by a tokio
//! `RwLock`. Used for tests and single-node deployments that accept losing
//! data on restart.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::entities::{AttemptWindow, Link, LinkPatch, NewAttempt, NewLink};
use crate::domain::repositories::{AttemptRepository, LinkRepository, LinkSummary};
use crate::error::AppError;

#[derive(Default)]
struct Tables {
    next_id: i64,
    links: HashMap<String, Link>,
    attempts: Vec<NewAttempt>,
}

/// In-memory implementation of [`LinkRepository`] and [`AttemptRepository`].
///
/// Every operation takes the lock once, so inserts are atomic with respect
/// to the uniqueness check and click increments never lose updates.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored attempt records, including expired ones.
    pub async fn attempt_count(&self) -> usize {
        self.tables.read().await.attempts.len()
    }
}

fn code_not_found(code: &str) -> AppError {
    AppError::not_found("Short code not found", json!({ "code": code }))
}

#[async_trait]
impl LinkRepository for InMemoryStore {
    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        Ok(self.tables.read().await.links.get(code).cloned())
    }

    async fn insert(&self, new_link: NewLink) -> Result<Link, AppError> {
        let mut tables = self.tables.write().await;

        if tables.links.contains_key(&new_link.code) {
            return Err(AppError::already_exists(
                "Short code already exists",
                json!({ "constraint": "links_code_key", "suggestion": "update" }),
            ));
        }

        tables.next_id += 1;
        let link = Link {
            id: tables.next_id,
            code: new_link.code,
            target_url: new_link.target_url,
            click_count: 0,
            created_by: new_link.created_by,
            owner_client_id: new_link.owner_client_id,
            created_at: new_link.created_at,
            updated_at: None,
            last_clicked_at: None,
        };

        tables.links.insert(link.code.clone(), link.clone());
        Ok(link)
    }

    async fn update(&self, code: &str, patch: LinkPatch) -> Result<Link, AppError> {
        let mut tables = self.tables.write().await;
        let link = tables
            .links
            .get_mut(code)
            .ok_or_else(|| code_not_found(code))?;

        link.target_url = patch.target_url;
        link.updated_at = Some(patch.updated_at);

        Ok(link.clone())
    }

    async fn delete(&self, code: &str) -> Result<(), AppError> {
        self.tables
            .write()
            .await
            .links
            .remove(code)
            .map(|_| ())
            .ok_or_else(|| code_not_found(code))
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<(Vec<Link>, i64), AppError> {
        let tables = self.tables.read().await;

        let mut links: Vec<Link> = tables.links.values().cloned().collect();
        links.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = links.len() as i64;
        let page = links
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();

        Ok((page, total))
    }

    async fn record_click(
        &self,
        code: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<Link>, AppError> {
        let mut tables = self.tables.write().await;

        Ok(tables.links.get_mut(code).map(|link| {
            link.click_count += 1;
            link.last_clicked_at = Some(at);
            link.clone()
        }))
    }

    async fn summary(&self, since: DateTime<Utc>, top: i64) -> Result<LinkSummary, AppError> {
        let tables = self.tables.read().await;
        let links = tables.links.values();

        let total_links = tables.links.len() as i64;
        let total_clicks: i64 = links.clone().map(|l| l.click_count).sum();
        let links_since = links.clone().filter(|l| l.created_at >= since).count() as i64;

        let mut top_links: Vec<Link> = links.cloned().collect();
        top_links.sort_by(|a, b| {
            b.click_count
                .cmp(&a.click_count)
                .then(a.created_at.cmp(&b.created_at))
                .then(a.id.cmp(&b.id))
        });
        top_links.truncate(top.max(0) as usize);

        Ok(LinkSummary {
            total_links,
            total_clicks,
            links_since,
            top_links,
        })
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[async_trait]
impl AttemptRepository for InMemoryStore {
    async fn window_since(
        &self,
        client_id: &str,
        since: DateTime<Utc>,
    ) -> Result<AttemptWindow, AppError> {
        let tables = self.tables.read().await;

        let in_window = tables
            .attempts
            .iter()
            .filter(|a| a.client_id == client_id && a.created_at >= since);

        let window = in_window.fold(AttemptWindow::default(), |acc, a| AttemptWindow {
            count: acc.count + 1,
            oldest: Some(acc.oldest.map_or(a.created_at, |o| o.min(a.created_at))),
        });

        Ok(window)
    }

    async fn insert(&self, attempt: NewAttempt) -> Result<(), AppError> {
        self.tables.write().await.attempts.push(attempt);
        Ok(())
    }

    async fn prune_before(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError> {
        let mut tables = self.tables.write().await;
        let before = tables.attempts.len();
        tables.attempts.retain(|a| a.created_at >= cutoff);
        Ok((before - tables.attempts.len()) as u64)
    }
}
