// Visual Dictionary - A streaming visual dictionary for the terminal
// Copyright (C) 2025  Simon Peter Rothgang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Saved lookups. The session never talks to a store directly; the caller
//! moves finished entries in and out through `toggle_favorite` and
//! `Session::open_saved`.

use crate::session::{EntryKind, HistoryEntry};
use anyhow::Context as _;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: EntryKind,
    /// ISO-8601 on the wire.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewFavorite {
    pub label: String,
    pub content: Option<String>,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

impl NewFavorite {
    #[must_use]
    pub fn from_entry(entry: &HistoryEntry) -> Self {
        Self { label: entry.label.clone(), content: entry.content.clone(), kind: entry.kind }
    }
}

#[async_trait(?Send)]
pub trait FavoritesStore {
    /// Newest first.
    async fn list(&self) -> anyhow::Result<Vec<Favorite>>;
    async fn check_by_label(&self, label: &str) -> anyhow::Result<Option<Favorite>>;
    /// Idempotent by label: returns the existing record if one is present.
    async fn create(&self, favorite: NewFavorite) -> anyhow::Result<Favorite>;
    async fn delete_by_id(&self, id: &str) -> anyhow::Result<bool>;
}

/// Save `entry` if it is not yet a favorite, otherwise remove it. Returns
/// whether the entry is a favorite afterwards.
pub async fn toggle_favorite(
    store: &dyn FavoritesStore,
    entry: &HistoryEntry,
) -> anyhow::Result<bool> {
    if let Some(existing) = store.check_by_label(&entry.label).await? {
        store.delete_by_id(&existing.id).await?;
        tracing::info!(label = %entry.label, "removed favorite");
        return Ok(false);
    }
    store.create(NewFavorite::from_entry(entry)).await?;
    tracing::info!(label = %entry.label, "saved favorite");
    Ok(true)
}

/// Process-local store. Contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryFavorites {
    records: RefCell<Vec<Favorite>>,
}

#[async_trait(?Send)]
impl FavoritesStore for MemoryFavorites {
    async fn list(&self) -> anyhow::Result<Vec<Favorite>> {
        Ok(self.records.borrow().clone())
    }

    async fn check_by_label(&self, label: &str) -> anyhow::Result<Option<Favorite>> {
        Ok(self.records.borrow().iter().find(|f| f.label == label).cloned())
    }

    async fn create(&self, favorite: NewFavorite) -> anyhow::Result<Favorite> {
        if let Some(existing) = self.check_by_label(&favorite.label).await? {
            return Ok(existing);
        }
        let record = Favorite {
            id: uuid::Uuid::new_v4().to_string(),
            label: favorite.label,
            content: favorite.content,
            kind: favorite.kind,
            created_at: Some(Utc::now()),
        };
        self.records.borrow_mut().insert(0, record.clone());
        Ok(record)
    }

    async fn delete_by_id(&self, id: &str) -> anyhow::Result<bool> {
        let mut records = self.records.borrow_mut();
        let before = records.len();
        records.retain(|f| f.id != id);
        Ok(records.len() != before)
    }
}

/// Client for a favorites REST service exposing `/api/favorites`.
#[derive(Debug, Clone)]
pub struct HttpFavorites {
    http: reqwest::Client,
    base_url: reqwest::Url,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckResponse {
    is_favorite: bool,
    favorite: Option<Favorite>,
}

#[derive(Deserialize)]
struct DeleteResponse {
    success: bool,
}

impl HttpFavorites {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let base_url = reqwest::Url::parse(base_url)
            .with_context(|| format!("invalid favorites url `{base_url}`"))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("favorites url `{base_url}` cannot be used as a base");
        }
        Ok(Self { http: reqwest::Client::new(), base_url })
    }

    /// `base_url` + `/api/favorites` + `segments`, each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> anyhow::Result<reqwest::Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| anyhow::anyhow!("favorites url cannot be a base"))?
            .pop_if_empty()
            .extend(["api", "favorites"])
            .extend(segments);
        Ok(url)
    }
}

#[async_trait(?Send)]
impl FavoritesStore for HttpFavorites {
    async fn list(&self) -> anyhow::Result<Vec<Favorite>> {
        let url = self.endpoint(&[])?;
        let response = self.http.get(url).send().await.context("favorites request failed")?;
        response
            .error_for_status()
            .context("favorites list rejected")?
            .json()
            .await
            .context("failed to decode favorites list")
    }

    async fn check_by_label(&self, label: &str) -> anyhow::Result<Option<Favorite>> {
        let url = self.endpoint(&["check", label])?;
        let response = self.http.get(url).send().await.context("favorites request failed")?;
        let check: CheckResponse = response
            .error_for_status()
            .context("favorite check rejected")?
            .json()
            .await
            .context("failed to decode favorite check")?;
        Ok(check.favorite.filter(|_| check.is_favorite))
    }

    async fn create(&self, favorite: NewFavorite) -> anyhow::Result<Favorite> {
        let url = self.endpoint(&[])?;
        let response =
            self.http.post(url).json(&favorite).send().await.context("favorites request failed")?;
        response
            .error_for_status()
            .context("favorite create rejected")?
            .json()
            .await
            .context("failed to decode created favorite")
    }

    async fn delete_by_id(&self, id: &str) -> anyhow::Result<bool> {
        let url = self.endpoint(&[id])?;
        let response = self.http.delete(url).send().await.context("favorites request failed")?;
        let deleted: DeleteResponse = response
            .error_for_status()
            .context("favorite delete rejected")?
            .json()
            .await
            .context("failed to decode delete response")?;
        Ok(deleted.success)
    }
}
