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

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Opaque, session-unique entry identifier. Monotonic within one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(pub u64);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    #[default]
    Text,
    Image,
}

/// Handle to an uploaded image. Only the path and a guessed MIME type are kept;
/// bytes are read when a stream actually needs them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub path: PathBuf,
    pub mime_type: String,
}

impl ImageRef {
    #[must_use]
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mime_type = guess_mime_type(&path).to_owned();
        Self { path, mime_type }
    }
}

fn guess_mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        _ => "application/octet-stream",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// A provider credential is missing or rejected; the caller should prompt
    /// for configuration.
    MissingCredential,
    Stream,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EntryStatus {
    #[default]
    Pending,
    Streaming,
    Complete,
    Failed(Failure),
}

impl EntryStatus {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Failed(_))
    }
}

/// One query/result pair in the navigable history.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub id: EntryId,
    /// Query text, case preserved. Compared case-insensitively.
    pub label: String,
    pub kind: EntryKind,
    pub image: Option<ImageRef>,
    pub content: Option<String>,
    pub status: EntryStatus,
}

impl HistoryEntry {
    #[must_use]
    pub fn has_content(&self) -> bool {
        self.content.as_deref().is_some_and(|c| !c.is_empty())
    }

    #[must_use]
    pub fn is_streaming(&self) -> bool {
        matches!(self.status, EntryStatus::Streaming)
    }

    #[must_use]
    pub fn matches_label(&self, label: &str) -> bool {
        self.label
            .chars()
            .flat_map(char::to_lowercase)
            .eq(label.chars().flat_map(char::to_lowercase))
    }
}
