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

//! Stream sources: the collaborators that turn a lookup into incremental
//! text. Every failure is reported in-band as a final `Error:` fragment.

mod error;
mod prompt;
mod router;

pub use error::StreamError;
pub use prompt::{IMAGE_PROMPT, definition_prompt};
pub use router::ProviderRouter;

use crate::session::{ERROR_MARKER, EntryKind, ImageRef};
use futures::StreamExt as _;
use futures::stream::LocalBoxStream;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ordered text fragments for one lookup.
pub type TextStream = LocalBoxStream<'static, String>;

/// Fragments before errors are folded in-band.
pub type ChunkStream = LocalBoxStream<'static, Result<String, StreamError>>;

/// Which upstream model family answers text lookups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provider {
    #[default]
    Gemini,
    /// Grok through OpenRouter.
    Grok,
    CerebrasGpt,
    CerebrasZai,
}

impl Provider {
    pub const ALL: [Self; 4] = [Self::Gemini, Self::Grok, Self::CerebrasGpt, Self::CerebrasZai];

    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::Grok => "grok",
            Self::CerebrasGpt => "cerebras-gpt",
            Self::CerebrasZai => "cerebras-zai",
        }
    }

    /// Name of the service whose key this provider needs.
    #[must_use]
    pub fn vendor(self) -> &'static str {
        match self {
            Self::Gemini => "Gemini",
            Self::Grok => "OpenRouter",
            Self::CerebrasGpt | Self::CerebrasZai => "Cerebras",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|p| p.tag() == wanted).ok_or_else(|| {
            let known: Vec<_> = Self::ALL.iter().map(|p| p.tag()).collect();
            format!("unknown provider `{s}` (expected one of: {})", known.join(", "))
        })
    }
}

/// Everything a source needs to answer one history entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamRequest {
    pub label: String,
    pub kind: EntryKind,
    pub image: Option<ImageRef>,
}

impl StreamRequest {
    #[must_use]
    pub fn text(label: impl Into<String>) -> Self {
        Self { label: label.into(), kind: EntryKind::Text, image: None }
    }
}

/// Produces a fresh, non-restartable fragment stream per call.
pub trait StreamSource {
    fn produce(&self, request: StreamRequest) -> TextStream;
}

/// Fold errors into the stream as a single trailing `Error:` fragment and
/// stop there.
#[must_use]
pub fn embed_errors(chunks: ChunkStream) -> TextStream {
    chunks
        .scan(false, |failed, item| {
            if *failed {
                return futures::future::ready(None);
            }
            let fragment = match item {
                Ok(text) => text,
                Err(err) => {
                    *failed = true;
                    format!("{ERROR_MARKER} {err}")
                }
            };
            futures::future::ready(Some(fragment))
        })
        .boxed_local()
}
