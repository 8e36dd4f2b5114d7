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

use crate::provider::Provider;
use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

const SETTINGS_DIR_NAME: &str = "visual-dictionary";
const SETTINGS_FILE: &str = "settings.json";
/// Checked in order when no Gemini key is stored.
const GEMINI_KEY_ENV: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// Provider credentials and model choice. Loaded once at startup, saved
/// whenever the user changes them, and handed to `ProviderRouter` by value.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub gemini_api_key: String,
    pub openrouter_api_key: String,
    pub cerebras_api_key: String,
    pub model: Provider,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("gemini_api_key", &redact(&self.gemini_api_key))
            .field("openrouter_api_key", &redact(&self.openrouter_api_key))
            .field("cerebras_api_key", &redact(&self.cerebras_api_key))
            .field("model", &self.model)
            .finish()
    }
}

fn redact(key: &str) -> &'static str {
    if key.is_empty() { "<unset>" } else { "<set>" }
}

impl Settings {
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(SETTINGS_DIR_NAME).join(SETTINGS_FILE))
    }

    /// Read settings from `path`. A missing file yields defaults; an
    /// unreadable or malformed one is an error.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no settings file; using defaults");
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to read settings {}", path.display()));
            }
        };
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse settings {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let content = serde_json::to_vec_pretty(self).context("failed to serialize settings")?;
        std::fs::write(path, content)
            .with_context(|| format!("failed to write settings {}", path.display()))?;
        tracing::info!(path = %path.display(), model = %self.model, "settings saved");
        Ok(())
    }

    /// Fill an empty Gemini key from the environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|name| std::env::var(name).ok());
    }

    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if !self.gemini_api_key.trim().is_empty() {
            return;
        }
        if let Some(key) = GEMINI_KEY_ENV
            .iter()
            .filter_map(|name| lookup(name))
            .find(|value| !value.trim().is_empty())
        {
            self.gemini_api_key = key.trim().to_owned();
        }
    }

    /// Configured credential for `provider`, if any.
    #[must_use]
    pub fn key_for(&self, provider: Provider) -> Option<&str> {
        let key = match provider {
            Provider::Gemini => &self.gemini_api_key,
            Provider::Grok => &self.openrouter_api_key,
            Provider::CerebrasGpt | Provider::CerebrasZai => &self.cerebras_api_key,
        };
        let key = key.trim();
        (!key.is_empty()).then_some(key)
    }

    pub fn set_key(&mut self, provider: Provider, key: &str) {
        let slot = match provider {
            Provider::Gemini => &mut self.gemini_api_key,
            Provider::Grok => &mut self.openrouter_api_key,
            Provider::CerebrasGpt | Provider::CerebrasZai => &mut self.cerebras_api_key,
        };
        key.trim().clone_into(slot);
    }
}
