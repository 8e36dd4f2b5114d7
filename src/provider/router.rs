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

use super::prompt::{IMAGE_PROMPT, definition_prompt};
use super::{ChunkStream, Provider, StreamError, StreamRequest, StreamSource, TextStream};
use super::embed_errors;
use crate::session::{EntryKind, ImageRef};
use crate::settings::Settings;
use base64::Engine as _;
use eventsource_stream::Eventsource as _;
use futures::{Stream, StreamExt as _};
use serde_json::{Value, json};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const GEMINI_TEXT_MODEL: &str = "gemini-2.5-flash-lite";
const GEMINI_VISION_MODEL: &str = "gemini-2.5-flash";

const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
const GROK_MODEL: &str = "x-ai/grok-4.1-fast:free";

const CEREBRAS_URL: &str = "https://api.cerebras.ai/v1/chat/completions";
const CEREBRAS_GPT_MODEL: &str = "gpt-oss-120b";
const CEREBRAS_ZAI_MODEL: &str = "zai-glm-4.6";

const APP_TITLE: &str = "Visual Dictionary";

type Extractor = fn(&Value) -> Option<String>;

/// HTTP-backed stream source. Holds a snapshot of the settings it was built
/// with; rebuild it after the settings change.
#[derive(Clone)]
pub struct ProviderRouter {
    http: reqwest::Client,
    settings: Settings,
}

impl ProviderRouter {
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self::with_client(reqwest::Client::new(), settings)
    }

    #[must_use]
    pub fn with_client(http: reqwest::Client, settings: Settings) -> Self {
        Self { http, settings }
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn credential(&self, provider: Provider) -> Result<String, StreamError> {
        self.settings
            .key_for(provider)
            .map(str::to_owned)
            .ok_or(StreamError::MissingCredential(provider))
    }

    /// Route one request to its backend. Images always go to the Gemini
    /// vision model; text follows the configured provider.
    async fn open(self, request: StreamRequest) -> Result<ChunkStream, StreamError> {
        if request.kind == EntryKind::Image {
            let image = request
                .image
                .ok_or_else(|| StreamError::Image("no image attached to the entry".to_owned()))?;
            return self.open_image(&image).await;
        }

        let prompt = definition_prompt(&request.label);
        let provider = self.settings.model;
        tracing::debug!(%provider, label = %request.label, "opening definition stream");
        match provider {
            Provider::Gemini => {
                let parts = json!([{ "text": prompt }]);
                self.open_gemini(GEMINI_TEXT_MODEL, parts).await
            }
            Provider::Grok => {
                let body = json!({
                    "model": GROK_MODEL,
                    "messages": [{ "role": "user", "content": prompt }],
                    "stream": true,
                });
                self.open_chat(provider, OPENROUTER_URL, body).await
            }
            Provider::CerebrasGpt => {
                let body = json!({
                    "model": CEREBRAS_GPT_MODEL,
                    "messages": [{ "role": "user", "content": prompt }],
                    "stream": true,
                    "max_completion_tokens": 65_536,
                    "temperature": 1,
                    "top_p": 1,
                });
                self.open_chat(provider, CEREBRAS_URL, body).await
            }
            Provider::CerebrasZai => {
                let body = json!({
                    "model": CEREBRAS_ZAI_MODEL,
                    "messages": [{ "role": "user", "content": prompt }],
                    "stream": true,
                    "max_completion_tokens": 40_960,
                    "temperature": 0.6,
                    "top_p": 0.95,
                });
                self.open_chat(provider, CEREBRAS_URL, body).await
            }
        }
    }

    async fn open_image(&self, image: &ImageRef) -> Result<ChunkStream, StreamError> {
        // Check the key first so a missing key is reported as such.
        self.credential(Provider::Gemini)?;
        let bytes = tokio::fs::read(&image.path)
            .await
            .map_err(|e| StreamError::Image(format!("{}: {e}", image.path.display())))?;
        let data = base64::engine::general_purpose::STANDARD.encode(bytes);
        let parts = json!([
            { "inlineData": { "mimeType": image.mime_type, "data": data } },
            { "text": IMAGE_PROMPT },
        ]);
        self.open_gemini(GEMINI_VISION_MODEL, parts).await
    }

    async fn open_gemini(&self, model: &str, parts: Value) -> Result<ChunkStream, StreamError> {
        let key = self.credential(Provider::Gemini)?;
        let url = format!("{GEMINI_BASE_URL}/{model}:streamGenerateContent?alt=sse");
        let body = json!({
            "contents": [{ "parts": parts }],
            "generationConfig": { "thinkingConfig": { "thinkingBudget": 0 } },
        });
        let response =
            self.http.post(url).header("x-goog-api-key", key).json(&body).send().await?;
        let response = check_status(response, Provider::Gemini.vendor()).await?;
        Ok(sse_chunks(response.bytes_stream(), Provider::Gemini.vendor(), gemini_text))
    }

    async fn open_chat(
        &self,
        provider: Provider,
        url: &str,
        body: Value,
    ) -> Result<ChunkStream, StreamError> {
        let key = self.credential(provider)?;
        let response = self
            .http
            .post(url)
            .bearer_auth(key)
            .header("X-Title", APP_TITLE)
            .json(&body)
            .send()
            .await?;
        let response = check_status(response, provider.vendor()).await?;
        Ok(sse_chunks(response.bytes_stream(), provider.vendor(), chat_delta))
    }
}

impl StreamSource for ProviderRouter {
    fn produce(&self, request: StreamRequest) -> TextStream {
        let opened = futures::stream::once(self.clone().open(request))
            .flat_map(|opened| match opened {
                Ok(chunks) => chunks,
                Err(err) => futures::stream::iter([Err(err)]).boxed_local(),
            })
            .boxed_local();
        embed_errors(opened)
    }
}

async fn check_status(
    response: reqwest::Response,
    vendor: &'static str,
) -> Result<reqwest::Response, StreamError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|value| error_message(&value))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_owned());
    Err(StreamError::Upstream { vendor, message })
}

fn error_message(value: &Value) -> Option<String> {
    let error = value.get("error")?;
    error
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| error.as_str())
        .map(str::to_owned)
}

fn sse_chunks<S, B>(bytes: S, vendor: &'static str, extract: Extractor) -> ChunkStream
where
    S: Stream<Item = Result<B, reqwest::Error>> + 'static,
    B: AsRef<[u8]>,
{
    bytes
        .eventsource()
        .filter_map(move |event| {
            let item = match event {
                Ok(event) => decode_payload(&event.data, vendor, extract),
                Err(err) => Some(Err(StreamError::Transport(err.to_string()))),
            };
            futures::future::ready(item)
        })
        .boxed_local()
}

fn decode_payload(
    payload: &str,
    vendor: &'static str,
    extract: Extractor,
) -> Option<Result<String, StreamError>> {
    let payload = payload.trim();
    if payload.is_empty() || payload == "[DONE]" {
        return None;
    }
    let value: Value = match serde_json::from_str(payload) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(vendor, "skipping malformed stream chunk: {err}");
            return None;
        }
    };
    if let Some(message) = error_message(&value) {
        return Some(Err(StreamError::Upstream { vendor, message }));
    }
    extract(&value).filter(|text| !text.is_empty()).map(Ok)
}

fn chat_delta(value: &Value) -> Option<String> {
    value.pointer("/choices/0/delta/content").and_then(Value::as_str).map(str::to_owned)
}

fn gemini_text(value: &Value) -> Option<String> {
    let parts = value.pointer("/candidates/0/content/parts")?.as_array()?;
    let text: String = parts.iter().filter_map(|p| p.get("text").and_then(Value::as_str)).collect();
    Some(text)
}
