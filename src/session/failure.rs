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

use super::entry::{Failure, FailureKind};

/// Literal prefix a stream source uses to report a failure in-band.
pub const ERROR_MARKER: &str = "Error:";

/// Build a `Failure` from an in-band error fragment such as
/// `"Error: Gemini API Key is missing. Please add it in the Settings."`.
pub fn failure_from_chunk(chunk: &str) -> Failure {
    let message = chunk.strip_prefix(ERROR_MARKER).unwrap_or(chunk).trim();
    let message = if message.is_empty() { "An unknown error occurred" } else { message };
    Failure { kind: classify_failure(message), message: message.to_owned() }
}

pub fn classify_failure(message: &str) -> FailureKind {
    let lower = message.to_ascii_lowercase();
    if looks_like_credential_error_lower(&lower) {
        FailureKind::MissingCredential
    } else {
        FailureKind::Stream
    }
}

fn looks_like_credential_error_lower(lower: &str) -> bool {
    ["api key", "api_key", "apikey", "credential", "unauthorized", "401"]
        .iter()
        .any(|needle| lower.contains(needle))
}
