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

/// Hide a trailing, still-growing `## Title` line while a stream is live so a
/// half-typed header never flashes up as its own tab. Returns the input
/// unchanged once the stream has ended.
#[must_use]
pub fn stabilize(raw: &str, streaming: bool) -> &str {
    if !streaming {
        return raw;
    }
    let Some(newline) = raw.rfind('\n') else {
        return raw;
    };
    if is_partial_header(&raw[newline + 1..]) { &raw[..newline] } else { raw }
}

fn is_partial_header(tail: &str) -> bool {
    let Some(rest) = tail.strip_prefix("##") else {
        return false;
    };
    let rest = rest.strip_prefix(' ').unwrap_or(rest);
    rest.chars().all(|c| c.is_ascii_alphanumeric() || c == ' ')
}
