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

mod segment;
mod stabilize;
mod tokenize;

pub use segment::{GENERAL_TITLE, ParsedDocument, Section, segment};
pub use stabilize::stabilize;
pub use tokenize::{Fragment, Tokens, clean_word, tokenize};

/// Structured view of raw response text; a pure function of its inputs.
#[must_use]
pub fn parse(raw: &str, streaming: bool) -> ParsedDocument {
    segment(stabilize(raw, streaming))
}

#[cfg(test)]
mod tests {
    use super::parse;

    #[test]
    fn streaming_parse_hides_partial_tab() {
        let raw = "## General\nDisorder.\n## Phys";
        let live = parse(raw, true);
        assert_eq!(live.sections.len(), 1);
        let done = parse(raw, false);
        assert_eq!(done.sections.len(), 2);
        assert_eq!(done.sections[1].title, "Phys");
    }
}
