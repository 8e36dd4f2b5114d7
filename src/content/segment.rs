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

//! Splits a model response into named sections and a trailing list of
//! related topics.

pub const GENERAL_TITLE: &str = "General";
const RELATED_TITLE: &str = "related";
const HEADER_PREFIX: &str = "## ";

/// A named block of explanatory text under one `## Title` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub body: String,
}

impl Section {
    #[must_use]
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self { title: title.into(), body: body.into() }
    }
}

/// Structured view of one response. Always recomputed from the raw text,
/// never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDocument {
    /// Sections in order of first appearance, `General` first when present.
    pub sections: Vec<Section>,
    /// Follow-up topics collected from `## Related` sections.
    pub related: Vec<String>,
}

impl ParsedDocument {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty() && self.related.is_empty()
    }

    /// Case-insensitive section lookup.
    #[must_use]
    pub fn section(&self, title: &str) -> Option<&Section> {
        self.sections.iter().find(|s| same_title(&s.title, title))
    }

    fn push_section(&mut self, title: &str, body: &str) {
        if let Some(existing) = self.sections.iter_mut().find(|s| same_title(&s.title, title)) {
            existing.body.push_str("\n\n");
            existing.body.push_str(body);
        } else {
            self.sections.push(Section::new(title, body));
        }
    }
}

struct Header<'a> {
    title: &'a str,
    /// Byte offset of the `##` marker.
    line_start: usize,
    /// Byte offset just past the header line (including its newline).
    body_start: usize,
}

/// Segment raw response text into sections. Never fails: text without any
/// header markers degrades to a single `General` section.
#[must_use]
pub fn segment(raw: &str) -> ParsedDocument {
    let headers = find_headers(raw);
    let mut doc = ParsedDocument::default();

    let Some(first) = headers.first() else {
        let body = raw.trim();
        if !body.is_empty() {
            doc.sections.push(Section::new(GENERAL_TITLE, body));
        }
        return doc;
    };

    let preamble = raw[..first.line_start].trim();
    if !preamble.is_empty() {
        doc.push_section(GENERAL_TITLE, preamble);
    }

    for (i, header) in headers.iter().enumerate() {
        let body_end = headers.get(i + 1).map_or(raw.len(), |next| next.line_start);
        let body = raw[header.body_start..body_end].trim();
        let title = header.title.trim();

        if same_title(title, RELATED_TITLE) {
            doc.related.extend(related_items(body));
        } else if title.is_empty() {
            doc.push_section(GENERAL_TITLE, body);
        } else {
            doc.push_section(title, body);
        }
    }

    doc
}

fn find_headers(raw: &str) -> Vec<Header<'_>> {
    let mut headers = Vec::new();
    let mut offset = 0usize;
    for line in raw.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();
        let content = line.trim_end_matches(['\n', '\r']);
        if let Some(title) = content.strip_prefix(HEADER_PREFIX) {
            headers.push(Header { title, line_start, body_start: offset });
        }
    }
    headers
}

fn related_items(body: &str) -> impl Iterator<Item = String> + '_ {
    body.lines().map(strip_bullet).filter(|item| !item.is_empty()).map(str::to_owned)
}

fn strip_bullet(line: &str) -> &str {
    let line = line.trim();
    let mut chars = line.chars();
    match (chars.next(), chars.next()) {
        (Some('-' | '*'), Some(next)) if next.is_whitespace() => line[1..].trim(),
        _ => line,
    }
}

fn same_title(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn text_without_headers_is_a_single_general_section() {
        let doc = segment("  Entropy is disorder.\n\nMostly.  ");
        assert_eq!(doc.sections, vec![Section::new("General", "Entropy is disorder.\n\nMostly.")]);
        assert!(doc.related.is_empty());
    }

    #[test]
    fn empty_input_has_no_sections() {
        assert_eq!(segment(""), ParsedDocument::default());
        assert_eq!(segment(" \n\t "), ParsedDocument::default());
    }

    #[test]
    fn preamble_sections_and_related() {
        let doc = segment("Intro\n## Usage\nBody1\n## Related\n- A\n- B");
        assert_eq!(
            doc.sections,
            vec![Section::new("General", "Intro"), Section::new("Usage", "Body1")]
        );
        assert_eq!(doc.related, vec!["A".to_owned(), "B".to_owned()]);
    }

    #[test]
    fn case_variant_titles_are_merged() {
        let doc = segment("## Usage\nX\n## usage\nY");
        assert_eq!(doc.sections, vec![Section::new("Usage", "X\n\nY")]);
    }

    #[test]
    fn explicit_general_header_merges_with_preamble() {
        let doc = segment("Lead in\n## General\nBroad definition\n## Physics\nHeat death");
        assert_eq!(doc.sections.len(), 2);
        assert_eq!(doc.sections[0].body, "Lead in\n\nBroad definition");
        assert_eq!(doc.sections[1].title, "Physics");
    }

    #[test]
    fn related_never_becomes_a_section_and_accumulates() {
        let doc = segment("## RELATED\n* One\n\n-  Two \n## Math\nm\n## related\n- Three");
        assert!(doc.section("related").is_none());
        assert_eq!(doc.related, vec!["One", "Two", "Three"]);
        assert_eq!(doc.sections, vec![Section::new("Math", "m")]);
    }

    #[test]
    fn bullet_requires_following_whitespace() {
        let doc = segment("## Related\n**Bold** topic\n- plain");
        assert_eq!(doc.related, vec!["**Bold** topic", "plain"]);
    }

    #[test]
    fn deeper_headers_stay_in_body() {
        let doc = segment("## Physics\n### Thermo\ntext\n##NoSpace");
        assert_eq!(doc.sections, vec![Section::new("Physics", "### Thermo\ntext\n##NoSpace")]);
    }

    #[test]
    fn empty_header_title_folds_into_general() {
        let doc = segment("Lead\n## \nOrphan body\n## Art\nPaint");
        assert_eq!(
            doc.sections,
            vec![Section::new("General", "Lead\n\nOrphan body"), Section::new("Art", "Paint")]
        );
    }

    #[test]
    fn header_on_last_line_has_empty_body() {
        let doc = segment("Intro\r\n## History\r\n");
        assert_eq!(
            doc.sections,
            vec![Section::new("General", "Intro"), Section::new("History", "")]
        );
    }

    #[test]
    fn segment_is_deterministic() {
        let raw = "a\n## B\nb\n## b\nc\n## Related\n- x";
        assert_eq!(segment(raw), segment(raw));
    }

    #[test]
    fn section_lookup_ignores_case() {
        let doc = segment("## Computer Science\nbits");
        assert_eq!(doc.section("computer science").map(|s| s.body.as_str()), Some("bits"));
        assert!(!doc.is_empty());
    }
}
