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

use crate::content::{ParsedDocument, Section};

/// Which section tab is showing. Survives re-parses while the document grows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabView {
    active: Option<String>,
}

impl TabView {
    #[must_use]
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Keep the active tab if the document still has it, otherwise fall back
    /// to the first section (e.g. after a new search).
    pub fn sync(&mut self, doc: &ParsedDocument) {
        let still_there = self
            .active
            .as_deref()
            .is_some_and(|title| doc.sections.iter().any(|s| s.title == title));
        if !still_there {
            self.active = doc.sections.first().map(|s| s.title.clone());
        }
    }

    /// Select a tab by case-insensitive title. Returns false if no such tab.
    pub fn select(&mut self, doc: &ParsedDocument, title: &str) -> bool {
        match doc.section(title) {
            Some(section) => {
                self.active = Some(section.title.clone());
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn active_section<'d>(&self, doc: &'d ParsedDocument) -> Option<&'d Section> {
        self.active
            .as_deref()
            .and_then(|title| doc.sections.iter().find(|s| s.title == title))
            .or_else(|| doc.sections.first())
    }
}

/// Only the last section can still be receiving text.
#[must_use]
pub fn is_section_streaming(doc: &ParsedDocument, section: &Section, streaming: bool) -> bool {
    streaming && doc.sections.last().is_some_and(|last| std::ptr::eq(last, section))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::segment;

    #[test]
    fn sync_picks_first_tab_and_keeps_selection() {
        let mut tabs = TabView::default();
        let doc = segment("## General\ng\n## Physics\np");
        tabs.sync(&doc);
        assert_eq!(tabs.active(), Some("General"));

        assert!(tabs.select(&doc, "physics"));
        let grown = segment("## General\ng\n## Physics\np more\n## Art\na");
        tabs.sync(&grown);
        assert_eq!(tabs.active(), Some("Physics"));

        let other = segment("## Usage\nu");
        tabs.sync(&other);
        assert_eq!(tabs.active(), Some("Usage"));
        assert!(!tabs.select(&other, "Physics"));
    }

    #[test]
    fn only_the_last_section_streams() {
        let doc = segment("## A\na\n## B\nb");
        assert!(!is_section_streaming(&doc, &doc.sections[0], true));
        assert!(is_section_streaming(&doc, &doc.sections[1], true));
        assert!(!is_section_streaming(&doc, &doc.sections[1], false));
    }
}
