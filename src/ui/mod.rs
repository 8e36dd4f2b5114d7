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

//! Plain-text rendering of a session for line-oriented terminals.

mod tabs;

pub use tabs::{TabView, is_section_streaming};

use crate::content::{self, ParsedDocument};
use crate::session::{EntryKind, EntryStatus, Session};
use std::fmt::Write as _;

const RELATED_HEADING: &str = "DOWN THE RABBIT HOLE";
const STREAMING_CURSOR: char = '|';

/// Render a document: tab strip, the active tab's body, then the related
/// topics.
#[must_use]
pub fn render_document(doc: &ParsedDocument, tabs: &TabView, streaming: bool) -> String {
    let mut out = String::new();
    let Some(active) = tabs.active_section(doc) else {
        return out;
    };

    let strip: Vec<String> = doc
        .sections
        .iter()
        .map(|s| {
            let title = s.title.to_uppercase();
            if s.title == active.title { format!("[{title}]") } else { title }
        })
        .collect();
    let _ = writeln!(out, "{}", strip.join("  "));
    out.push('\n');

    let section_streaming = is_section_streaming(doc, active, streaming);
    let body = content::stabilize(&active.body, section_streaming);
    for fragment in content::tokenize(body) {
        out.push_str(fragment.text);
    }
    if section_streaming {
        out.push(STREAMING_CURSOR);
    }
    out.push('\n');

    if !doc.related.is_empty() {
        let _ = writeln!(out, "\n{RELATED_HEADING}");
        for (i, topic) in doc.related.iter().enumerate() {
            let _ = writeln!(out, "  {}. {topic}", i + 1);
        }
    }
    out
}

/// One-line history strip: `Entropy > [Chaos] > Void`, future entries dimmed
/// with parentheses.
#[must_use]
pub fn render_history(session: &Session) -> String {
    let cursor = session.cursor();
    session
        .entries()
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let marker = if entry.kind == EntryKind::Image { "*" } else { "" };
            let label = format!("{marker}{}", entry.label);
            match cursor {
                Some(c) if c == i => format!("[{label}]"),
                Some(c) if i > c => format!("({label})"),
                _ => label,
            }
        })
        .collect::<Vec<_>>()
        .join(" > ")
}

/// Full screen for the active entry.
#[must_use]
pub fn render_session(session: &Session, tabs: &mut TabView) -> String {
    let Some(entry) = session.current() else {
        return "VISUAL LEARNING TERMINAL\nSearch a term, /random, or /image <path> to begin.\n"
            .to_owned();
    };

    let mut out = String::new();
    let _ = writeln!(out, "{}", render_history(session));
    let _ = writeln!(out, "\n== {} ==", entry.label.to_uppercase());

    if let EntryStatus::Failed(failure) = &entry.status {
        let _ = writeln!(out, "SYSTEM ERROR\n{}", failure.message);
        return out;
    }

    let doc = session.document().unwrap_or_default();
    if doc.is_empty() {
        out.push_str("...\n");
        return out;
    }
    tabs.sync(&doc);
    out.push_str(&render_document(&doc, tabs, entry.is_streaming()));
    out
}

/// Clickable words of the active tab, in order, for `/click`.
#[must_use]
pub fn clickable_words(doc: &ParsedDocument, tabs: &TabView) -> Vec<String> {
    tabs.active_section(doc)
        .map(|section| {
            content::tokenize(&section.body)
                .filter_map(|f| f.clickable_word.map(str::to_owned))
                .collect()
        })
        .unwrap_or_default()
}
