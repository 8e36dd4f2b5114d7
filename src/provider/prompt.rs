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

/// Instruction sent ahead of every text lookup. The response shape it asks
/// for (`## General` first, `## Field` sections, a closing `## Related`
/// bullet list) is what the content segmenter expects.
const DEFINITION_PROMPT: &str = "\
You are a sharp, candid collaborator with no patience for fluff. Think before you speak, \
say plainly when you are unsure, and never invent sources, quotes or statistics.

TASK:
Explain the term below.
CRITICAL: Break the explanation into distinct fields or perspectives where they apply \
(e.g. Physics, Philosophy, Common Usage, Computer Science).
Use Markdown headers (## Field Name) to separate these sections.
Always start with a \"## General\" section for the broad definition.
At the very end, add a \"## Related\" section.
In that section, list exactly 5 related topics or \"rabbit holes\" that are intriguing follow-ups.
Format them as a simple bulleted list.
Keep each section relatively concise (one paragraph preferred).
TERM:";

pub const IMAGE_PROMPT: &str = "\
Analyze this image. First, describe the physical reality: surroundings, sky color, nature, \
lighting, and atmosphere. Then, pivot to the abstract: explain the deeper meaning, intent, or \
emotional resonance of the image. Why does it exist? Be direct. Avoid fluff. Write a cohesive \
paragraph.";

#[must_use]
pub fn definition_prompt(term: &str) -> String {
    format!("{DEFINITION_PROMPT} \"{term}\"")
}
