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

/// Characters stripped from both ends of a word to form its click target.
const PUNCTUATION: &[char] =
    &['.', ',', '!', '?', ';', ':', '(', ')', '"', '\'', '\u{201c}', '\u{201d}', '\u{2018}', '\u{2019}'];

/// One renderable piece of a section body. Whitespace runs are kept as their
/// own fragments so concatenating every `text` reproduces the body exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment<'a> {
    pub text: &'a str,
    /// Canonical lookup term when the fragment is clickable.
    pub clickable_word: Option<&'a str>,
}

impl Fragment<'_> {
    #[must_use]
    pub fn is_clickable(&self) -> bool {
        self.clickable_word.is_some()
    }
}

/// Lazy fragment iterator over a section body. Cloning restarts nothing and
/// shares nothing, so re-tokenizing on every render is fine.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Fragment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let first = self.rest.chars().next()?;
        let whitespace = first.is_whitespace();
        let end = self
            .rest
            .find(|c: char| c.is_whitespace() != whitespace)
            .unwrap_or(self.rest.len());
        let (text, rest) = self.rest.split_at(end);
        self.rest = rest;

        let clickable_word =
            if whitespace { None } else { Some(clean_word(text)).filter(|w| !w.is_empty()) };
        Some(Fragment { text, clickable_word })
    }
}

#[must_use]
pub fn tokenize(body: &str) -> Tokens<'_> {
    Tokens { rest: body }
}

/// Strip surrounding punctuation and quotes. Inner characters such as the
/// apostrophe in `don't` are kept.
#[must_use]
pub fn clean_word(word: &str) -> &str {
    word.trim_matches(PUNCTUATION)
}
