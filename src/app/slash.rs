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
use std::path::PathBuf;

/// One line of REPL input, resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Anything that is not a slash command is a lookup.
    Search(String),
    Back,
    Forward,
    /// Zero-based history index.
    Jump(usize),
    Tab(String),
    Click(String),
    /// List the clickable words of the active tab.
    Words,
    /// Zero-based index into the related topics.
    Related(usize),
    Random,
    Image(PathBuf),
    ToggleFavorite,
    ListFavorites,
    /// Zero-based index into the last favorites listing.
    OpenFavorite(usize),
    Model(Provider),
    Key { provider: Provider, key: String },
    Reset { confirmed: bool },
    Show,
    Help,
    Quit,
    Invalid(String),
}

pub const HELP: &str = "\
<term>                 look up a term
/click <word>          look up a word from the current tab
/words                 list the clickable words of the current tab
/related <n>           follow related topic n
/tab <name>            switch section tab
/back  /forward        move through history
/jump <n>              jump to history entry n
/random                look up a random concept
/image <path>          analyze an image
/fav                   save or unsave the current entry
/favs  /open <n>       list favorites, open favorite n
/model <name>          gemini | grok | cerebras-gpt | cerebras-zai
/key <provider> <key>  store an API key
/reset                 wipe the session (asks for confirmation)
/show  /help  /quit";

#[derive(Debug, Clone, PartialEq, Eq)]
struct ParsedSlash<'a> {
    name: &'a str,
    args: Vec<&'a str>,
    /// Everything after the command name, untrimmed inside.
    rest: &'a str,
}

fn parse(text: &str) -> Option<ParsedSlash<'_>> {
    let trimmed = text.trim();
    if !trimmed.starts_with('/') {
        return None;
    }
    let mut parts = trimmed.split_whitespace();
    let name = parts.next()?;
    let rest = trimmed[name.len()..].trim();
    Some(ParsedSlash { name, args: parts.collect(), rest })
}

/// Parse a 1-based position argument into a zero-based index.
fn position(arg: Option<&&str>) -> Option<usize> {
    arg?.parse::<usize>().ok()?.checked_sub(1)
}

#[must_use]
pub fn parse_command(text: &str) -> Command {
    let Some(parsed) = parse(text) else {
        return Command::Search(text.trim().to_owned());
    };
    let usage = |hint: &str| Command::Invalid(format!("usage: {} {hint}", parsed.name));

    match parsed.name {
        "/back" | "/b" => Command::Back,
        "/forward" | "/f" => Command::Forward,
        "/jump" => position(parsed.args.first()).map_or_else(|| usage("<n>"), Command::Jump),
        "/tab" if !parsed.rest.is_empty() => Command::Tab(parsed.rest.to_owned()),
        "/tab" => usage("<name>"),
        "/click" if !parsed.rest.is_empty() => Command::Click(parsed.rest.to_owned()),
        "/click" => usage("<word>"),
        "/words" | "/w" => Command::Words,
        "/related" => position(parsed.args.first()).map_or_else(|| usage("<n>"), Command::Related),
        "/random" => Command::Random,
        "/image" if !parsed.rest.is_empty() => Command::Image(PathBuf::from(parsed.rest)),
        "/image" => usage("<path>"),
        "/fav" => Command::ToggleFavorite,
        "/favs" => Command::ListFavorites,
        "/open" => {
            position(parsed.args.first()).map_or_else(|| usage("<n>"), Command::OpenFavorite)
        }
        "/model" => match parsed.args.first().map(|m| m.parse::<Provider>()) {
            Some(Ok(provider)) => Command::Model(provider),
            Some(Err(message)) => Command::Invalid(message),
            None => usage("<name>"),
        },
        "/key" => match (parsed.args.first(), parsed.args.get(1)) {
            (Some(provider), Some(key)) => match provider.parse::<Provider>() {
                Ok(provider) => Command::Key { provider, key: (*key).to_owned() },
                Err(message) => Command::Invalid(message),
            },
            _ => usage("<provider> <key>"),
        },
        "/reset" => Command::Reset { confirmed: parsed.args.first() == Some(&"confirm") },
        "/show" => Command::Show,
        "/help" | "/?" => Command::Help,
        "/quit" | "/exit" | "/q" => Command::Quit,
        other => Command::Invalid(format!("unknown command {other}; try /help")),
    }
}
