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

pub mod app;
pub mod content;
pub mod error;
pub mod favorites;
pub mod provider;
pub mod session;
pub mod settings;
pub mod ui;

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "vdict", about = "Streaming visual dictionary for the terminal")]
pub struct Cli {
    /// Term to look up on startup
    pub query: Option<String>,

    /// Override the stored model (gemini, grok, cerebras-gpt, cerebras-zai)
    #[arg(long, short)]
    pub model: Option<provider::Provider>,

    /// Print the lookup for QUERY and exit instead of starting the REPL
    #[arg(long, requires = "query")]
    pub once: bool,

    /// Settings file (defaults to the platform config directory)
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Base URL of a favorites service; favorites stay in memory without it
    #[arg(long)]
    pub favorites_url: Option<String>,

    /// Write tracing diagnostics to a file (disabled unless explicitly set)
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Tracing filter directives (example: `info,visual_dictionary::provider=debug`)
    /// Falls back to `RUST_LOG` when omitted.
    #[arg(long, value_name = "FILTER")]
    pub log_filter: Option<String>,

    /// Append to --log-file instead of truncating on startup
    #[arg(long)]
    pub log_append: bool,
}
