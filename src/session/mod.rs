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

mod entry;
mod events;
mod failure;
mod state;

pub use entry::{EntryId, EntryKind, EntryStatus, Failure, FailureKind, HistoryEntry, ImageRef};
pub use events::{StreamEvent, StreamEventKind, StreamTicket};
pub use failure::{ERROR_MARKER, classify_failure};
pub use state::{Applied, IMAGE_LABEL, RANDOM_CONCEPTS, Session};
