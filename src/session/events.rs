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

use super::entry::EntryId;
use super::failure::ERROR_MARKER;
use crate::provider::TextStream;
use futures::StreamExt as _;
use tokio::sync::mpsc;

/// Identifies which (generation, slot, entry) a stream task writes to. The
/// session compares all three before applying an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamTicket {
    pub generation: u64,
    pub index: usize,
    pub entry_id: EntryId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEventKind {
    /// Next text fragment, in source order.
    Chunk(String),
    /// Source ended without an error marker.
    Finished,
    /// Source yielded an `Error:` fragment; carries that fragment verbatim.
    Failed(String),
}

/// Message sent from a per-entry stream task back to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEvent {
    pub ticket: StreamTicket,
    pub kind: StreamEventKind,
}

/// Run one entry's stream on the local task set. The task always ends with
/// exactly one `Finished` or `Failed` event unless the session is gone.
pub(super) fn spawn_stream(
    stream: TextStream,
    ticket: StreamTicket,
    event_tx: mpsc::UnboundedSender<StreamEvent>,
) {
    tokio::task::spawn_local(pump_stream(stream, ticket, event_tx));
}

async fn pump_stream(
    mut stream: TextStream,
    ticket: StreamTicket,
    event_tx: mpsc::UnboundedSender<StreamEvent>,
) {
    while let Some(chunk) = stream.next().await {
        let kind = if chunk.starts_with(ERROR_MARKER) {
            StreamEventKind::Failed(chunk)
        } else {
            StreamEventKind::Chunk(chunk)
        };
        let terminal = matches!(kind, StreamEventKind::Failed(_));
        if event_tx.send(StreamEvent { ticket, kind }).is_err() {
            tracing::debug!(index = ticket.index, "session gone; stopping stream task");
            return;
        }
        if terminal {
            return;
        }
    }
    let _ = event_tx.send(StreamEvent { ticket, kind: StreamEventKind::Finished });
}
