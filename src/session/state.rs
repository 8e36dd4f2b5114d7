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

use super::entry::{EntryId, EntryKind, EntryStatus, Failure, HistoryEntry, ImageRef};
use super::events::{StreamEvent, StreamEventKind, StreamTicket, spawn_stream};
use super::failure::failure_from_chunk;
use crate::content::{self, ParsedDocument};
use crate::provider::{StreamRequest, StreamSource};
use rand::Rng;
use rand::seq::SliceRandom as _;
use std::path::PathBuf;
use std::rc::Rc;
use tokio::sync::mpsc;

/// Label given to the entry created by an image upload.
pub const IMAGE_LABEL: &str = "Visual Analysis";

/// Pool for `pick_random`.
pub const RANDOM_CONCEPTS: &[&str] = &["Paradox", "Entropy", "Recursion", "Silence", "Chaos", "Void"];

/// What `Session::apply` did with a stream event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The event belonged to an entry that no longer exists (reset or
    /// truncated away) and was ignored.
    Dropped,
    /// Content of the entry at `index` grew.
    Updated { index: usize },
    /// The entry at `index` reached `Complete` or `Failed`.
    Settled { index: usize },
}

/// Navigable lookup history plus the per-entry stream bookkeeping.
///
/// The session is the only writer of entry content. Stream tasks run on the
/// local task set and report back over `event_rx`; call `apply` (or
/// `drain_events` / `settle`) to fold their output in.
pub struct Session {
    entries: Vec<HistoryEntry>,
    /// `None` iff `entries` is empty.
    cursor: Option<usize>,
    /// Bumped by `reset` so writes from pre-reset streams are discarded.
    generation: u64,
    next_id: u64,
    root_image: Option<ImageRef>,
    source: Rc<dyn StreamSource>,
    event_tx: mpsc::UnboundedSender<StreamEvent>,
    event_rx: mpsc::UnboundedReceiver<StreamEvent>,
}

impl Session {
    #[must_use]
    pub fn new(source: Rc<dyn StreamSource>) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        Self {
            entries: Vec::new(),
            cursor: None,
            generation: 0,
            next_id: 1,
            root_image: None,
            source,
            event_tx,
            event_rx,
        }
    }

    /// Swap the stream source used for streams started from now on. Streams
    /// already in flight keep the source they were started with.
    pub fn set_source(&mut self, source: Rc<dyn StreamSource>) {
        self.source = source;
    }

    #[must_use]
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    #[must_use]
    pub fn current(&self) -> Option<&HistoryEntry> {
        self.cursor.and_then(|i| self.entries.get(i))
    }

    #[must_use]
    pub fn status(&self, index: usize) -> Option<&EntryStatus> {
        self.entries.get(index).map(|e| &e.status)
    }

    /// Failure of the active entry. Background failures stay silent until the
    /// user navigates to them.
    #[must_use]
    pub fn current_error(&self) -> Option<&Failure> {
        match &self.current()?.status {
            EntryStatus::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    #[must_use]
    pub fn root_image(&self) -> Option<&ImageRef> {
        self.root_image.as_ref()
    }

    #[must_use]
    pub fn can_go_back(&self) -> bool {
        self.cursor.is_some_and(|c| c > 0)
    }

    #[must_use]
    pub fn can_go_forward(&self) -> bool {
        self.cursor.is_some_and(|c| c + 1 < self.entries.len())
    }

    /// True when no entry is waiting on its stream.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        !self.entries.iter().any(HistoryEntry::is_streaming)
    }

    /// Structured view of the active entry, stabilized while it streams.
    #[must_use]
    pub fn document(&self) -> Option<ParsedDocument> {
        let entry = self.current()?;
        Some(content::parse(entry.content.as_deref().unwrap_or_default(), entry.is_streaming()))
    }

    // -- mutations ---------------------------------------------------------

    pub fn submit(&mut self, query: &str) -> bool {
        self.append(query, EntryKind::Text, None, None)
    }

    /// Open a previously saved lookup. Cached content completes the entry
    /// immediately without touching the stream source.
    pub fn open_saved(&mut self, label: &str, content: Option<String>, kind: EntryKind) -> bool {
        self.append(label, kind, None, content)
    }

    pub fn click_word(&mut self, word: &str) -> bool {
        self.append(word, EntryKind::Text, None, None)
    }

    pub fn pick_random(&mut self) -> bool {
        self.pick_random_with(&mut rand::thread_rng())
    }

    pub fn pick_random_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        let Some(concept) = RANDOM_CONCEPTS.choose(rng) else {
            return false;
        };
        self.append(concept, EntryKind::Text, None, None)
    }

    /// Start a visual analysis of the image at `path`. The image becomes the
    /// session's root image until `reset`.
    pub fn upload_image(&mut self, path: impl Into<PathBuf>) -> bool {
        let image = ImageRef::from_path(path);
        if !self.append(IMAGE_LABEL, EntryKind::Image, Some(image.clone()), None) {
            return false;
        }
        if let Some(previous) = self.root_image.replace(image) {
            tracing::debug!(path = %previous.path.display(), "replaced root image");
        }
        true
    }

    pub fn back(&mut self) -> bool {
        match self.cursor {
            Some(c) if c > 0 => {
                self.cursor = Some(c - 1);
                true
            }
            _ => false,
        }
    }

    pub fn forward(&mut self) -> bool {
        match self.cursor {
            Some(c) if c + 1 < self.entries.len() => {
                self.cursor = Some(c + 1);
                true
            }
            _ => false,
        }
    }

    /// Move the cursor to `index`, lazily (re)starting the stream of an entry
    /// that has no content and is not already streaming.
    pub fn jump_to(&mut self, index: usize) -> bool {
        if index >= self.entries.len() {
            return false;
        }
        self.cursor = Some(index);
        self.start_streaming(index);
        true
    }

    /// Wipe the whole session. Confirmation is the caller's job. Streams that
    /// are still running are not cancelled; their writes are discarded.
    pub fn reset(&mut self) {
        let discarded = self.entries.len();
        self.entries.clear();
        self.cursor = None;
        self.generation += 1;
        if let Some(image) = self.root_image.take() {
            tracing::debug!(path = %image.path.display(), "released root image");
        }
        tracing::info!(discarded, generation = self.generation, "session reset");
    }

    fn append(
        &mut self,
        label: &str,
        kind: EntryKind,
        image: Option<ImageRef>,
        content: Option<String>,
    ) -> bool {
        let label = label.trim();
        if label.is_empty() {
            return false;
        }
        if self.current().is_some_and(|current| current.matches_label(label)) {
            tracing::debug!(label, "lookup matches the active entry; ignoring");
            return false;
        }

        let keep = self.cursor.map_or(0, |c| c + 1);
        if keep < self.entries.len() {
            tracing::debug!(discarded = self.entries.len() - keep, "truncating forward history");
            self.entries.truncate(keep);
        }

        let id = EntryId(self.next_id);
        self.next_id += 1;
        self.entries.push(HistoryEntry {
            id,
            label: label.to_owned(),
            kind,
            image,
            content,
            status: EntryStatus::Pending,
        });
        let index = self.entries.len() - 1;
        self.cursor = Some(index);
        self.start_streaming(index);
        true
    }

    fn start_streaming(&mut self, index: usize) {
        let Some(entry) = self.entries.get_mut(index) else {
            return;
        };
        if entry.is_streaming() {
            return;
        }
        if entry.has_content() {
            // Cached content completes a fresh entry; settled ones keep their status.
            if entry.status == EntryStatus::Pending {
                entry.status = EntryStatus::Complete;
            }
            return;
        }

        entry.status = EntryStatus::Streaming;
        entry.content = Some(String::new());
        let request =
            StreamRequest { label: entry.label.clone(), kind: entry.kind, image: entry.image.clone() };
        let ticket = StreamTicket { generation: self.generation, index, entry_id: entry.id };
        tracing::debug!(index, label = %request.label, "starting stream");

        let stream = self.source.produce(request);
        spawn_stream(stream, ticket, self.event_tx.clone());
    }

    // -- stream events -----------------------------------------------------

    /// Fold one stream event into its entry. Events from streams orphaned by
    /// `reset` or by forward-history truncation are dropped.
    pub fn apply(&mut self, event: StreamEvent) -> Applied {
        let StreamEvent { ticket, kind } = event;
        if ticket.generation != self.generation {
            tracing::warn!(index = ticket.index, "dropping write from a stream orphaned by reset");
            return Applied::Dropped;
        }
        let Some(entry) =
            self.entries.get_mut(ticket.index).filter(|entry| entry.id == ticket.entry_id)
        else {
            tracing::warn!(index = ticket.index, "dropping write for a discarded entry");
            return Applied::Dropped;
        };
        if !entry.is_streaming() {
            tracing::warn!(index = ticket.index, "dropping write for an entry that is not streaming");
            return Applied::Dropped;
        }

        let index = ticket.index;
        match kind {
            StreamEventKind::Chunk(text) => {
                entry.content.get_or_insert_with(String::new).push_str(&text);
                Applied::Updated { index }
            }
            StreamEventKind::Finished => {
                entry.content.get_or_insert_with(String::new);
                entry.status = EntryStatus::Complete;
                tracing::debug!(index, label = %entry.label, "stream complete");
                Applied::Settled { index }
            }
            StreamEventKind::Failed(chunk) => {
                let failure = failure_from_chunk(&chunk);
                tracing::error!(index, label = %entry.label, "stream failed: {}", failure.message);
                entry.content = Some(chunk);
                entry.status = EntryStatus::Failed(failure);
                Applied::Settled { index }
            }
        }
    }

    /// Wait for the next event from any stream task.
    pub async fn next_event(&mut self) -> Option<StreamEvent> {
        self.event_rx.recv().await
    }

    /// Apply every event that is already queued. Returns how many were applied.
    pub fn drain_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.event_rx.try_recv() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    /// Keep applying events until no entry is streaming.
    pub async fn settle(&mut self) {
        while !self.is_idle() {
            let Some(event) = self.event_rx.recv().await else {
                break;
            };
            self.apply(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::TextStream;
    use futures::StreamExt as _;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng as _;
    use std::cell::RefCell;

    /// Replays `chunks` for every request and records what was asked for.
    struct Replay {
        chunks: Vec<&'static str>,
        requests: RefCell<Vec<StreamRequest>>,
    }

    impl StreamSource for Replay {
        fn produce(&self, request: StreamRequest) -> TextStream {
            self.requests.borrow_mut().push(request);
            let chunks: Vec<String> = self.chunks.iter().map(|c| (*c).to_owned()).collect();
            futures::stream::iter(chunks).boxed_local()
        }
    }

    fn replay(chunks: Vec<&'static str>) -> Rc<Replay> {
        Rc::new(Replay { chunks, requests: RefCell::new(Vec::new()) })
    }

    fn labels(session: &Session) -> Vec<&str> {
        session.entries().iter().map(|e| e.label.as_str()).collect()
    }

    async fn local<F: std::future::Future>(f: F) -> F::Output {
        tokio::task::LocalSet::new().run_until(f).await
    }

    #[tokio::test]
    async fn submit_streams_into_the_new_entry() {
        local(async {
            let source = replay(vec!["## General\n", "Disorder.", "\n## Related\n- Heat"]);
            let mut session = Session::new(source.clone());
            assert!(session.submit("Entropy"));
            assert_eq!(session.status(0), Some(&EntryStatus::Streaming));

            session.settle().await;
            assert_eq!(session.status(0), Some(&EntryStatus::Complete));
            let doc = session.document().expect("active document");
            assert_eq!(doc.sections[0].body, "Disorder.");
            assert_eq!(doc.related, vec!["Heat"]);
            assert_eq!(source.requests.borrow()[0].label, "Entropy");
        })
        .await;
    }

    #[tokio::test]
    async fn branching_discards_forward_history() {
        local(async {
            let mut session = Session::new(replay(vec!["text"]));
            session.submit("A");
            session.submit("B");
            assert!(session.back());
            session.submit("C");
            assert_eq!(labels(&session), vec!["A", "C"]);
            assert_eq!(session.cursor(), Some(1));
            assert!(!session.can_go_forward());
        })
        .await;
    }

    #[tokio::test]
    async fn same_label_as_active_entry_is_a_no_op() {
        local(async {
            let mut session = Session::new(replay(vec!["text"]));
            session.submit("Entropy");
            assert!(!session.click_word("entropy"));
            assert!(!session.submit("  ENTROPY "));
            assert!(!session.submit("   "));
            assert_eq!(session.len(), 1);
            assert_eq!(session.cursor(), Some(0));
        })
        .await;
    }

    #[tokio::test]
    async fn saved_content_completes_without_streaming() {
        local(async {
            let source = replay(vec!["never"]);
            let mut session = Session::new(source.clone());
            session.open_saved("Void", Some("## General\nNothing.".to_owned()), EntryKind::Text);
            assert_eq!(session.status(0), Some(&EntryStatus::Complete));
            assert!(source.requests.borrow().is_empty());
            assert!(session.is_idle());
        })
        .await;
    }

    #[tokio::test]
    async fn error_chunk_fails_the_entry_and_renders_inline() {
        local(async {
            let mut session =
                Session::new(replay(vec!["partial ", "Error: Cerebras API Key is missing."]));
            session.submit("Chaos");
            session.settle().await;

            let entry = session.current().expect("entry");
            assert_eq!(entry.content.as_deref(), Some("Error: Cerebras API Key is missing."));
            let failure = session.current_error().expect("active error");
            assert_eq!(failure.kind, crate::session::FailureKind::MissingCredential);
            assert_eq!(failure.message, "Cerebras API Key is missing.");
        })
        .await;
    }

    #[tokio::test]
    async fn reset_discards_orphaned_writes() {
        local(async {
            let mut session = Session::new(replay(vec!["late text"]));
            session.submit("Silence");
            session.upload_image("photo.jpg");
            assert!(session.root_image().is_some());

            session.reset();
            assert!(session.is_empty());
            assert_eq!(session.cursor(), None);
            assert!(session.root_image().is_none());

            // The old tasks still run to completion; none of it may land.
            for _ in 0..8 {
                tokio::task::yield_now().await;
            }
            while let Ok(event) = session.event_rx.try_recv() {
                assert_eq!(session.apply(event), Applied::Dropped);
            }
            assert!(session.is_empty());
        })
        .await;
    }

    #[tokio::test]
    async fn random_pick_comes_from_the_concept_pool() {
        local(async {
            let mut session = Session::new(replay(vec!["x"]));
            let mut rng = rand::rngs::StdRng::seed_from_u64(7);
            assert!(session.pick_random_with(&mut rng));
            let label = session.current().map(|e| e.label.clone()).unwrap_or_default();
            assert!(RANDOM_CONCEPTS.contains(&label.as_str()));
        })
        .await;
    }

    #[tokio::test]
    async fn navigation_bounds() {
        local(async {
            let mut session = Session::new(replay(vec!["x"]));
            assert!(!session.back());
            assert!(!session.forward());
            session.submit("A");
            session.submit("B");
            assert!(!session.forward());
            assert!(session.back());
            assert!(!session.back());
            assert!(session.forward());
            assert!(!session.jump_to(5));
            assert_eq!(session.cursor(), Some(1));
        })
        .await;
    }
}
