// =====
// TESTS: 8
// =====
//
// Session integration tests.
// Drives several concurrent streams by hand and checks history, cursor and
// per-entry content as chunks arrive out of order.

use pretty_assertions::assert_eq;
use visual_dictionary::session::{EntryKind, EntryStatus, FailureKind, IMAGE_LABEL};

use crate::helpers::{ChannelSource, labels, local, pump, session_with};

#[tokio::test]
async fn branching_after_back_overwrites_forward_history() {
    local(async {
        let source = ChannelSource::new();
        let mut session = session_with(&source);
        session.submit("A");
        session.submit("B");
        session.back();
        session.submit("C");
        assert_eq!(labels(&session), vec!["A", "C"]);
        assert_eq!(session.cursor(), Some(1));
    })
    .await;
}

#[tokio::test]
async fn background_stream_keeps_filling_its_own_entry() {
    local(async {
        let source = ChannelSource::new();
        let mut session = session_with(&source);
        session.submit("Entropy");
        source.send("Entropy", "Disorder ");
        pump(&mut session).await;

        session.click_word("Disorder");
        source.send("Disorder", "Lack of order.");
        source.send("Entropy", "grows.");
        source.finish("Entropy");
        pump(&mut session).await;

        let entries = session.entries();
        assert_eq!(entries[0].content.as_deref(), Some("Disorder grows."));
        assert_eq!(entries[0].status, EntryStatus::Complete);
        assert_eq!(entries[1].content.as_deref(), Some("Lack of order."));
        assert_eq!(entries[1].status, EntryStatus::Streaming);
        assert_eq!(session.cursor(), Some(1));
        assert!(!session.is_idle());
    })
    .await;
}

#[tokio::test]
async fn truncated_entry_writes_are_dropped() {
    local(async {
        let source = ChannelSource::new();
        let mut session = session_with(&source);
        session.submit("A");
        session.submit("B");
        session.back();
        session.submit("C");

        source.send("B", "stale");
        source.finish("B");
        source.send("C", "fresh");
        pump(&mut session).await;

        assert_eq!(labels(&session), vec!["A", "C"]);
        assert_eq!(session.entries()[1].content.as_deref(), Some("fresh"));
    })
    .await;
}

#[tokio::test]
async fn reset_ignores_streams_that_are_still_running() {
    local(async {
        let source = ChannelSource::new();
        let mut session = session_with(&source);
        session.submit("Void");
        session.reset();
        session.submit("Chaos");

        source.send("Void", "resurrected?");
        source.finish("Void");
        source.send("Chaos", "Order's opposite.");
        pump(&mut session).await;

        assert_eq!(labels(&session), vec!["Chaos"]);
        assert_eq!(session.entries()[0].content.as_deref(), Some("Order's opposite."));
    })
    .await;
}

#[tokio::test]
async fn jump_restarts_an_entry_whose_stream_produced_nothing() {
    local(async {
        let source = ChannelSource::new();
        let mut session = session_with(&source);
        session.submit("Silence");
        source.finish("Silence");
        pump(&mut session).await;
        assert_eq!(session.status(0), Some(&EntryStatus::Complete));

        session.submit("Noise");
        assert!(session.jump_to(0));
        assert_eq!(source.opened("Silence"), 2);
        assert_eq!(session.status(0), Some(&EntryStatus::Streaming));

        // Jumping again while it streams must not open a third stream.
        assert!(session.jump_to(1));
        assert!(session.jump_to(0));
        assert_eq!(source.opened("Silence"), 2);
        assert!(!session.jump_to(5));
    })
    .await;
}

#[tokio::test]
async fn failure_surfaces_when_navigating_to_the_entry() {
    local(async {
        let source = ChannelSource::new();
        let mut session = session_with(&source);
        session.submit("Recursion");
        session.submit("Paradox");

        source.send("Recursion", "Error: Gemini API Key is missing. Please add it in the Settings.");
        pump(&mut session).await;
        assert!(session.current_error().is_none());

        session.back();
        let failure = session.current_error().expect("failed entry");
        assert_eq!(failure.kind, FailureKind::MissingCredential);
        assert!(session.entries()[0].content.as_deref().is_some_and(|c| c.starts_with("Error:")));

        session.forward();
        assert!(session.current_error().is_none());
    })
    .await;
}

#[tokio::test]
async fn image_upload_requests_a_visual_analysis() {
    local(async {
        let source = ChannelSource::new();
        let mut session = session_with(&source);
        assert!(session.upload_image("photos/cat.png"));

        let entry = session.current().expect("image entry");
        assert_eq!(entry.label, IMAGE_LABEL);
        assert_eq!(entry.kind, EntryKind::Image);
        let request = &source.requests.borrow()[0];
        assert_eq!(request.kind, EntryKind::Image);
        assert_eq!(
            request.image.as_ref().map(|i| i.mime_type.as_str()),
            Some("image/png")
        );
        assert!(session.root_image().is_some());

        session.reset();
        assert!(session.root_image().is_none());
    })
    .await;
}

#[tokio::test]
async fn jump_keeps_a_background_failure_visible() {
    local(async {
        let source = ChannelSource::new();
        let mut session = session_with(&source);
        session.submit("Recursion");
        session.submit("Paradox");

        source.send("Recursion", "Error: connection reset");
        pump(&mut session).await;

        assert!(session.jump_to(0));
        let failure = session.current_error().expect("failure survives the jump");
        assert_eq!(failure.kind, FailureKind::Stream);
        assert!(matches!(session.status(0), Some(EntryStatus::Failed(_))));
        assert_eq!(source.opened("Recursion"), 1);

        // A finished entry is not demoted either.
        source.send("Paradox", "Self-contradiction.");
        source.finish("Paradox");
        pump(&mut session).await;
        assert!(session.jump_to(1));
        assert_eq!(session.status(1), Some(&EntryStatus::Complete));
        assert_eq!(source.opened("Paradox"), 1);
    })
    .await;
}
