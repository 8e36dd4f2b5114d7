// =====
// TESTS: 4
// =====
//
// Content pipeline integration tests.
// Replays a response chunk by chunk through stabilize + segment and through a
// live session, checking that no half-typed tab ever becomes visible.

use pretty_assertions::assert_eq;
use visual_dictionary::content::{self, GENERAL_TITLE};
use visual_dictionary::ui::{self, TabView};

use crate::helpers::{ChannelSource, local, pump, session_with};

const RESPONSE: &str = "\
Entropy measures disorder.
## History
Coined by Clausius in 1865.
## Physics
Always increases in isolated systems.
## Related
- Heat Death
- Information
- Time";

fn chunks(text: &str, size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars.chunks(size).map(|c| c.iter().collect()).collect()
}

#[test]
fn streamed_titles_are_always_final_titles() {
    let final_doc = content::parse(RESPONSE, false);
    let final_titles: Vec<&str> = final_doc.sections.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(final_titles, vec![GENERAL_TITLE, "History", "Physics"]);

    let mut previous = 0;
    for end in 0..=RESPONSE.len() {
        if !RESPONSE.is_char_boundary(end) {
            continue;
        }
        let doc = content::parse(&RESPONSE[..end], true);
        for section in &doc.sections {
            assert!(
                final_titles.contains(&section.title.as_str()),
                "partial tab `{}` visible after {end} bytes",
                section.title
            );
        }
        assert!(doc.sections.len() >= previous, "a tab disappeared after {end} bytes");
        previous = doc.sections.len();
    }
}

#[test]
fn completed_parse_is_idempotent_and_matches_last_live_parse() {
    let done = content::parse(RESPONSE, false);
    assert_eq!(content::parse(RESPONSE, false), done);
    assert_eq!(content::parse(RESPONSE, true), done);
    assert_eq!(done.related, vec!["Heat Death", "Information", "Time"]);
}

#[tokio::test]
async fn session_document_grows_without_flashing_tabs() {
    local(async {
        let source = ChannelSource::new();
        let mut session = session_with(&source);
        session.submit("Entropy");

        for chunk in chunks(RESPONSE, 7) {
            source.send("Entropy", &chunk);
            pump(&mut session).await;
            let doc = session.document().unwrap_or_default();
            for section in &doc.sections {
                assert!(
                    [GENERAL_TITLE, "History", "Physics"].contains(&section.title.as_str()),
                    "unexpected tab {}",
                    section.title
                );
            }
        }
        source.finish("Entropy");
        pump(&mut session).await;

        assert!(session.is_idle());
        assert_eq!(session.document(), Some(content::parse(RESPONSE, false)));
    })
    .await;
}

#[tokio::test]
async fn selected_tab_survives_further_chunks() {
    local(async {
        let source = ChannelSource::new();
        let mut session = session_with(&source);
        let mut tabs = TabView::default();
        session.submit("Entropy");

        let (head, tail) = RESPONSE.split_at(RESPONSE.find("## Physics").expect("physics header"));
        source.send("Entropy", head);
        pump(&mut session).await;
        let doc = session.document().expect("document");
        assert!(tabs.select(&doc, "history"));

        source.send("Entropy", tail);
        source.finish("Entropy");
        pump(&mut session).await;

        let screen = ui::render_session(&session, &mut tabs);
        assert_eq!(tabs.active(), Some("History"));
        assert!(screen.contains("[HISTORY]"));
        assert!(screen.contains("Clausius"));
        assert!(screen.contains("DOWN THE RABBIT HOLE"));
    })
    .await;
}
