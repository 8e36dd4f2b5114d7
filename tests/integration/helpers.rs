use futures::StreamExt as _;
use futures::channel::mpsc;
use std::cell::RefCell;
use std::rc::Rc;
use visual_dictionary::provider::{StreamRequest, StreamSource, TextStream};
use visual_dictionary::session::Session;

/// Stream source whose streams are fed by the test, one channel per request.
#[derive(Default)]
pub struct ChannelSource {
    feeds: RefCell<Vec<(String, mpsc::UnboundedSender<String>)>>,
    pub requests: RefCell<Vec<StreamRequest>>,
}

impl ChannelSource {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Push a chunk into the most recent stream opened for `label`.
    pub fn send(&self, label: &str, chunk: &str) {
        let feeds = self.feeds.borrow();
        let (_, tx) = feeds.iter().rev().find(|(l, _)| l == label).expect("stream for label");
        tx.unbounded_send(chunk.to_owned()).expect("stream still open");
    }

    /// End the most recent stream opened for `label`.
    pub fn finish(&self, label: &str) {
        let feeds = self.feeds.borrow();
        let (_, tx) = feeds.iter().rev().find(|(l, _)| l == label).expect("stream for label");
        tx.close_channel();
    }

    pub fn opened(&self, label: &str) -> usize {
        self.requests.borrow().iter().filter(|r| r.label == label).count()
    }
}

impl StreamSource for ChannelSource {
    fn produce(&self, request: StreamRequest) -> TextStream {
        let (tx, rx) = mpsc::unbounded();
        self.feeds.borrow_mut().push((request.label.clone(), tx));
        self.requests.borrow_mut().push(request);
        rx.boxed_local()
    }
}

pub fn session_with(source: &Rc<ChannelSource>) -> Session {
    Session::new(source.clone())
}

pub async fn local<F: std::future::Future>(f: F) -> F::Output {
    tokio::task::LocalSet::new().run_until(f).await
}

/// Let the stream tasks run, then apply whatever they produced.
pub async fn pump(session: &mut Session) {
    for _ in 0..8 {
        tokio::task::yield_now().await;
        session.drain_events();
    }
}

pub fn labels(session: &Session) -> Vec<&str> {
    session.entries().iter().map(|e| e.label.as_str()).collect()
}
