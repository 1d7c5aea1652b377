//! Query session controller.
//!
//! Owns the lifecycle of a single query: validate, call the relay, then
//! drive a timed character-by-character reveal of the answer to the display
//! surface. Only one outstanding query is meaningful at a time — a newer
//! [`Session::submit`] supersedes any in-flight one, and the stale relay
//! response or reveal loop is discarded via a generation token compared at
//! every resolution point.
//!
//! The display surface is injected through the [`AnswerSink`] port, so the
//! controller itself knows nothing about terminals or HTTP.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::relay::CompletionRelay;

/// Fixed text shown when the relay fails. The real failure is surfaced
/// separately through [`AnswerSink::failed`]; the answer slot only ever
/// holds this generic placeholder.
pub const ERROR_PLACEHOLDER: &str = "Something went wrong.";

/// Where the session sits in the query lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionStatus {
    /// No query in flight; ready for a submit.
    #[default]
    Idle,
    /// A relay call is outstanding.
    AwaitingCompletion,
    /// The answer arrived and is being revealed to the display.
    Revealing,
}

/// Display port for revealed answer text.
///
/// `reveal` receives the full visible prefix on every tick (not a delta),
/// so implementations stay stateless if they want to. `failed` carries the
/// underlying relay error for surfaces that can show diagnostics.
pub trait AnswerSink: Send + Sync {
    /// Called once per reveal tick with the currently visible prefix.
    /// `done` is true on the final tick, when the full answer is shown.
    fn reveal(&self, visible: &str, done: bool);

    /// Called when the relay fails and the session falls back to the
    /// error placeholder.
    fn failed(&self, message: &str);
}

/// Internal mutable state, guarded by one async mutex.
///
/// The generation counter increments on every submit; any task holding an
/// older generation must drop its work on the floor the next time it looks.
#[derive(Debug, Default)]
struct State {
    status: SessionStatus,
    answer: String,
    cursor: usize,
    generation: u64,
}

/// The query session controller.
///
/// Cheap to clone; clones share the same state, relay, and sink, which is
/// what allows a second `submit` to supersede a first one still in flight.
#[derive(Clone)]
pub struct Session {
    relay: Arc<dyn CompletionRelay>,
    sink: Arc<dyn AnswerSink>,
    reveal_interval: Duration,
    state: Arc<Mutex<State>>,
}

impl Session {
    pub fn new(
        relay: Arc<dyn CompletionRelay>,
        sink: Arc<dyn AnswerSink>,
        reveal_interval: Duration,
    ) -> Self {
        Self {
            relay,
            sink,
            reveal_interval,
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    /// Submit a query and drive it to completion.
    ///
    /// A query that is empty after trimming is silently ignored — the
    /// relay is never called and the status is left untouched. Otherwise
    /// this resolves when the answer has been fully revealed, the relay
    /// failed, or a newer submit superseded this one.
    pub async fn submit(&self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }

        let generation = {
            let mut state = self.state.lock().await;
            state.generation += 1;
            state.answer.clear();
            state.cursor = 0;
            state.status = SessionStatus::AwaitingCompletion;
            state.generation
        };

        let result = self.relay.complete(query).await;

        {
            let mut state = self.state.lock().await;
            if state.generation != generation {
                // A newer submit superseded this one; discard the response.
                return;
            }
            match result {
                Ok(text) => {
                    state.answer = text;
                    state.cursor = 0;
                    state.status = SessionStatus::Revealing;
                }
                Err(e) => {
                    state.answer = ERROR_PLACEHOLDER.to_string();
                    state.status = SessionStatus::Idle;
                    drop(state);
                    self.sink.failed(&e.to_string());
                    return;
                }
            }
        }

        self.run_reveal(generation).await;
    }

    /// Timed reveal loop: one character per tick until the cursor reaches
    /// the end of the answer. Checks the generation token every tick so a
    /// newer submit cancels this loop instead of racing it.
    async fn run_reveal(&self, generation: u64) {
        loop {
            tokio::time::sleep(self.reveal_interval).await;

            let (visible, done) = {
                let mut state = self.state.lock().await;
                if state.generation != generation {
                    return;
                }
                let total = state.answer.chars().count();
                if state.cursor < total {
                    state.cursor += 1;
                }
                let visible: String = state.answer.chars().take(state.cursor).collect();
                let done = state.cursor >= total;
                if done {
                    state.status = SessionStatus::Idle;
                }
                (visible, done)
            };

            self.sink.reveal(&visible, done);
            if done {
                return;
            }
        }
    }

    pub async fn status(&self) -> SessionStatus {
        self.state.lock().await.status
    }

    /// The current full answer (empty until the relay resolves).
    pub async fn answer(&self) -> String {
        self.state.lock().await.answer.clone()
    }

    /// The portion of the answer revealed so far.
    pub async fn revealed(&self) -> String {
        let state = self.state.lock().await;
        state.answer.chars().take(state.cursor).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::RelayError;
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;
    use tokio::sync::Notify;

    /// Echoes the query back, mirroring a trivially predictable upstream.
    struct EchoRelay;

    #[async_trait]
    impl CompletionRelay for EchoRelay {
        fn model_name(&self) -> &str {
            "echo"
        }
        async fn complete(&self, query: &str) -> Result<String, RelayError> {
            Ok(format!("AI response for: \"{}\"", query))
        }
    }

    /// Always fails with an upstream error.
    struct FailRelay;

    #[async_trait]
    impl CompletionRelay for FailRelay {
        fn model_name(&self) -> &str {
            "fail"
        }
        async fn complete(&self, _query: &str) -> Result<String, RelayError> {
            Err(RelayError::Upstream("connection refused".to_string()))
        }
    }

    /// Returns a fixed answer regardless of the query.
    struct StaticRelay(&'static str);

    #[async_trait]
    impl CompletionRelay for StaticRelay {
        fn model_name(&self) -> &str {
            "static"
        }
        async fn complete(&self, _query: &str) -> Result<String, RelayError> {
            Ok(self.0.to_string())
        }
    }

    /// Holds the response to the query "slow" until released; answers
    /// everything else immediately. Used to exercise supersession.
    struct GatedRelay {
        release: Notify,
    }

    impl GatedRelay {
        fn new() -> Self {
            Self {
                release: Notify::new(),
            }
        }
    }

    #[async_trait]
    impl CompletionRelay for GatedRelay {
        fn model_name(&self) -> &str {
            "gated"
        }
        async fn complete(&self, query: &str) -> Result<String, RelayError> {
            if query == "slow" {
                self.release.notified().await;
            }
            Ok(format!("answer to {}", query))
        }
    }

    /// Records every reveal frame and failure message.
    #[derive(Default)]
    struct RecordingSink {
        frames: StdMutex<Vec<(String, bool)>>,
        failures: StdMutex<Vec<String>>,
    }

    impl AnswerSink for RecordingSink {
        fn reveal(&self, visible: &str, done: bool) {
            self.frames
                .lock()
                .unwrap()
                .push((visible.to_string(), done));
        }
        fn failed(&self, message: &str) {
            self.failures.lock().unwrap().push(message.to_string());
        }
    }

    fn session_with(relay: Arc<dyn CompletionRelay>) -> (Session, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        let session = Session::new(relay, sink.clone(), Duration::from_millis(20));
        (session, sink)
    }

    async fn settle() {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn empty_query_is_a_silent_noop() {
        let (session, sink) = session_with(Arc::new(EchoRelay));
        session.submit("").await;
        session.submit("   \t\n").await;
        assert_eq!(session.status().await, SessionStatus::Idle);
        assert_eq!(session.answer().await, "");
        assert!(sink.frames.lock().unwrap().is_empty());
        assert!(sink.failures.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn submit_enters_awaiting_completion() {
        let (session, _sink) = session_with(Arc::new(GatedRelay::new()));
        let inflight = {
            let session = session.clone();
            tokio::spawn(async move { session.submit("slow").await })
        };
        settle().await;
        assert_eq!(session.status().await, SessionStatus::AwaitingCompletion);
        inflight.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn full_answer_is_revealed_then_idle() {
        let (session, sink) = session_with(Arc::new(EchoRelay));
        session.submit("hello").await;

        let expected = "AI response for: \"hello\"";
        assert_eq!(session.answer().await, expected);
        assert_eq!(session.revealed().await, expected);
        assert_eq!(session.status().await, SessionStatus::Idle);

        let frames = sink.frames.lock().unwrap();
        let (last, done) = frames.last().unwrap();
        assert_eq!(last, expected);
        assert!(done);
    }

    #[tokio::test(start_paused = true)]
    async fn reveal_is_monotonic_and_bounded() {
        let (session, sink) = session_with(Arc::new(EchoRelay));
        session.submit("hi").await;

        let answer = session.answer().await;
        let frames = sink.frames.lock().unwrap();
        let mut prev_len = 0;
        for (frame, _) in frames.iter() {
            let len = frame.chars().count();
            assert!(len >= prev_len, "cursor went backwards");
            assert!(len <= answer.chars().count(), "cursor past end of answer");
            assert!(answer.starts_with(frame.as_str()));
            prev_len = len;
        }
        assert_eq!(prev_len, answer.chars().count());
    }

    #[tokio::test(start_paused = true)]
    async fn reveal_respects_char_boundaries() {
        let (session, sink) = session_with(Arc::new(StaticRelay("héllo ✨ wörld")));
        session.submit("anything").await;

        let frames = sink.frames.lock().unwrap();
        assert_eq!(frames.len(), "héllo ✨ wörld".chars().count());
        assert_eq!(frames.last().unwrap().0, "héllo ✨ wörld");
    }

    #[tokio::test(start_paused = true)]
    async fn relay_failure_degrades_to_placeholder() {
        let (session, sink) = session_with(Arc::new(FailRelay));
        session.submit("hello").await;

        assert_eq!(session.answer().await, ERROR_PLACEHOLDER);
        assert_eq!(session.status().await, SessionStatus::Idle);
        assert!(sink.frames.lock().unwrap().is_empty());

        let failures = sink.failures.lock().unwrap();
        assert_eq!(failures.len(), 1);
        assert!(failures[0].contains("connection refused"));
    }

    #[tokio::test(start_paused = true)]
    async fn second_submit_supersedes_first() {
        let relay = Arc::new(GatedRelay::new());
        let (session, sink) = session_with(relay.clone());

        let first = {
            let session = session.clone();
            tokio::spawn(async move { session.submit("slow").await })
        };
        settle().await;

        // Second submit resolves and reveals fully while the first is
        // still parked in the relay.
        session.submit("fast").await;
        assert_eq!(session.answer().await, "answer to fast");

        // Release the first response; it must be discarded.
        relay.release.notify_one();
        first.await.unwrap();

        assert_eq!(session.answer().await, "answer to fast");
        assert_eq!(session.status().await, SessionStatus::Idle);
        let frames = sink.frames.lock().unwrap();
        assert!(frames.iter().all(|(f, _)| !f.contains("slow")));
    }

    #[tokio::test(start_paused = true)]
    async fn resubmit_after_completion_replaces_answer() {
        let (session, _sink) = session_with(Arc::new(EchoRelay));
        session.submit("one").await;
        session.submit("two").await;
        assert_eq!(session.answer().await, "AI response for: \"two\"");
        assert_eq!(session.status().await, SessionStatus::Idle);
    }
}
