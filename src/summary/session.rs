use crate::error::SummarizeError;
use crate::summary::config::{ApiConfig, TimeZoneSetting};
use crate::summary::history::{HistoryEntry, HistoryStore};
use crate::summary::request::{CompletionTransport, build_payload, interpret_reply};
use crate::summary::util::{format_timestamp, text_snippet};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Transient per-session state; never persisted.
#[derive(Debug, Clone, Default)]
pub struct RequestState {
    pub input_text: String,
    pub selected_model_id: String,
    pub is_loading: bool,
    pub last_error: Option<String>,
    pub last_summary: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TimestampStyle {
    pub zone: TimeZoneSetting,
    pub format: String,
}

/// Clears the shared loading flag when dropped, whatever path the call took.
struct LoadingGuard(Arc<AtomicBool>);

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct SummarySession {
    state: RequestState,
    loading: Arc<AtomicBool>,
    history: HistoryStore,
    api: ApiConfig,
    style: TimestampStyle,
}

impl SummarySession {
    pub fn new(history: HistoryStore, api: ApiConfig, style: TimestampStyle) -> Self {
        let state = RequestState {
            selected_model_id: api.default_model.clone(),
            ..RequestState::default()
        };
        Self {
            state,
            loading: Arc::new(AtomicBool::new(false)),
            history,
            api,
            style,
        }
    }

    pub fn state(&self) -> RequestState {
        RequestState {
            is_loading: self.is_loading(),
            ..self.state.clone()
        }
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Shared view of the in-flight flag, for observers outside the session.
    pub fn loading_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.loading)
    }

    pub fn set_input_text(&mut self, text: impl Into<String>) {
        self.state.input_text = text.into();
    }

    pub fn select_model(&mut self, model_id: impl Into<String>) {
        self.state.selected_model_id = model_id.into();
    }

    pub fn reset(&mut self) {
        self.state.input_text.clear();
        self.state.last_summary = None;
        self.state.last_error = None;
    }

    /// Run one summarization of the current input.
    ///
    /// Blank input is rejected before any request and leaves the state as it
    /// was. A call made while another is in flight fails with `Busy`.
    pub fn summarize(
        &mut self,
        transport: &dyn CompletionTransport,
    ) -> Result<HistoryEntry, SummarizeError> {
        if self.state.input_text.trim().is_empty() {
            return Err(SummarizeError::validation("input text cannot be empty"));
        }
        if self
            .loading
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(SummarizeError::Busy);
        }
        let _guard = LoadingGuard(Arc::clone(&self.loading));

        self.state.last_error = None;
        self.state.last_summary = None;

        let model_id = self.state.selected_model_id.clone();
        tracing::info!(
            model = %model_id,
            input_chars = self.state.input_text.chars().count(),
            "summarize request started"
        );

        let outcome = self.run_request(transport, &model_id);
        match &outcome {
            Ok(entry) => {
                tracing::info!(model = %model_id, id = entry.id, "summarize request finished");
                self.state.last_summary = Some(entry.summary.clone());
            }
            Err(err) => {
                tracing::warn!(model = %model_id, code = err.code().as_str(), "summarize request failed");
                self.state.last_error = Some(err.to_string());
            }
        }
        outcome
    }

    fn run_request(
        &mut self,
        transport: &dyn CompletionTransport,
        model_id: &str,
    ) -> Result<HistoryEntry, SummarizeError> {
        let payload = build_payload(model_id, &self.state.input_text, &self.api);
        let reply = transport.send(&payload)?;
        tracing::debug!(status = reply.status, "completion reply received");
        let summary = interpret_reply(&reply)?;

        let entry = self.new_entry(summary, model_id, Utc::now())?;
        self.history
            .add(entry.clone())
            .map_err(SummarizeError::storage)?;
        Ok(entry)
    }

    fn new_entry(
        &self,
        summary: String,
        model_id: &str,
        at: DateTime<Utc>,
    ) -> Result<HistoryEntry, SummarizeError> {
        let timestamp = format_timestamp(at, self.style.zone, &self.style.format)
            .map_err(SummarizeError::storage)?;
        Ok(HistoryEntry {
            id: self.history.next_id(at.timestamp_millis()),
            summary,
            original_text_snippet: text_snippet(&self.state.input_text),
            timestamp,
            model_id: model_id.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AUTH_MESSAGE;
    use crate::summary::config::DEFAULT_TIMESTAMP_FORMAT;
    use crate::summary::request::HttpReply;
    use serde_json::{Value, json};
    use std::cell::{Cell, RefCell};
    use tempfile::{TempDir, tempdir};

    struct ScriptedTransport {
        reply: Result<HttpReply, String>,
        calls: Cell<usize>,
        observed_loading: RefCell<Vec<bool>>,
        payloads: RefCell<Vec<Value>>,
        flag: Arc<AtomicBool>,
    }

    impl ScriptedTransport {
        fn new(flag: Arc<AtomicBool>, reply: Result<HttpReply, String>) -> Self {
            Self {
                reply,
                calls: Cell::new(0),
                observed_loading: RefCell::new(Vec::new()),
                payloads: RefCell::new(Vec::new()),
                flag,
            }
        }

        fn ok(flag: Arc<AtomicBool>, content: &str) -> Self {
            let body = json!({"choices": [{"message": {"content": content}}]}).to_string();
            Self::new(flag, Ok(HttpReply { status: 200, body }))
        }
    }

    impl CompletionTransport for ScriptedTransport {
        fn send(&self, payload: &Value) -> Result<HttpReply, SummarizeError> {
            self.calls.set(self.calls.get() + 1);
            self.observed_loading
                .borrow_mut()
                .push(self.flag.load(Ordering::SeqCst));
            self.payloads.borrow_mut().push(payload.clone());
            self.reply.clone().map_err(SummarizeError::Network)
        }
    }

    fn session(tmp: &TempDir) -> SummarySession {
        session_with_format(tmp, DEFAULT_TIMESTAMP_FORMAT)
    }

    fn session_with_format(tmp: &TempDir, format: &str) -> SummarySession {
        let history = HistoryStore::load(tmp.path().join("history.json")).expect("history");
        SummarySession::new(
            history,
            ApiConfig::default(),
            TimestampStyle {
                zone: TimeZoneSetting::Named(chrono_tz::UTC),
                format: format.to_string(),
            },
        )
    }

    #[test]
    fn success_issues_one_request_and_records_history() {
        let tmp = tempdir().expect("tempdir");
        let mut session = session(&tmp);
        session.set_input_text("A long article about rivers.");
        let transport = ScriptedTransport::ok(session.loading_flag(), "Rivers flow.");

        let entry = session.summarize(&transport).expect("summary");

        assert_eq!(transport.calls.get(), 1);
        assert_eq!(*transport.observed_loading.borrow(), vec![true]);
        assert!(!session.is_loading());
        assert_eq!(entry.summary, "Rivers flow.");
        assert_eq!(entry.original_text_snippet, "A long article about rivers.");
        assert_eq!(entry.model_id, ApiConfig::default().default_model);

        let state = session.state();
        assert_eq!(state.last_summary.as_deref(), Some("Rivers flow."));
        assert!(state.last_error.is_none());
        assert_eq!(session.history().entries()[0], entry);

        let reloaded = HistoryStore::load(tmp.path().join("history.json")).expect("reload");
        assert_eq!(reloaded.entries(), session.history().entries());
    }

    #[test]
    fn blank_input_makes_no_call_and_keeps_state() {
        let tmp = tempdir().expect("tempdir");
        let mut session = session(&tmp);
        session.set_input_text("  \n\t ");
        let before = session.state();
        let transport = ScriptedTransport::ok(session.loading_flag(), "unused");

        let err = session.summarize(&transport).expect_err("blank");

        assert!(matches!(err, SummarizeError::Validation(_)));
        assert_eq!(transport.calls.get(), 0);
        let after = session.state();
        assert_eq!(after.input_text, before.input_text);
        assert_eq!(after.last_error, before.last_error);
        assert!(!after.is_loading);
        assert!(session.history().is_empty());
    }

    #[test]
    fn failure_records_message_and_clears_loading() {
        let tmp = tempdir().expect("tempdir");
        let mut session = session(&tmp);
        session.set_input_text("text");
        let transport = ScriptedTransport::new(
            session.loading_flag(),
            Ok(HttpReply {
                status: 401,
                body: "{}".to_string(),
            }),
        );

        let err = session.summarize(&transport).expect_err("auth");

        assert!(matches!(err, SummarizeError::Auth));
        assert_eq!(*transport.observed_loading.borrow(), vec![true]);
        let state = session.state();
        assert!(!state.is_loading);
        assert_eq!(state.last_error.as_deref(), Some(AUTH_MESSAGE));
        assert!(state.last_summary.is_none());
        assert!(session.history().is_empty());
    }

    #[test]
    fn transport_failure_clears_loading() {
        let tmp = tempdir().expect("tempdir");
        let mut session = session(&tmp);
        session.set_input_text("text");
        let transport =
            ScriptedTransport::new(session.loading_flag(), Err("connection refused".to_string()));

        let err = session.summarize(&transport).expect_err("network");
        assert!(matches!(err, SummarizeError::Network(_)));
        assert!(!session.is_loading());
    }

    #[test]
    fn unrenderable_timestamp_format_fails_without_panicking() {
        let tmp = tempdir().expect("tempdir");
        let mut session = session_with_format(&tmp, "%Q");
        session.set_input_text("text");
        let transport = ScriptedTransport::ok(session.loading_flag(), "summary");

        let err = session.summarize(&transport).expect_err("bad format");
        assert!(matches!(err, SummarizeError::Storage(_)));
        assert!(!session.is_loading());
        assert!(session.state().last_error.is_some());
        assert!(session.history().is_empty());
    }

    #[test]
    fn call_while_in_flight_is_rejected_without_request() {
        let tmp = tempdir().expect("tempdir");
        let mut session = session(&tmp);
        session.set_input_text("text");
        let flag = session.loading_flag();
        flag.store(true, Ordering::SeqCst);
        let transport = ScriptedTransport::ok(session.loading_flag(), "unused");

        let err = session.summarize(&transport).expect_err("busy");
        assert!(matches!(err, SummarizeError::Busy));
        assert_eq!(transport.calls.get(), 0);
        assert!(session.is_loading());
    }

    #[test]
    fn payload_uses_selected_model_and_raw_input() {
        let tmp = tempdir().expect("tempdir");
        let mut session = session(&tmp);
        session.select_model("meta-llama/llama-3.3-70b-instruct:free");
        session.set_input_text("  keep my spacing  ");
        let transport = ScriptedTransport::ok(session.loading_flag(), "ok");

        let entry = session.summarize(&transport).expect("summary");
        let payload = &transport.payloads.borrow()[0];
        assert_eq!(payload["model"], "meta-llama/llama-3.3-70b-instruct:free");
        assert!(
            payload["messages"][0]["content"]
                .as_str()
                .expect("content")
                .ends_with("\n\n  keep my spacing  ")
        );
        assert_eq!(entry.model_id, "meta-llama/llama-3.3-70b-instruct:free");
    }

    #[test]
    fn consecutive_entries_get_increasing_ids() {
        let tmp = tempdir().expect("tempdir");
        let mut session = session(&tmp);
        session.set_input_text("text");
        let transport = ScriptedTransport::ok(session.loading_flag(), "summary");

        let first = session.summarize(&transport).expect("first");
        let second = session.summarize(&transport).expect("second");
        assert!(second.id > first.id);
        assert_eq!(session.history().entries()[0].id, second.id);
    }

    #[test]
    fn reset_clears_input_and_outcome() {
        let tmp = tempdir().expect("tempdir");
        let mut session = session(&tmp);
        session.set_input_text("text");
        let transport = ScriptedTransport::ok(session.loading_flag(), "summary");
        session.summarize(&transport).expect("summary");

        session.reset();
        let state = session.state();
        assert!(state.input_text.is_empty());
        assert!(state.last_summary.is_none());
        assert!(state.last_error.is_none());
        assert_eq!(session.history().len(), 1);
    }
}
