use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::models::{AnalysisKind, AnalysisResult, Notice, Transcript};

/// Everything one browser session can see. Replaced wholesale on upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub transcript: Option<Transcript>,
    pub action_items: Option<AnalysisResult>,
    pub follow_up_email: Option<AnalysisResult>,
    pub processing_action_items: bool,
    pub processing_email: bool,
    pub notices: Vec<Notice>,
    /// Bumped on every reset so late results from a previous upload are dropped.
    pub generation: u64,
}

/// Inputs to [`update`].
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A new file arrived; forget everything before extracting it.
    UploadStarted { file_name: String },
    UploadRejected { reason: String },
    TranscriptExtracted(Transcript),
    ExtractionFailed { message: String },
    AnalysisRequested(AnalysisKind),
    AnalysisCompleted {
        kind: AnalysisKind,
        generation: u64,
        text: String,
    },
    AnalysisFailed {
        kind: AnalysisKind,
        generation: u64,
        message: String,
    },
}

impl SessionState {
    pub fn is_busy(&self) -> bool {
        self.processing_action_items || self.processing_email
    }

    pub fn is_processing(&self, kind: AnalysisKind) -> bool {
        match kind {
            AnalysisKind::ActionItems => self.processing_action_items,
            AnalysisKind::Email => self.processing_email,
        }
    }

    pub fn result(&self, kind: AnalysisKind) -> Option<&AnalysisResult> {
        match kind {
            AnalysisKind::ActionItems => self.action_items.as_ref(),
            AnalysisKind::Email => self.follow_up_email.as_ref(),
        }
    }

    /// A new analysis may start only with a transcript and nothing in flight.
    pub fn can_analyze(&self) -> bool {
        self.transcript.is_some() && !self.is_busy()
    }

    fn set_processing(&mut self, kind: AnalysisKind, value: bool) {
        match kind {
            AnalysisKind::ActionItems => self.processing_action_items = value,
            AnalysisKind::Email => self.processing_email = value,
        }
    }

    fn set_result(&mut self, kind: AnalysisKind, result: Option<AnalysisResult>) {
        match kind {
            AnalysisKind::ActionItems => self.action_items = result,
            AnalysisKind::Email => self.follow_up_email = result,
        }
    }
}

/// Apply one event. Events that are not valid in the current state leave it
/// unchanged.
pub fn update(mut state: SessionState, event: SessionEvent) -> SessionState {
    match event {
        SessionEvent::UploadStarted { file_name } => {
            let generation = state.generation + 1;
            tracing::debug!(file_name = %file_name, generation, "Resetting session for upload");
            SessionState {
                generation,
                ..SessionState::default()
            }
        }
        SessionEvent::UploadRejected { reason } => {
            state.notices = vec![Notice::error(reason)];
            state
        }
        SessionEvent::TranscriptExtracted(transcript) => {
            let mut notices = vec![Notice::success(
                "PDF text extracted successfully. Ready to analyze.",
            )];
            notices.extend(transcript.warnings.iter().map(|w| {
                Notice::warning(format!("Could not extract text from page {}.", w.page))
            }));
            state.notices = notices;
            state.transcript = Some(transcript);
            state
        }
        SessionEvent::ExtractionFailed { message } => {
            state.transcript = None;
            state.notices = vec![Notice::error(message)];
            state
        }
        SessionEvent::AnalysisRequested(kind) => {
            if !state.can_analyze() {
                return state;
            }
            state.notices.clear();
            state.set_result(kind, None);
            state.set_processing(kind, true);
            state
        }
        SessionEvent::AnalysisCompleted {
            kind,
            generation,
            text,
        } => {
            if generation != state.generation || !state.is_processing(kind) {
                return state;
            }
            let result = AnalysisResult::new(text);
            if result.is_error() {
                // Escalations arrive as marked text; the panel only points at this notice.
                state.notices.push(Notice::error(result.text.clone()));
            }
            state.set_result(kind, Some(result));
            state.set_processing(kind, false);
            state
        }
        SessionEvent::AnalysisFailed {
            kind,
            generation,
            message,
        } => {
            if generation != state.generation || !state.is_processing(kind) {
                return state;
            }
            state.set_result(
                kind,
                Some(AnalysisResult::new(crate::agents::agent_error_text(
                    kind, &message,
                ))),
            );
            state.set_processing(kind, false);
            state.notices.push(Notice::error(message));
            state
        }
    }
}

/// Storage for per-browser session state.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, id: &str) -> SessionState;

    /// Apply an event atomically and return the new state.
    async fn apply(&self, id: &str, event: SessionEvent) -> SessionState;

    /// Atomically start an analysis. `None` when the session may not start one.
    async fn begin_analysis(&self, id: &str, kind: AnalysisKind) -> Option<SessionState>;
}

/// In-memory implementation of SessionStore
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: Arc<DashMap<String, SessionState>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
        }
    }

    /// Number of sessions holding state.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, id: &str) -> SessionState {
        self.sessions
            .get(id)
            .map(|entry| entry.clone())
            .unwrap_or_default()
    }

    async fn apply(&self, id: &str, event: SessionEvent) -> SessionState {
        let mut entry = self.sessions.entry(id.to_string()).or_default();
        let next = update(std::mem::take(entry.value_mut()), event);
        *entry.value_mut() = next.clone();
        next
    }

    async fn begin_analysis(&self, id: &str, kind: AnalysisKind) -> Option<SessionState> {
        // Unknown sessions have no transcript; never insert for a rejected request.
        let mut entry = self.sessions.get_mut(id)?;
        if !entry.can_analyze() {
            return None;
        }
        let next = update(
            std::mem::take(entry.value_mut()),
            SessionEvent::AnalysisRequested(kind),
        );
        *entry.value_mut() = next.clone();
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcript(text: &str) -> Transcript {
        Transcript {
            text: text.to_string(),
            page_count: 1,
            warnings: vec![],
        }
    }

    fn loaded() -> SessionState {
        update(
            SessionState::default(),
            SessionEvent::TranscriptExtracted(transcript("Adi: I'll send pricing.")),
        )
    }

    #[test]
    fn test_upload_resets_everything() {
        let mut state = loaded();
        state = update(state, SessionEvent::AnalysisRequested(AnalysisKind::ActionItems));
        state = update(
            state,
            SessionEvent::AnalysisCompleted {
                kind: AnalysisKind::ActionItems,
                generation: 0,
                text: "*   Send pricing".into(),
            },
        );
        state = update(state, SessionEvent::AnalysisRequested(AnalysisKind::Email));
        assert!(state.processing_email);

        let state = update(
            state,
            SessionEvent::UploadStarted {
                file_name: "next.pdf".into(),
            },
        );
        assert_eq!(
            state,
            SessionState {
                generation: 1,
                ..SessionState::default()
            }
        );
    }

    #[test]
    fn test_request_without_transcript_is_ignored() {
        let state = update(
            SessionState::default(),
            SessionEvent::AnalysisRequested(AnalysisKind::Email),
        );
        assert!(!state.processing_email);
    }

    #[test]
    fn test_other_kind_in_progress_blocks_request() {
        let state = update(loaded(), SessionEvent::AnalysisRequested(AnalysisKind::ActionItems));
        let state = update(state, SessionEvent::AnalysisRequested(AnalysisKind::Email));
        assert!(state.processing_action_items);
        assert!(!state.processing_email);
    }

    #[test]
    fn test_request_clears_previous_result() {
        let mut state = loaded();
        state.follow_up_email = Some(AnalysisResult::new("old email"));
        let state = update(state, SessionEvent::AnalysisRequested(AnalysisKind::Email));
        assert!(state.follow_up_email.is_none());
        assert!(state.processing_email);
    }

    #[test]
    fn test_stale_completion_is_discarded() {
        let state = update(loaded(), SessionEvent::AnalysisRequested(AnalysisKind::Email));
        let state = update(
            state,
            SessionEvent::UploadStarted {
                file_name: "other.pdf".into(),
            },
        );
        let state = update(
            state,
            SessionEvent::AnalysisCompleted {
                kind: AnalysisKind::Email,
                generation: 0,
                text: "late".into(),
            },
        );
        assert!(state.follow_up_email.is_none());
    }

    #[test]
    fn test_failure_stores_marked_result_and_clears_flag() {
        let state = update(loaded(), SessionEvent::AnalysisRequested(AnalysisKind::ActionItems));
        let state = update(
            state,
            SessionEvent::AnalysisFailed {
                kind: AnalysisKind::ActionItems,
                generation: 0,
                message: "connection refused".into(),
            },
        );
        assert!(!state.processing_action_items);
        let result = state.action_items.unwrap();
        assert!(result.is_error());
        assert!(result.text.contains("connection refused"));
        assert_eq!(state.notices.len(), 1);
    }

    #[test]
    fn test_escalated_completion_raises_error_notice() {
        let state = update(loaded(), SessionEvent::AnalysisRequested(AnalysisKind::Email));
        let state = update(
            state,
            SessionEvent::AnalysisCompleted {
                kind: AnalysisKind::Email,
                generation: 0,
                text: crate::agents::agent_error_text(AnalysisKind::Email, "quota exceeded"),
            },
        );
        assert!(!state.processing_email);
        assert!(state.follow_up_email.as_ref().unwrap().is_error());
        assert_eq!(state.notices.len(), 1);
        assert!(state.notices[0].message.contains("quota exceeded"));
    }

    #[test]
    fn test_page_warnings_become_notices() {
        let mut t = transcript("page one");
        t.warnings.push(crate::models::PageWarning {
            page: 2,
            reason: "bad font".into(),
        });
        let state = update(SessionState::default(), SessionEvent::TranscriptExtracted(t));
        assert_eq!(state.notices.len(), 2);
        assert_eq!(state.notices[1].message, "Could not extract text from page 2.");
    }

    #[tokio::test]
    async fn test_store_applies_events_per_session() {
        let store = InMemorySessionStore::new();
        store
            .apply("a", SessionEvent::TranscriptExtracted(transcript("hello")))
            .await;

        assert!(store.get("a").await.transcript.is_some());
        assert!(store.get("b").await.transcript.is_none());

        assert!(store.begin_analysis("a", AnalysisKind::Email).await.is_some());
        assert!(store.begin_analysis("a", AnalysisKind::Email).await.is_none());
        assert!(store.begin_analysis("b", AnalysisKind::Email).await.is_none());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_rejected_requests_store_nothing() {
        let store = InMemorySessionStore::new();
        for i in 0..50 {
            let id = format!("visitor-{}", i);
            assert!(store.begin_analysis(&id, AnalysisKind::ActionItems).await.is_none());
            assert!(store.get(&id).await.transcript.is_none());
        }
        assert!(store.is_empty());
    }
}
