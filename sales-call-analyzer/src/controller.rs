//! Session/workflow controller: the only code that mutates session state.
//! It turns user actions into events, performs the side effects they need
//! (extraction, agent calls) and feeds the outcomes back in.

use std::sync::Arc;
use tracing::{info, warn};

use crate::agents::run_agent;
use crate::error::ExtractionError;
use crate::models::AnalysisKind;
use crate::pdf_extract::extract_transcript;
use crate::runtime::AgentRuntime;
use crate::session::{SessionEvent, SessionState, SessionStore};

/// One uploaded file as received from the browser.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Upload {
    fn is_pdf(&self) -> bool {
        let by_type = self
            .content_type
            .as_deref()
            .is_some_and(|ct| ct.eq_ignore_ascii_case("application/pdf"));
        by_type || self.file_name.to_ascii_lowercase().ends_with(".pdf")
    }
}

#[derive(Clone)]
pub struct WorkflowController {
    store: Arc<dyn SessionStore>,
    runtime: Arc<AgentRuntime>,
}

impl WorkflowController {
    pub fn new(store: Arc<dyn SessionStore>, runtime: Arc<AgentRuntime>) -> Self {
        Self { store, runtime }
    }

    pub fn runtime(&self) -> &AgentRuntime {
        &self.runtime
    }

    pub async fn state(&self, session_id: &str) -> SessionState {
        self.store.get(session_id).await
    }

    /// Reset the session, then try to turn the upload into a transcript.
    pub async fn upload(&self, session_id: &str, upload: Upload) -> SessionState {
        if !self.runtime.base_setup_ok() {
            warn!("Upload ignored because base setup failed");
            return self.store.get(session_id).await;
        }

        info!(session_id, file_name = %upload.file_name, "Processing uploaded file");
        self.store
            .apply(
                session_id,
                SessionEvent::UploadStarted {
                    file_name: upload.file_name.clone(),
                },
            )
            .await;

        if upload.bytes.is_empty() {
            return self
                .store
                .apply(
                    session_id,
                    SessionEvent::UploadRejected {
                        reason: "The uploaded file is empty.".to_string(),
                    },
                )
                .await;
        }
        if !upload.is_pdf() {
            return self
                .store
                .apply(
                    session_id,
                    SessionEvent::UploadRejected {
                        reason: format!("{} is not a PDF file.", upload.file_name),
                    },
                )
                .await;
        }

        let event = match extract_transcript(upload.bytes).await {
            Ok(transcript) => SessionEvent::TranscriptExtracted(transcript),
            Err(e) => {
                match &e {
                    ExtractionError::UnknownExtractionError(cause) => {
                        warn!("Unexpected PDF parsing error: {:?}", cause)
                    }
                    other => warn!("PDF extraction failed: {}", other),
                }
                SessionEvent::ExtractionFailed {
                    message: e.to_string(),
                }
            }
        };
        self.store.apply(session_id, event).await
    }

    /// Run one analysis if the session may start it; otherwise leave the
    /// state untouched and make no agent call.
    pub async fn analyze(&self, session_id: &str, kind: AnalysisKind) -> SessionState {
        if !self.runtime.base_setup_ok() {
            warn!(session_id, %kind, "Analysis requested before setup completed");
            return self.store.get(session_id).await;
        }

        let Some(state) = self.store.begin_analysis(session_id, kind).await else {
            info!(session_id, %kind, "Analysis request ignored");
            return self.store.get(session_id).await;
        };
        let generation = state.generation;
        let Some(transcript) = state.transcript else {
            return state;
        };

        let event = match run_agent(&transcript.text, self.runtime.runner(kind), kind).await {
            Ok(text) => SessionEvent::AnalysisCompleted {
                kind,
                generation,
                text,
            },
            Err(e) => SessionEvent::AnalysisFailed {
                kind,
                generation,
                message: e.to_string(),
            },
        };
        self.store.apply(session_id, event).await
    }
}
