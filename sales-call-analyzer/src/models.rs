use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Marker embedded in every result string that describes an agent failure.
pub const AGENT_ERROR_MARKER: &str = "Agent Error:";

/// The two analyses a transcript can be run through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisKind {
    ActionItems,
    Email,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 2] = [AnalysisKind::ActionItems, AnalysisKind::Email];

    /// Human label used in log lines and agent messages.
    pub fn label(self) -> &'static str {
        match self {
            AnalysisKind::ActionItems => "Action Item",
            AnalysisKind::Email => "Email Generation",
        }
    }

    /// Path segment used by `POST /analyze/{kind}`.
    pub fn slug(self) -> &'static str {
        match self {
            AnalysisKind::ActionItems => "action-items",
            AnalysisKind::Email => "email",
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for AnalysisKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "action-items" => Ok(AnalysisKind::ActionItems),
            "email" => Ok(AnalysisKind::Email),
            other => Err(format!("Unknown analysis kind: {}", other)),
        }
    }
}

/// Text extracted from one uploaded PDF.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    pub text: String,
    pub page_count: usize,
    pub warnings: Vec<PageWarning>,
}

/// A page whose text could not be extracted. Advisory only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageWarning {
    pub page: u32,
    pub reason: String,
}

/// Output of one finished analysis: model text or an error-marked string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub text: String,
}

impl AnalysisResult {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn is_error(&self) -> bool {
        self.text.contains(AGENT_ERROR_MARKER)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// One-shot banner shown on the next render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub setup_ok: bool,
    pub has_transcript: bool,
    pub transcript_chars: usize,
    pub action_items: Option<String>,
    pub follow_up_email: Option<String>,
    pub processing_action_items: bool,
    pub processing_email: bool,
    pub notices: Vec<Notice>,
}
