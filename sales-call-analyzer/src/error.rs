use thiserror::Error;

use crate::models::AnalysisKind;

/// Why a transcript could not be produced from an uploaded PDF.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Cannot process encrypted PDF files")]
    EncryptedDocument,

    #[error("No text could be extracted from the PDF. Please ensure it's text-based")]
    NoExtractableText,

    #[error("Error reading PDF: {0}. Please ensure it's a valid, text-based PDF")]
    MalformedDocument(String),

    #[error("An unexpected error occurred during PDF parsing: {0}")]
    UnknownExtractionError(#[source] anyhow::Error),
}

/// Failures of a single agent round trip.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Runner for {} is not initialized. Cannot process request", .0.label())]
    RunnerNotInitialized(AnalysisKind),

    #[error("An error occurred while running the {} agent: {source}", .kind.label())]
    AgentInvocationError {
        kind: AnalysisKind,
        #[source]
        source: anyhow::Error,
    },
}

/// Startup problems that disable analysis without stopping the process.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SetupError {
    #[error("API key {0} not found in the environment file")]
    MissingCredential(String),

    #[error("API key {0} is still the placeholder value")]
    PlaceholderCredential(String),

    #[error("Failed to construct agent {name}: {reason}")]
    AgentConstruction { name: String, reason: String },

    #[error("Failed to initialize session/runner: {0}")]
    RunnerInitialization(String),
}

impl SetupError {
    /// Credential problems only warn; everything else is a hard setup failure.
    pub fn is_credential(&self) -> bool {
        matches!(
            self,
            SetupError::MissingCredential(_) | SetupError::PlaceholderCredential(_)
        )
    }
}
