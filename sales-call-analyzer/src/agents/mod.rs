pub mod context;
pub mod rig_backend;

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info};

use crate::config::Settings;
use crate::error::{AgentError, SetupError};
use crate::models::{AGENT_ERROR_MARKER, AnalysisKind};
use crate::prompts;

pub use context::{ChatMessage, ConversationContext, MessageRole};
pub use rig_backend::RigAgentBackend;

/// How one agent turn ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentOutcome {
    /// The model answered.
    Final(String),
    /// The runtime gave up, optionally saying why.
    Escalated(Option<String>),
    /// The turn finished without a final answer.
    NoFinalResponse,
}

/// Submits one user message to a hosted model and reports how the turn ended.
#[async_trait]
pub trait AgentBackend: Send + Sync {
    async fn submit(
        &self,
        message: &str,
        context: &ConversationContext,
    ) -> anyhow::Result<AgentOutcome>;
}

/// Binding of an instruction prompt to a hosted model.
#[derive(Debug, Clone)]
pub struct AgentSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: AnalysisKind,
    pub model: String,
    pub instruction: String,
}

impl AgentSpec {
    pub fn for_kind(kind: AnalysisKind, settings: &Settings) -> Self {
        match kind {
            AnalysisKind::ActionItems => Self {
                name: "action_item_extractor",
                description: "Analyzes a sales call transcript to extract action items for the salesperson.",
                kind,
                model: settings.model.clone(),
                instruction: prompts::action_item_instructions(&settings.salesperson),
            },
            AnalysisKind::Email => Self {
                name: "email_follow_up_generator",
                description: "Generates a sales follow-up email based on a call transcript.",
                kind,
                model: settings.model.clone(),
                instruction: prompts::email_follow_up_instructions(&settings.salesperson),
            },
        }
    }

    pub fn validate(&self) -> Result<(), SetupError> {
        let reason = if self.model.trim().is_empty() {
            "model name is empty"
        } else if self.instruction.trim().is_empty() {
            "instruction prompt is empty"
        } else {
            return Ok(());
        };

        Err(SetupError::AgentConstruction {
            name: self.name.to_string(),
            reason: reason.to_string(),
        })
    }
}

/// An agent backend bound to the shared conversation.
#[derive(Clone)]
pub struct AgentRunner {
    pub kind: AnalysisKind,
    backend: Arc<dyn AgentBackend>,
    context: Arc<ConversationContext>,
}

impl AgentRunner {
    pub fn new(
        kind: AnalysisKind,
        backend: Arc<dyn AgentBackend>,
        context: Arc<ConversationContext>,
    ) -> Self {
        Self {
            kind,
            backend,
            context,
        }
    }
}

/// Run one analysis turn over the transcript.
///
/// Escalations and missing final answers come back as `Ok` text so the UI can
/// show them in place of a result; only a missing runner or a failed round
/// trip is an `Err`.
pub async fn run_agent(
    transcript: &str,
    runner: Option<&AgentRunner>,
    kind: AnalysisKind,
) -> Result<String, AgentError> {
    let Some(runner) = runner else {
        error!("Runner for {} not initialized", kind.label());
        return Err(AgentError::RunnerNotInitialized(kind));
    };

    info!("Running {} agent...", kind.label());
    let outcome = runner
        .backend
        .submit(transcript, &runner.context)
        .await
        .map_err(|source| {
            error!("Error during {} agent execution: {:#}", kind.label(), source);
            AgentError::AgentInvocationError { kind, source }
        })?;

    let text = match outcome {
        AgentOutcome::Final(text) => {
            info!("{} agent finished successfully", kind.label());
            text
        }
        AgentOutcome::Escalated(message) => {
            let message = message.unwrap_or_else(|| "No specific message.".to_string());
            error!("Agent Error during {}: {}", kind.label(), message);
            agent_error_text(kind, &message)
        }
        AgentOutcome::NoFinalResponse => {
            format!("{} agent did not produce a final response.", kind.label())
        }
    };
    Ok(text)
}

/// Result text for a failed analysis, recognizable by the error marker.
pub fn agent_error_text(kind: AnalysisKind, message: &str) -> String {
    format!("{} {} failed: {}", AGENT_ERROR_MARKER, kind.label(), message)
}
