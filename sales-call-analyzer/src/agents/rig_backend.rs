//! rig-core backend on the OpenRouter provider.

use async_trait::async_trait;
use rig::{
    agent::Agent,
    client::CompletionClient,
    completion::{Chat, CompletionError, Message, PromptError},
    providers::openrouter,
};
use tracing::{debug, info};

use super::{AgentBackend, AgentOutcome, AgentSpec, ChatMessage, ConversationContext, MessageRole};

pub struct RigAgentBackend {
    name: &'static str,
    agent: Agent<openrouter::CompletionModel>,
}

impl RigAgentBackend {
    pub fn new(api_key: &str, spec: &AgentSpec) -> Self {
        let client = openrouter::Client::new(api_key);
        let agent = client
            .agent(&spec.model)
            .preamble(&spec.instruction)
            .build();
        info!(agent = spec.name, model = %spec.model, "Agent constructed");

        Self {
            name: spec.name,
            agent,
        }
    }
}

#[async_trait]
impl AgentBackend for RigAgentBackend {
    async fn submit(
        &self,
        message: &str,
        context: &ConversationContext,
    ) -> anyhow::Result<AgentOutcome> {
        let history = to_rig_messages(&context.history().await);
        debug!(
            agent = self.name,
            session_id = %context.ids.session_id,
            history_len = history.len(),
            "Submitting transcript"
        );

        match self.agent.chat(message, history).await {
            Ok(answer) if answer.trim().is_empty() => Ok(AgentOutcome::NoFinalResponse),
            Ok(answer) => {
                context.record_turn(message, answer.clone()).await;
                Ok(AgentOutcome::Final(answer))
            }
            // The provider answered, but with an error payload (quota, safety, ...)
            Err(PromptError::CompletionError(CompletionError::ProviderError(msg))) => {
                Ok(AgentOutcome::Escalated(Some(msg)))
            }
            Err(e) => Err(e.into()),
        }
    }
}

pub fn to_rig_message(msg: &ChatMessage) -> Message {
    match msg.role {
        MessageRole::User => Message::user(msg.content.clone()),
        MessageRole::Assistant => Message::assistant(msg.content.clone()),
    }
}

pub fn to_rig_messages(messages: &[ChatMessage]) -> Vec<Message> {
    messages.iter().map(to_rig_message).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConversationIds, Settings};
    use crate::models::AnalysisKind;

    #[test]
    fn test_batch_conversion() {
        let messages = vec![ChatMessage::user("Hello"), ChatMessage::assistant("Hi")];
        let rig_messages = to_rig_messages(&messages);
        assert_eq!(rig_messages.len(), 2);
    }

    /// Live round trip against OpenRouter.
    /// Usage: OPENROUTER_API_KEY=key cargo test test_live_action_items
    #[tokio::test]
    async fn test_live_action_items() -> anyhow::Result<()> {
        let settings = Settings::load();
        let Some(api_key) = settings.credential.api_key() else {
            println!("Skipping test - set OPENROUTER_API_KEY environment variable");
            return Ok(());
        };

        let spec = AgentSpec::for_kind(AnalysisKind::ActionItems, &settings);
        let backend = RigAgentBackend::new(api_key, &spec);
        let context = ConversationContext::declare(ConversationIds::default(), 2)?;

        let outcome = backend
            .submit(
                "Adi: I'll send you the pricing sheet by Friday.\nCustomer: Great, thanks.",
                &context,
            )
            .await?;
        println!("Outcome: {:?}", outcome);
        assert!(!matches!(outcome, AgentOutcome::NoFinalResponse));
        Ok(())
    }
}
