use std::sync::Arc;
use tracing::{error, info, warn};

use crate::agents::{AgentBackend, AgentRunner, AgentSpec, ConversationContext, RigAgentBackend};
use crate::config::{CredentialStatus, Settings};
use crate::error::SetupError;
use crate::models::AnalysisKind;

/// Outcome of the startup steps, shown as banners on every page.
#[derive(Debug, Clone, Default)]
pub struct SetupStatus {
    pub errors: Vec<SetupError>,
}

impl SetupStatus {
    pub fn credential_problem(&self) -> Option<&SetupError> {
        self.errors.iter().find(|e| e.is_credential())
    }

    pub fn failures(&self) -> impl Iterator<Item = &SetupError> {
        self.errors.iter().filter(|e| !e.is_credential())
    }
}

/// Agents, conversation and runners built once at process start.
#[derive(Clone)]
pub struct AgentRuntime {
    pub setup: SetupStatus,
    pub salesperson: String,
    action_items: Option<AgentRunner>,
    email: Option<AgentRunner>,
}

impl AgentRuntime {
    pub fn initialize(settings: &Settings) -> Self {
        Self::initialize_with(settings, |api_key, spec| {
            Arc::new(RigAgentBackend::new(api_key, spec)) as Arc<dyn AgentBackend>
        })
    }

    /// Run every setup step, collecting failures instead of stopping at the
    /// first one. Runners are only built when everything before them worked.
    pub fn initialize_with<F>(settings: &Settings, build_backend: F) -> Self
    where
        F: Fn(&str, &AgentSpec) -> Arc<dyn AgentBackend>,
    {
        let mut setup = SetupStatus::default();

        let api_key = match settings.credential.check() {
            Ok(key) => Some(key),
            Err(e) => {
                warn!("{}", e);
                setup.errors.push(e);
                None
            }
        };

        let specs: Vec<AgentSpec> = AnalysisKind::ALL
            .iter()
            .map(|kind| AgentSpec::for_kind(*kind, settings))
            .collect();
        let mut agents_loaded = true;
        for spec in &specs {
            if let Err(e) = spec.validate() {
                error!("{}", e);
                setup.errors.push(e);
                agents_loaded = false;
            }
        }
        if agents_loaded {
            info!("Action Item and Email agents loaded successfully");
        }

        let mut runtime = Self {
            setup,
            salesperson: settings.salesperson.clone(),
            action_items: None,
            email: None,
        };

        let Some(api_key) = api_key.filter(|_| agents_loaded) else {
            if !agents_loaded && matches!(settings.credential, CredentialStatus::Valid(_)) {
                error!("Agent definition(s) could not be loaded. Cannot initialize runners");
            }
            return runtime;
        };

        let context = match ConversationContext::declare(
            settings.conversation.clone(),
            settings.max_history_turns,
        ) {
            Ok(context) => Arc::new(context),
            Err(e) => {
                error!("{}", e);
                runtime.setup.errors.push(e);
                return runtime;
            }
        };

        for spec in &specs {
            let runner = AgentRunner::new(spec.kind, build_backend(api_key, spec), context.clone());
            match spec.kind {
                AnalysisKind::ActionItems => runtime.action_items = Some(runner),
                AnalysisKind::Email => runtime.email = Some(runner),
            }
            info!("{} runner initialized", spec.kind.label());
        }

        runtime
    }

    pub fn runner(&self, kind: AnalysisKind) -> Option<&AgentRunner> {
        match kind {
            AnalysisKind::ActionItems => self.action_items.as_ref(),
            AnalysisKind::Email => self.email.as_ref(),
        }
    }

    /// Credential valid, agents built, runners ready.
    pub fn base_setup_ok(&self) -> bool {
        self.setup.errors.is_empty() && self.action_items.is_some() && self.email.is_some()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::agents::testing::ScriptedBackend;
    use crate::config::ConversationIds;
    use std::path::PathBuf;

    pub fn settings(credential: CredentialStatus) -> Settings {
        Settings {
            env_file: PathBuf::from(".env"),
            credential,
            model: "google/gemini-2.0-flash-001".into(),
            salesperson: "Adi Tiwari".into(),
            port: 3000,
            max_history_turns: 10,
            max_upload_mb: 200,
            conversation: ConversationIds::default(),
        }
    }

    /// A ready runtime whose agents replay scripted outcomes.
    pub fn runtime(action_items: Arc<ScriptedBackend>, email: Arc<ScriptedBackend>) -> AgentRuntime {
        AgentRuntime::initialize_with(
            &settings(CredentialStatus::Valid("test-key".into())),
            move |_, spec| match spec.kind {
                AnalysisKind::ActionItems => action_items.clone() as Arc<dyn AgentBackend>,
                AnalysisKind::Email => email.clone() as Arc<dyn AgentBackend>,
            },
        )
    }
}
