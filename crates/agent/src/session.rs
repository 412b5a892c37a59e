//! Everything a voice session needs, decided before any audio flows.

use std::sync::Arc;

use callflow_core::config::AppConfig;
use callflow_core::profile::{DEFAULT_LLM_MODEL, DEFAULT_STT_MODEL};
use callflow_core::{
    AgentConfig, AgentType, InstructionComposer, InstructionError, TtsProvider, ValidationError,
    VoiceParameters,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::store::DemoStore;
use crate::tools::ToolRegistry;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Instructions(#[from] InstructionError),
}

/// Provider choices shared by every session a worker starts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionSettings {
    pub stt_model: String,
    pub llm_model: String,
    pub tts_provider: TtsProvider,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            stt_model: DEFAULT_STT_MODEL.to_string(),
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            tts_provider: TtsProvider::Cartesia,
        }
    }
}

impl SessionSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            stt_model: config.providers.stt_model.clone(),
            llm_model: config.providers.llm_model.clone(),
            tts_provider: config.providers.tts_provider,
        }
    }
}

#[derive(Debug)]
pub struct SessionPlan {
    pub worker_name: &'static str,
    pub config: AgentConfig,
    pub instructions: String,
    pub greeting: String,
    pub voice: VoiceParameters,
    pub stt_model: String,
    pub llm_model: String,
    pub tools: ToolRegistry,
}

impl SessionPlan {
    /// JSON view of the plan, with tool schemas in registration order.
    pub fn summary(&self) -> Value {
        json!({
            "worker": self.worker_name,
            "config": self.config,
            "instructions": self.instructions,
            "greeting": self.greeting,
            "voice": self.voice,
            "stt_model": self.stt_model,
            "llm_model": self.llm_model,
            "tools": self.tools.json_schemas(),
        })
    }
}

pub struct SessionPlanner {
    composer: InstructionComposer,
    store: Arc<DemoStore>,
    settings: SessionSettings,
}

impl SessionPlanner {
    pub fn new(
        composer: InstructionComposer,
        store: Arc<DemoStore>,
        settings: SessionSettings,
    ) -> Self {
        Self { composer, store, settings }
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn store(&self) -> &Arc<DemoStore> {
        &self.store
    }

    /// Plans a session for the worker's agent type from raw job metadata.
    ///
    /// The worker's type wins over any `agent_type` in the metadata. Blank
    /// metadata falls back to the environment defaults.
    pub fn plan(&self, agent_type: AgentType, metadata: &str) -> Result<SessionPlan, PlanError> {
        let config = AgentConfig::from_metadata(metadata)?.with_agent_type(agent_type);
        self.plan_config(config)
    }

    pub fn plan_config(&self, config: AgentConfig) -> Result<SessionPlan, PlanError> {
        let instructions = self.composer.instructions(&config)?;
        let greeting = self.composer.greeting(&config)?;
        let voice = config.voice_parameters(self.settings.tts_provider);
        let tools = ToolRegistry::for_agent(config.agent_type, self.store.clone());

        Ok(SessionPlan {
            worker_name: config.agent_type.worker_name(),
            config,
            instructions,
            greeting,
            voice,
            stt_model: self.settings.stt_model.clone(),
            llm_model: self.settings.llm_model.clone(),
            tools,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use callflow_core::{AgentType, InstructionComposer, TtsProvider, ValidationError};

    use super::{PlanError, SessionPlanner, SessionSettings};
    use crate::store::DemoStore;

    fn planner(tts_provider: TtsProvider) -> SessionPlanner {
        let composer = InstructionComposer::new().expect("templates load");
        let settings = SessionSettings { tts_provider, ..SessionSettings::default() };
        SessionPlanner::new(composer, Arc::new(DemoStore::new()), settings)
    }

    #[test]
    fn worker_type_overrides_metadata_agent_type() {
        let plan = planner(TtsProvider::Cartesia)
            .plan(AgentType::Scheduling, r#"{"agent_type": "outbound", "voice_gender": "male"}"#)
            .expect("plan");

        assert_eq!(plan.worker_name, "scheduling-agent");
        assert_eq!(plan.config.agent_type, AgentType::Scheduling);
        assert_eq!(plan.voice.voice_id, "a0e99841-438c-4a64-b679-ae501e7d6091");
        assert_eq!(
            plan.tools.names(),
            vec!["check_availability", "book_appointment", "send_confirmation"]
        );
        assert!(plan.instructions.starts_with("You are a helpful AI voice assistant. "));
    }

    #[test]
    fn outbound_plan_addresses_the_user_by_name() {
        let plan = planner(TtsProvider::ElevenLabs)
            .plan(AgentType::Outbound, r#"{"user_name": "Priya", "style": {"pacing": "fast"}}"#)
            .expect("plan");

        assert!(plan.instructions.contains("You are making an outbound call to Priya."));
        assert!(plan.greeting.starts_with("Greet Priya warmly by name"));
        assert_eq!(plan.voice.provider, TtsProvider::ElevenLabs);
        assert_eq!(plan.voice.speed, "fast");
    }

    #[test]
    fn invalid_metadata_never_produces_a_plan() {
        let error = planner(TtsProvider::Cartesia)
            .plan(AgentType::General, r#"{"style": {"tone": "sarcastic"}}"#)
            .expect_err("unknown tone");

        assert!(matches!(
            error,
            PlanError::Validation(ValidationError::UnknownValue { field: "tone", .. })
        ));
    }

    #[test]
    fn summary_lists_tool_schemas() {
        let plan = planner(TtsProvider::Cartesia)
            .plan(AgentType::CustomerService, "{}")
            .expect("plan");
        let summary = plan.summary();

        assert_eq!(summary["worker"], "customer-service-agent");
        assert_eq!(summary["tools"][0]["name"], "search_knowledge_base");
        assert_eq!(summary["stt_model"], "deepgram/nova-2");
    }
}
