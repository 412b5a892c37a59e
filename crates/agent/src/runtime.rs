use anyhow::Result;
use async_trait::async_trait;
use callflow_core::AgentType;
use tracing::{error, info};
use uuid::Uuid;

use crate::session::{PlanError, SessionPlan, SessionPlanner};

/// The audio session runtime: room transport, STT, LLM and TTS providers.
#[async_trait]
pub trait VoiceRuntime: Send + Sync {
    async fn start(&self, session_id: Uuid, plan: SessionPlan) -> Result<()>;
}

/// Runtime for local development: logs the plan and returns.
#[derive(Clone, Copy, Debug, Default)]
pub struct LoggingRuntime;

#[async_trait]
impl VoiceRuntime for LoggingRuntime {
    async fn start(&self, session_id: Uuid, plan: SessionPlan) -> Result<()> {
        info!(
            event_name = "runtime.session.dry_run",
            session_id = %session_id,
            worker = plan.worker_name,
            stt_model = %plan.stt_model,
            llm_model = %plan.llm_model,
            tts_provider = %plan.voice.provider,
            voice_id = %plan.voice.voice_id,
            speed = %plan.voice.speed,
            tools = ?plan.tools.names(),
            "no voice transport linked, session not started"
        );
        Ok(())
    }
}

/// One worker process: a fixed agent type serving jobs one at a time.
pub struct AgentRuntime<R> {
    agent_type: AgentType,
    planner: SessionPlanner,
    runtime: R,
}

impl<R: VoiceRuntime> AgentRuntime<R> {
    pub fn new(agent_type: AgentType, planner: SessionPlanner, runtime: R) -> Self {
        Self { agent_type, planner, runtime }
    }

    pub fn agent_type(&self) -> AgentType {
        self.agent_type
    }

    pub fn worker_name(&self) -> &'static str {
        self.agent_type.worker_name()
    }

    /// Plans and starts a session for one job. A configuration that fails
    /// validation is reported before anything reaches the voice runtime.
    pub async fn handle_job(&self, metadata: &str) -> Result<Uuid, PlanError> {
        let session_id = Uuid::new_v4();
        let plan = match self.planner.plan(self.agent_type, metadata) {
            Ok(plan) => plan,
            Err(plan_error) => {
                error!(
                    event_name = "runtime.session.rejected",
                    session_id = %session_id,
                    agent_type = %self.agent_type,
                    worker = self.worker_name(),
                    error = %plan_error,
                    "job configuration rejected"
                );
                return Err(plan_error);
            }
        };

        info!(
            event_name = "runtime.session.planned",
            session_id = %session_id,
            agent_type = %self.agent_type,
            worker = self.worker_name(),
            voice_gender = %plan.config.voice_gender,
            tone = %plan.config.style.tone,
            verbosity = %plan.config.style.verbosity,
            pacing = %plan.config.style.pacing,
            user_name = plan.config.user_name.as_deref().unwrap_or(""),
            "starting agent session"
        );

        if let Err(start_error) = self.runtime.start(session_id, plan).await {
            // Runtime failures belong to the session, not the worker.
            error!(
                event_name = "runtime.session.failed",
                session_id = %session_id,
                worker = self.worker_name(),
                error = %start_error,
                "voice session ended with an error"
            );
        }

        Ok(session_id)
    }
}
