//! Agent runtime for the Mind Call Flow voice workers.
//!
//! A worker serves one agent type. For each job it turns the job metadata into
//! a [`session::SessionPlan`] (prompt, greeting, voice, models and the tool
//! family for that agent type) and hands it to a [`runtime::VoiceRuntime`],
//! which owns audio transport and the speech/LLM providers.
//!
//! # Tools
//!
//! The language model calls tools by name through [`tools::ToolRegistry`].
//! Tools always answer with text the agent can speak, even when arguments are
//! missing or malformed. Tools that record something write to a shared
//! in-memory [`store::DemoStore`].

pub mod runtime;
pub mod session;
pub mod store;
pub mod tools;

pub use runtime::{AgentRuntime, LoggingRuntime, VoiceRuntime};
pub use session::{PlanError, SessionPlan, SessionPlanner, SessionSettings};
pub use store::DemoStore;
pub use tools::{Tool, ToolRegistry};
