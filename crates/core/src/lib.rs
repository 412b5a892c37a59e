//! Configuration model for the Mind Call Flow voice agents.
//!
//! Turns job metadata and environment defaults into a validated
//! [`AgentConfig`], and derives everything the session runtime needs from it:
//! the behavioral prompt ([`InstructionComposer`]) and the speech-synthesis
//! parameters ([`VoiceParameters`]). Nothing here performs I/O beyond reading
//! the runtime configuration file and environment in [`config`].

pub mod config;
pub mod errors;
pub mod instructions;
pub mod profile;
pub mod style;
pub mod voice;

pub use errors::{ToolFailure, ValidationError};
pub use instructions::{InstructionComposer, InstructionError};
pub use profile::{AgentConfig, AgentType};
pub use style::{ConversationalStyle, Pacing, Tone, Verbosity};
pub use voice::{TtsProvider, VoiceGender, VoiceParameters};
