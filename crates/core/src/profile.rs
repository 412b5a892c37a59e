//! Per-session agent configuration.
//!
//! An [`AgentConfig`] is built from untyped job metadata (or from environment
//! defaults) by a schema-driven parser. Unknown keys are ignored; recognized
//! keys with values outside their domain are rejected with a
//! [`ValidationError`] before any session is created.

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::ValidationError;
use crate::style::{ConversationalStyle, Pacing, Tone, Verbosity};
use crate::voice::{TtsProvider, VoiceGender, VoiceParameters};

pub const DEFAULT_STT_MODEL: &str = "deepgram/nova-2";
pub const DEFAULT_LLM_MODEL: &str = "openai/gpt-4o-mini";

const BASE_PREAMBLE: &str = "You are a helpful AI voice assistant. ";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentType {
    #[default]
    General,
    Scheduling,
    CustomerService,
    Outbound,
}

impl AgentType {
    pub const ALL: [AgentType; 4] =
        [Self::General, Self::Scheduling, Self::CustomerService, Self::Outbound];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Scheduling => "scheduling",
            Self::CustomerService => "customer_service",
            Self::Outbound => "outbound",
        }
    }

    /// Name the worker registers under with the session runtime.
    pub fn worker_name(self) -> &'static str {
        match self {
            Self::General => "general-assistant",
            Self::Scheduling => "scheduling-agent",
            Self::CustomerService => "customer-service-agent",
            Self::Outbound => "outbound-caller-agent",
        }
    }
}

impl FromStr for AgentType {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "general" => Ok(Self::General),
            "scheduling" => Ok(Self::Scheduling),
            "customer_service" => Ok(Self::CustomerService),
            "outbound" => Ok(Self::Outbound),
            _ => Err(ValidationError::UnknownValue {
                field: "agent_type",
                value: value.to_string(),
                expected: "general|scheduling|customer_service|outbound",
            }),
        }
    }
}

impl fmt::Display for AgentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AgentConfig {
    pub agent_type: AgentType,
    pub voice_gender: VoiceGender,
    pub style: ConversationalStyle,
    pub user_name: Option<String>,
    pub user_phone: Option<String>,
    pub user_email: Option<String>,
}

impl AgentConfig {
    /// Builds a configuration from a job-metadata mapping.
    pub fn validate(raw: &Map<String, Value>) -> Result<Self, ValidationError> {
        let mut config = Self::default();

        if let Some(value) = enum_field(raw, "agent_type")? {
            config.agent_type = value.parse()?;
        }
        if let Some(value) = enum_field(raw, "voice_gender")? {
            config.voice_gender = value.parse()?;
        }
        config.style = parse_style(raw)?;
        config.user_name = text_field(raw, "user_name")?;
        config.user_phone = text_field(raw, "user_phone")?;
        config.user_email = text_field(raw, "user_email")?;

        Ok(config)
    }

    /// Parses job metadata delivered as a JSON document. Blank metadata or an
    /// empty object means the job carried none, and the environment defaults
    /// apply.
    pub fn from_metadata(metadata: &str) -> Result<Self, ValidationError> {
        if metadata.trim().is_empty() {
            return Self::from_env();
        }

        let value: Value = serde_json::from_str(metadata)
            .map_err(|error| ValidationError::MalformedMetadata(error.to_string()))?;
        match value {
            Value::Object(map) if map.is_empty() => Self::from_env(),
            Value::Object(map) => Self::validate(&map),
            other => Err(ValidationError::MalformedMetadata(format!(
                "expected a JSON object, found {}",
                json_kind(&other)
            ))),
        }
    }

    /// Default configuration sourced from the process environment.
    pub fn from_env() -> Result<Self, ValidationError> {
        let vars = DEFAULT_ENV_KEYS
            .iter()
            .filter_map(|key| env::var(key).ok().map(|value| ((*key).to_string(), value)))
            .collect::<HashMap<_, _>>();
        Self::from_env_map(&vars)
    }

    /// Default configuration sourced from `DEFAULT_*` variables, each with a
    /// hardcoded fallback.
    pub fn from_env_map(vars: &HashMap<String, String>) -> Result<Self, ValidationError> {
        let read = |key: &str, fallback: &'static str| -> String {
            vars.get(key)
                .map(|value| value.trim())
                .filter(|value| !value.is_empty())
                .unwrap_or(fallback)
                .to_string()
        };

        Ok(Self {
            agent_type: read("DEFAULT_AGENT_TYPE", "general").parse()?,
            voice_gender: read("DEFAULT_VOICE_GENDER", "female").parse()?,
            style: ConversationalStyle::new(
                read("DEFAULT_TONE", "friendly").parse::<Tone>()?,
                read("DEFAULT_VERBOSITY", "balanced").parse::<Verbosity>()?,
                read("DEFAULT_PACING", "normal").parse::<Pacing>()?,
            ),
            user_name: None,
            user_phone: None,
            user_email: None,
        })
    }

    /// Applies the launching worker's agent type.
    pub fn with_agent_type(mut self, agent_type: AgentType) -> Self {
        self.agent_type = agent_type;
        self
    }

    pub fn voice_id(&self, provider: &str) -> &'static str {
        TtsProvider::resolve(provider).voice_id(self.voice_gender)
    }

    pub fn voice_parameters(&self, provider: TtsProvider) -> VoiceParameters {
        VoiceParameters::new(provider, self.voice_gender, self.style.pacing)
    }

    pub fn base_instructions(&self) -> String {
        format!("{BASE_PREAMBLE}{}", self.style.render_modifiers())
    }

    /// Name used to address the user on personalized calls.
    pub fn display_name(&self) -> &str {
        self.user_name.as_deref().unwrap_or("there")
    }
}

pub const DEFAULT_ENV_KEYS: [&str; 5] = [
    "DEFAULT_AGENT_TYPE",
    "DEFAULT_VOICE_GENDER",
    "DEFAULT_TONE",
    "DEFAULT_VERBOSITY",
    "DEFAULT_PACING",
];

fn parse_style(raw: &Map<String, Value>) -> Result<ConversationalStyle, ValidationError> {
    let nested = match raw.get("style") {
        None | Some(Value::Null) => None,
        Some(Value::Object(map)) => Some(map),
        Some(_) => {
            return Err(ValidationError::InvalidType {
                field: "style",
                expected: "an object with tone, verbosity and pacing",
            })
        }
    };

    let mut style = ConversationalStyle::default();
    if let Some(value) = style_field(nested, raw, "tone", "style.tone")? {
        style.tone = value.parse()?;
    }
    if let Some(value) = style_field(nested, raw, "verbosity", "style.verbosity")? {
        style.verbosity = value.parse()?;
    }
    if let Some(value) = style_field(nested, raw, "pacing", "style.pacing")? {
        style.pacing = value.parse()?;
    }
    Ok(style)
}

// The dotted form wins when both spellings are present.
fn style_field<'a>(
    nested: Option<&'a Map<String, Value>>,
    raw: &'a Map<String, Value>,
    key: &'static str,
    dotted: &'static str,
) -> Result<Option<&'a str>, ValidationError> {
    if let Some(value) = enum_field(raw, dotted)? {
        return Ok(Some(value));
    }
    match nested {
        Some(map) => enum_field(map, key),
        None => Ok(None),
    }
}

fn enum_field<'a>(
    raw: &'a Map<String, Value>,
    key: &'static str,
) -> Result<Option<&'a str>, ValidationError> {
    match raw.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.as_str())),
        Some(_) => Err(ValidationError::InvalidType { field: key, expected: "a string" }),
    }
}

fn text_field(
    raw: &Map<String, Value>,
    key: &'static str,
) -> Result<Option<String>, ValidationError> {
    match raw.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) if value.trim().is_empty() => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(_) => Err(ValidationError::InvalidType { field: key, expected: "a string or null" }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
