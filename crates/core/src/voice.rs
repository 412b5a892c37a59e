//! Voice selection for the supported speech-synthesis providers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::ValidationError;
use crate::style::Pacing;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoiceGender {
    Male,
    #[default]
    Female,
}

impl VoiceGender {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }
}

impl FromStr for VoiceGender {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            _ => Err(ValidationError::UnknownValue {
                field: "voice_gender",
                value: value.to_string(),
                expected: "male|female",
            }),
        }
    }
}

impl fmt::Display for VoiceGender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TtsProvider {
    #[default]
    Cartesia,
    #[serde(rename = "elevenlabs")]
    ElevenLabs,
}

impl TtsProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cartesia => "cartesia",
            Self::ElevenLabs => "elevenlabs",
        }
    }

    /// Resolves a provider name for voice lookup.
    ///
    /// Names other than `cartesia` and `elevenlabs` resolve to Cartesia. Callers
    /// have always relied on this, so it is kept even though it hides typos.
    pub fn resolve(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "cartesia" => Self::Cartesia,
            "elevenlabs" => Self::ElevenLabs,
            other => {
                debug!(
                    event_name = "voice.provider.fallback",
                    requested = other,
                    fallback = Self::Cartesia.as_str(),
                    "unrecognized tts provider, using cartesia voice table"
                );
                Self::Cartesia
            }
        }
    }

    pub fn voice_id(self, gender: VoiceGender) -> &'static str {
        match (self, gender) {
            (Self::Cartesia, VoiceGender::Male) => "a0e99841-438c-4a64-b679-ae501e7d6091",
            (Self::Cartesia, VoiceGender::Female) => "79a125e8-cd45-4c13-8a67-188112f4dd22",
            (Self::ElevenLabs, VoiceGender::Male) => "pNInz6obpgDQGcFmaJgB",
            (Self::ElevenLabs, VoiceGender::Female) => "EXAVITQu4vr4xnSDxMaL",
        }
    }
}

impl fmt::Display for TtsProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters handed to the speech synthesizer for a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VoiceParameters {
    pub provider: TtsProvider,
    pub voice_id: String,
    pub speed: String,
}

impl VoiceParameters {
    pub fn new(provider: TtsProvider, gender: VoiceGender, pacing: Pacing) -> Self {
        Self {
            provider,
            voice_id: provider.voice_id(gender).to_string(),
            speed: pacing.tts_speed().to_string(),
        }
    }
}
