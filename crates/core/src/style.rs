//! Conversational style settings and the instruction fragments derived from them.
//!
//! Each attribute maps to exactly one fixed sentence. The sentences are
//! independent of each other, so rendering is a plain lookup per attribute.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Formal,
    Casual,
    #[default]
    Friendly,
    Empathetic,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verbosity {
    Concise,
    #[default]
    Balanced,
    Detailed,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pacing {
    Slow,
    #[default]
    Normal,
    Fast,
}

impl Tone {
    pub const ALL: [Tone; 4] = [Self::Formal, Self::Casual, Self::Friendly, Self::Empathetic];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Formal => "formal",
            Self::Casual => "casual",
            Self::Friendly => "friendly",
            Self::Empathetic => "empathetic",
        }
    }

    pub fn modifier(self) -> &'static str {
        match self {
            Self::Formal => "Maintain a professional and formal tone.",
            Self::Casual => "Use a casual, conversational tone.",
            Self::Friendly => "Be warm, friendly, and approachable.",
            Self::Empathetic => "Show empathy and understanding. Be supportive.",
        }
    }
}

impl Verbosity {
    pub const ALL: [Verbosity; 3] = [Self::Concise, Self::Balanced, Self::Detailed];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Concise => "concise",
            Self::Balanced => "balanced",
            Self::Detailed => "detailed",
        }
    }

    pub fn modifier(self) -> &'static str {
        match self {
            Self::Concise => "Keep responses brief and to the point (1-2 sentences).",
            Self::Balanced => "Provide clear but concise responses (2-3 sentences).",
            Self::Detailed => "Give thorough, detailed explanations.",
        }
    }
}

impl Pacing {
    pub const ALL: [Pacing; 3] = [Self::Slow, Self::Normal, Self::Fast];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Slow => "slow",
            Self::Normal => "normal",
            Self::Fast => "fast",
        }
    }

    pub fn modifier(self) -> &'static str {
        match self {
            Self::Slow => "Speak slowly and clearly. Pause between thoughts.",
            Self::Normal => "Speak at a natural, conversational pace.",
            Self::Fast => "Speak energetically and efficiently.",
        }
    }

    /// Speed parameter passed through to the speech synthesizer.
    pub fn tts_speed(self) -> &'static str {
        self.as_str()
    }
}

impl FromStr for Tone {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "formal" => Ok(Self::Formal),
            "casual" => Ok(Self::Casual),
            "friendly" => Ok(Self::Friendly),
            "empathetic" => Ok(Self::Empathetic),
            _ => Err(ValidationError::UnknownValue {
                field: "tone",
                value: value.to_string(),
                expected: "formal|casual|friendly|empathetic",
            }),
        }
    }
}

impl FromStr for Verbosity {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "concise" => Ok(Self::Concise),
            "balanced" => Ok(Self::Balanced),
            "detailed" => Ok(Self::Detailed),
            _ => Err(ValidationError::UnknownValue {
                field: "verbosity",
                value: value.to_string(),
                expected: "concise|balanced|detailed",
            }),
        }
    }
}

impl FromStr for Pacing {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "slow" => Ok(Self::Slow),
            "normal" => Ok(Self::Normal),
            "fast" => Ok(Self::Fast),
            _ => Err(ValidationError::UnknownValue {
                field: "pacing",
                value: value.to_string(),
                expected: "slow|normal|fast",
            }),
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Pacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tone, verbosity and pacing for one session. Read-only once built.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationalStyle {
    pub tone: Tone,
    pub verbosity: Verbosity,
    pub pacing: Pacing,
}

impl ConversationalStyle {
    pub fn new(tone: Tone, verbosity: Verbosity, pacing: Pacing) -> Self {
        Self { tone, verbosity, pacing }
    }

    /// Renders the tone, verbosity and pacing sentences, in that order.
    pub fn render_modifiers(&self) -> String {
        [self.tone.modifier(), self.verbosity.modifier(), self.pacing.modifier()].join(" ")
    }
}
