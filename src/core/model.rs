use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct ModelId(pub String);

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ModelId {
    fn from(s: &str) -> Self {
        ModelId(s.to_string())
    }
}

/// Model vendor (informational, not used for routing)
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelVendor {
    OpenAI,
    Anthropic,
}

impl fmt::Display for ModelVendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenAI => write!(f, "OpenAI"),
            Self::Anthropic => write!(f, "Anthropic"),
        }
    }
}

/// One entry of the model menu shown to the user.
#[derive(Debug, Clone, Copy)]
pub struct ModelChoice {
    pub id: &'static str,
    pub name: &'static str,
    pub vendor: ModelVendor,
}

impl ModelChoice {
    pub fn model_id(&self) -> ModelId {
        ModelId(self.id.to_string())
    }
}

/// The closed list of models offered by the front ends. The first entry is
/// the default selection.
pub const MODELS: &[ModelChoice] = &[
    ModelChoice {
        id: "gpt-3.5-turbo",
        name: "GPT-3.5 Turbo",
        vendor: ModelVendor::OpenAI,
    },
    ModelChoice {
        id: "gpt-4o",
        name: "GPT-4o",
        vendor: ModelVendor::OpenAI,
    },
    ModelChoice {
        id: "gpt-4-turbo",
        name: "GPT-4 Turbo",
        vendor: ModelVendor::OpenAI,
    },
    ModelChoice {
        id: "o1-mini",
        name: "o1 mini",
        vendor: ModelVendor::OpenAI,
    },
    ModelChoice {
        id: "o1-preview",
        name: "o1 preview",
        vendor: ModelVendor::OpenAI,
    },
    ModelChoice {
        id: "claude-3-5-sonnet-20241022",
        name: "Claude 3.5 Sonnet",
        vendor: ModelVendor::Anthropic,
    },
];

pub fn default_model() -> &'static ModelChoice {
    &MODELS[0]
}

pub fn get_model(id: &ModelId) -> Option<&'static ModelChoice> {
    MODELS.iter().find(|m| m.id == id.0)
}

/// Resolve a menu selection: a 1-based index into [`MODELS`] or an exact id.
pub fn resolve_choice(input: &str) -> Option<&'static ModelChoice> {
    let input = input.trim();
    match input.parse::<usize>() {
        Ok(n) if n >= 1 && n <= MODELS.len() => Some(&MODELS[n - 1]),
        Ok(_) => None,
        Err(_) => MODELS.iter().find(|m| m.id == input),
    }
}

/// Position of `id` in [`MODELS`], or 0 when it is not listed.
pub fn position(id: &ModelId) -> usize {
    MODELS.iter().position(|m| m.id == id.0).unwrap_or(0)
}
