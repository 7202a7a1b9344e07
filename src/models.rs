//! Known LLM model names and their providers.
//!
//! Requests carry the model as a plain string, so services that offer models
//! not listed here still work; these names exist for validation and CLI help.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Model provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[serde(rename = "openai")]
    OpenAi,
    Anthropic,
    Google,
    Groq,
    Aws,
    /// Fake provider for testing.
    Fake,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
            Provider::Google => "google",
            Provider::Groq => "groq",
            Provider::Aws => "aws",
            Provider::Fake => "fake",
        };
        write!(f, "{}", s)
    }
}

/// A model name the agent service is known to accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelName {
    #[serde(rename = "gpt-4o-mini")]
    Gpt4oMini,
    #[serde(rename = "gpt-4o")]
    Gpt4o,
    #[serde(rename = "claude-3-haiku")]
    Haiku3,
    #[serde(rename = "claude-3.5-haiku")]
    Haiku35,
    #[serde(rename = "claude-3.5-sonnet")]
    Sonnet35,
    #[serde(rename = "gemini-1.5-flash")]
    Gemini15Flash,
    #[serde(rename = "groq-llama-3.1-8b")]
    Llama31_8b,
    #[serde(rename = "groq-llama-3.3-70b")]
    Llama33_70b,
    #[serde(rename = "groq-llama-guard-3-8b")]
    LlamaGuard3_8b,
    #[serde(rename = "bedrock-3.5-haiku")]
    BedrockHaiku,
    #[serde(rename = "fake")]
    Fake,
}

impl ModelName {
    /// Every known model, grouped by provider.
    pub const ALL: [ModelName; 11] = [
        ModelName::Gpt4oMini,
        ModelName::Gpt4o,
        ModelName::Haiku3,
        ModelName::Haiku35,
        ModelName::Sonnet35,
        ModelName::Gemini15Flash,
        ModelName::Llama31_8b,
        ModelName::Llama33_70b,
        ModelName::LlamaGuard3_8b,
        ModelName::BedrockHaiku,
        ModelName::Fake,
    ];

    /// The wire name of the model.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelName::Gpt4oMini => "gpt-4o-mini",
            ModelName::Gpt4o => "gpt-4o",
            ModelName::Haiku3 => "claude-3-haiku",
            ModelName::Haiku35 => "claude-3.5-haiku",
            ModelName::Sonnet35 => "claude-3.5-sonnet",
            ModelName::Gemini15Flash => "gemini-1.5-flash",
            ModelName::Llama31_8b => "groq-llama-3.1-8b",
            ModelName::Llama33_70b => "groq-llama-3.3-70b",
            ModelName::LlamaGuard3_8b => "groq-llama-guard-3-8b",
            ModelName::BedrockHaiku => "bedrock-3.5-haiku",
            ModelName::Fake => "fake",
        }
    }

    pub fn provider(&self) -> Provider {
        match self {
            ModelName::Gpt4oMini | ModelName::Gpt4o => Provider::OpenAi,
            ModelName::Haiku3 | ModelName::Haiku35 | ModelName::Sonnet35 => Provider::Anthropic,
            ModelName::Gemini15Flash => Provider::Google,
            ModelName::Llama31_8b | ModelName::Llama33_70b | ModelName::LlamaGuard3_8b => {
                Provider::Groq
            }
            ModelName::BedrockHaiku => Provider::Aws,
            ModelName::Fake => Provider::Fake,
        }
    }
}

impl fmt::Display for ModelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ModelName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModelName::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| format!("unknown model '{s}'"))
    }
}

impl From<ModelName> for String {
    fn from(model: ModelName) -> Self {
        model.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_round_trip_through_from_str() {
        for model in ModelName::ALL {
            assert_eq!(model.as_str().parse::<ModelName>().unwrap(), model);
        }
    }

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&ModelName::Sonnet35).unwrap();
        assert_eq!(json, "\"claude-3.5-sonnet\"");
        let provider: Provider = serde_json::from_str("\"openai\"").unwrap();
        assert_eq!(provider, Provider::OpenAi);
    }

    #[test]
    fn providers() {
        assert_eq!(ModelName::Gpt4oMini.provider(), Provider::OpenAi);
        assert_eq!(ModelName::LlamaGuard3_8b.provider(), Provider::Groq);
        assert_eq!(ModelName::BedrockHaiku.provider(), Provider::Aws);
    }

    #[test]
    fn unknown_model_is_rejected() {
        assert!("gpt-5-ultra".parse::<ModelName>().is_err());
    }
}
