use crate::constants::{endpoints, models};
use serde::{Deserialize, Serialize};

/// Identifies an OpenAI-compatible chat-completions provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    DashScope,
    Ark,
    OpenAI,
    Custom(String),
}

impl ProviderId {
    pub fn name(&self) -> &str {
        match self {
            Self::DashScope => "DashScope (Qwen)",
            Self::Ark => "Volcengine Ark (Doubao)",
            Self::OpenAI => "OpenAI",
            Self::Custom(name) => name,
        }
    }

    pub fn default_base_url(&self) -> &str {
        match self {
            Self::DashScope => endpoints::DASHSCOPE_BASE_URL,
            Self::Ark => endpoints::ARK_BASE_URL,
            Self::OpenAI => endpoints::OPENAI_BASE_URL,
            Self::Custom(_) => "",
        }
    }

    pub fn default_api_key_env(&self) -> &str {
        match self {
            Self::DashScope => "DASHSCOPE_API_KEY",
            Self::Ark => "ARK_API_KEY",
            Self::OpenAI => "OPENAI_API_KEY",
            Self::Custom(_) => "",
        }
    }

    pub fn default_model(&self) -> &str {
        match self {
            Self::DashScope => models::DEFAULT_DASHSCOPE_MODEL,
            Self::Ark => models::DEFAULT_ARK_MODEL,
            Self::OpenAI => models::DEFAULT_OPENAI_MODEL,
            Self::Custom(_) => "",
        }
    }

    /// Parse a provider name as typed on the command line.
    pub fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "dashscope" | "qwen" => Self::DashScope,
            "ark" | "doubao" | "volcengine" => Self::Ark,
            "openai" => Self::OpenAI,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!(ProviderId::parse("Qwen"), ProviderId::DashScope);
        assert_eq!(ProviderId::parse("doubao"), ProviderId::Ark);
        assert_eq!(ProviderId::parse("openai"), ProviderId::OpenAI);
        assert_eq!(
            ProviderId::parse("local"),
            ProviderId::Custom("local".to_string())
        );
    }

    #[test]
    fn test_dashscope_defaults() {
        let id = ProviderId::DashScope;
        assert_eq!(id.default_model(), "qwen-turbo");
        assert_eq!(id.default_api_key_env(), "DASHSCOPE_API_KEY");
        assert!(id.default_base_url().starts_with("https://"));
    }
}
