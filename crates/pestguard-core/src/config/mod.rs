use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::assistant::SessionOptions;
use crate::auth::{CredentialStore, DefaultAccount};
use crate::constants::{accounts, assistant, models, paths};
use crate::error::PestGuardError;
use crate::llm::{LlmClient, OpenAICompatClient, ProviderId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub llm: LlmSettings,
    pub auth: AuthSettings,
    pub assistant: AssistantSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    pub provider: LlmProvider,
    pub model: String,
    pub api_key_env: String,
    pub base_url: Option<String>,
    pub temperature: f32,
    pub timeout_secs: u64,
}

/// Provider preset as written in the settings file.
/// `custom` needs an explicit `base_url` and `api_key_env`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    DashScope,
    Ark,
    OpenAI,
    Custom,
}

impl LlmProvider {
    pub fn to_provider_id(&self) -> ProviderId {
        match self {
            LlmProvider::DashScope => ProviderId::DashScope,
            LlmProvider::Ark => ProviderId::Ark,
            LlmProvider::OpenAI => ProviderId::OpenAI,
            LlmProvider::Custom => ProviderId::Custom("custom".to_string()),
        }
    }

    /// Parse a provider name as typed on the command line.
    pub fn parse(name: &str) -> Option<Self> {
        match ProviderId::parse(name) {
            ProviderId::DashScope => Some(LlmProvider::DashScope),
            ProviderId::Ark => Some(LlmProvider::Ark),
            ProviderId::OpenAI => Some(LlmProvider::OpenAI),
            ProviderId::Custom(name) if name == "custom" => Some(LlmProvider::Custom),
            ProviderId::Custom(_) => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    pub users_path: PathBuf,
    /// Leave either field empty to disable default-account provisioning.
    pub default_username: String,
    pub default_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantSettings {
    pub max_history: usize,
    pub trigger_terms: Vec<String>,
    pub system_prompt: String,
    pub advisor_prompt: String,
    pub records_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        let data_dir = Self::data_dir();
        Self {
            llm: LlmSettings {
                provider: LlmProvider::DashScope,
                model: models::DEFAULT_DASHSCOPE_MODEL.to_string(),
                api_key_env: ProviderId::DashScope.default_api_key_env().to_string(),
                base_url: None,
                temperature: models::DEFAULT_TEMPERATURE,
                timeout_secs: assistant::DEFAULT_TIMEOUT_SECS,
            },
            auth: AuthSettings {
                users_path: data_dir.join(accounts::USERS_FILE),
                default_username: accounts::DEFAULT_USERNAME.to_string(),
                default_password: accounts::DEFAULT_PASSWORD.to_string(),
            },
            assistant: AssistantSettings {
                max_history: assistant::MAX_HISTORY,
                trigger_terms: assistant::TRIGGER_TERMS
                    .iter()
                    .map(|t| t.to_string())
                    .collect(),
                system_prompt: assistant::SYSTEM_PROMPT.to_string(),
                advisor_prompt: assistant::ADVISOR_PROMPT.to_string(),
                records_dir: data_dir.join(paths::RECORDS_DIR),
            },
        }
    }
}

impl Settings {
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(paths::CONFIG_DIR)
            .join(paths::CONFIG_FILE)
    }

    fn data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(paths::CONFIG_DIR)
    }

    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load settings from `path`, falling back to defaults when the file is
    /// missing or does not parse.
    pub fn load_from(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => tracing::warn!(path = %path.display(), "invalid config, using defaults: {e}"),
                },
                Err(e) => tracing::warn!(path = %path.display(), "unreadable config, using defaults: {e}"),
            }
        }
        Self::default()
    }

    pub fn save(&self) -> Result<(), PestGuardError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), PestGuardError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| PestGuardError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the API key from the environment variable specified in settings.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.llm.api_key_env)
            .ok()
            .filter(|k| !k.is_empty())
    }

    pub fn base_url(&self) -> String {
        self.llm
            .base_url
            .clone()
            .unwrap_or_else(|| self.llm.provider.to_provider_id().default_base_url().to_string())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.llm.timeout_secs)
    }

    /// Build the completion client from the current settings.
    pub fn build_llm_client(&self) -> Result<Arc<dyn LlmClient>, PestGuardError> {
        let api_key = self.api_key().ok_or_else(|| {
            PestGuardError::Config(format!(
                "No API key for {}: set the {} environment variable",
                self.llm.provider.to_provider_id(),
                self.llm.api_key_env
            ))
        })?;
        let base_url = self.base_url();
        if base_url.is_empty() {
            return Err(PestGuardError::Config(format!(
                "Provider {} needs an explicit base_url",
                self.llm.provider.to_provider_id()
            )));
        }
        let client = OpenAICompatClient::new(api_key, base_url).with_timeout(self.timeout())?;
        Ok(Arc::new(client))
    }

    pub fn default_account(&self) -> Option<DefaultAccount> {
        DefaultAccount::new(&self.auth.default_username, &self.auth.default_password)
    }

    pub fn credential_store(&self) -> CredentialStore {
        CredentialStore::new(&self.auth.users_path).with_default_account(self.default_account())
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            model: self.llm.model.clone(),
            temperature: self.llm.temperature,
            timeout: self.timeout(),
            max_history: self.assistant.max_history,
            system_prompt: self.assistant.system_prompt.clone(),
            advisor_prompt: self.assistant.advisor_prompt.clone(),
            trigger_terms: self.assistant.trigger_terms.clone(),
        }
    }
}
