use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::error::ConfigError;
use crate::core::model::{self, ModelId};

/// OpenAI-compatible gateway used unless the config file says otherwise
const DEFAULT_BASE_URL: &str = "https://open.api.gu28.top/v1";

const CONFIG_DIR_NAME: &str = "prompt-creator";
const LOCAL_CONFIG_FILE: &str = "prompt-creator.json";
const API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the chat-completion API, including the version segment
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub default_model: ModelId,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial backoff between attempts, doubled per retry
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,

    /// Directory for transcript exports; the working directory when unset
    #[serde(default)]
    pub export_dir: Option<PathBuf>,

    #[serde(default)]
    pub debug: bool,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}

fn default_model() -> ModelId {
    model::default_model().model_id()
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_secs() -> u64 {
    5
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            default_model: default_model(),
            max_retries: default_max_retries(),
            retry_delay_secs: default_retry_delay_secs(),
            export_dir: None,
            debug: false,
        }
    }
}

pub fn load_config(working_dir: Option<PathBuf>) -> Result<AppConfig, ConfigError> {
    let wd = working_dir.unwrap_or_else(|| std::env::current_dir().unwrap_or_default());

    let mut config = AppConfig::default();

    if let Some(config_dir) = dirs::config_dir() {
        let global_path = config_dir.join(CONFIG_DIR_NAME).join("config.json");
        if let Some(file_config) = read_config_file(&global_path)? {
            merge_config(&mut config, file_config);
        }
    }

    if let Some(file_config) = read_config_file(&wd.join(LOCAL_CONFIG_FILE))? {
        merge_config(&mut config, file_config);
    }

    detect_api_key(&mut config);

    Ok(config)
}

fn read_config_file(path: &Path) -> Result<Option<AppConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::File(format!("{}: {e}", path.display())))?;
    let file_config: AppConfig = serde_json::from_str(&content)
        .map_err(|e| ConfigError::Invalid(format!("{}: {e}", path.display())))?;
    Ok(Some(file_config))
}

fn merge_config(base: &mut AppConfig, overlay: AppConfig) {
    if overlay.api_key.is_some() {
        base.api_key = overlay.api_key;
    }
    if overlay.base_url != default_base_url() {
        base.base_url = overlay.base_url;
    }
    if overlay.default_model != default_model() {
        base.default_model = overlay.default_model;
    }
    if overlay.max_retries != default_max_retries() {
        base.max_retries = overlay.max_retries;
    }
    if overlay.retry_delay_secs != default_retry_delay_secs() {
        base.retry_delay_secs = overlay.retry_delay_secs;
    }
    if overlay.export_dir.is_some() {
        base.export_dir = overlay.export_dir;
    }
    if overlay.debug {
        base.debug = true;
    }
}

fn detect_api_key(config: &mut AppConfig) {
    if config.has_api_key() {
        return;
    }
    if let Ok(key) = std::env::var(API_KEY_ENV) {
        if !key.is_empty() {
            config.api_key = Some(key);
        }
    }
}

impl AppConfig {
    pub fn get_api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.is_empty())
    }

    pub fn has_api_key(&self) -> bool {
        self.get_api_key().is_some()
    }
}

/// Show only the edges of a credential.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else {
        "****".to_string()
    }
}
