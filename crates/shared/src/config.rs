use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::config_env::{
    non_blank, optional_trimmed_lookup, parse_u64_lookup, process_env, require_http_url,
};

pub const DEFAULT_CONFIG_PATH: &str = "config/config.json";
pub const DEFAULT_TASKS_PATH: &str = "todo.txt";
pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_PRESENTATIONS_DIR: &str = "presentations";
pub const DEFAULT_SCREENSHOT_DIR: &str = ".";
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 120_000;

/// Process-wide assistant configuration. Loaded once at startup and never
/// mutated afterwards.
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    pub mail: MailConfig,
    pub endpoints: ServiceEndpoints,
    pub chat_api_key: Option<String>,
    pub chat_provider: ChatProvider,
    pub tasks_path: PathBuf,
    pub output_dir: PathBuf,
    pub presentations_dir: PathBuf,
    pub screenshot_dir: PathBuf,
    pub http_timeout_ms: u64,
}

/// Which chat-completions service the API key belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChatProvider {
    #[default]
    OpenRouter,
    /// Google AI Studio key from the legacy `GEMINI_API` config entry.
    Gemini,
}

impl ChatProvider {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OpenRouter => "openrouter",
            Self::Gemini => "gemini",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MailConfig {
    pub app_password: Option<String>,
    pub sender: Option<String>,
    pub recipient: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ServiceEndpoints {
    pub image_detection_url: Option<String>,
    pub ocr_url: Option<String>,
    pub image_generation_url: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load .env file: {0}")]
    Dotenv(String),
    #[error("failed to read config file {path}: {message}")]
    ReadFile { path: String, message: String },
    #[error("invalid config file {path}: {message}")]
    ParseFile { path: String, message: String },
    #[error("invalid integer in env var {0}")]
    ParseInt(String),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// On-disk JSON configuration. Accepts the legacy key names as aliases.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default, alias = "gmailpass")]
    pub mail_app_password: Option<String>,
    #[serde(default)]
    pub mail_sender: Option<String>,
    #[serde(default)]
    pub mail_recipient: Option<String>,
    #[serde(default, alias = "Img_Detection_Colab")]
    pub image_detection_endpoint: Option<String>,
    #[serde(default, alias = "OCR_Colab")]
    pub ocr_endpoint: Option<String>,
    #[serde(default, alias = "Img_Gen_Colab")]
    pub image_generation_endpoint: Option<String>,
    #[serde(default)]
    pub conversational_api_key: Option<String>,
    #[serde(default, rename = "GEMINI_API", alias = "gemini_api_key")]
    pub gemini_api_key: Option<String>,
}

impl ConfigFile {
    pub fn parse(raw: &str, path: &Path) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(|err| ConfigError::ParseFile {
            path: path.display().to_string(),
            message: err.to_string(),
        })
    }

    /// Reads the file at `path`. A missing file yields an empty config.
    pub fn read_optional(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(raw) => Self::parse(&raw, path),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::ReadFile {
                path: path.display().to_string(),
                message: err.to_string(),
            }),
        }
    }
}

impl AssistantConfig {
    /// Loads `.env`, the JSON config file, then applies environment overrides.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        load_dotenv()?;

        let path = config_path
            .map(Path::to_path_buf)
            .or_else(|| {
                optional_trimmed_lookup(&process_env, "AVA_CONFIG_PATH").map(PathBuf::from)
            })
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
        let file = ConfigFile::read_optional(&path)?;

        Self::from_sources(file, process_env)
    }

    pub fn from_sources<F>(file: ConfigFile, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |key: &str, file_value: Option<String>| {
            optional_trimmed_lookup(&lookup, key)
                .or_else(|| file_value.as_deref().and_then(non_blank))
        };

        let endpoints = ServiceEndpoints {
            image_detection_url: require_http_url(
                "AVA_IMAGE_DETECTION_URL",
                pick("AVA_IMAGE_DETECTION_URL", file.image_detection_endpoint),
            )?,
            ocr_url: require_http_url("AVA_OCR_URL", pick("AVA_OCR_URL", file.ocr_endpoint))?,
            image_generation_url: require_http_url(
                "AVA_IMAGE_GENERATION_URL",
                pick("AVA_IMAGE_GENERATION_URL", file.image_generation_endpoint),
            )?,
        };

        let (chat_api_key, chat_provider) =
            match pick("AVA_CHAT_API_KEY", file.conversational_api_key) {
                Some(key) => (Some(key), ChatProvider::OpenRouter),
                None => match file.gemini_api_key.as_deref().and_then(non_blank) {
                    Some(key) => (Some(key), ChatProvider::Gemini),
                    None => (None, ChatProvider::OpenRouter),
                },
            };

        let path_or = |key: &str, default: &str| {
            optional_trimmed_lookup(&lookup, key)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(default))
        };

        Ok(Self {
            mail: MailConfig {
                app_password: pick("AVA_MAIL_APP_PASSWORD", file.mail_app_password),
                sender: pick("AVA_MAIL_SENDER", file.mail_sender),
                recipient: pick("AVA_MAIL_RECIPIENT", file.mail_recipient),
            },
            endpoints,
            chat_api_key,
            chat_provider,
            tasks_path: path_or("AVA_TASKS_PATH", DEFAULT_TASKS_PATH),
            output_dir: path_or("AVA_OUTPUT_DIR", DEFAULT_OUTPUT_DIR),
            presentations_dir: path_or("AVA_PRESENTATIONS_DIR", DEFAULT_PRESENTATIONS_DIR),
            screenshot_dir: path_or("AVA_SCREENSHOT_DIR", DEFAULT_SCREENSHOT_DIR),
            http_timeout_ms: parse_u64_lookup(
                &lookup,
                "AVA_HTTP_TIMEOUT_MS",
                DEFAULT_HTTP_TIMEOUT_MS,
            )?,
        })
    }
}

pub fn load_dotenv() -> Result<(), ConfigError> {
    match dotenvy::dotenv() {
        Ok(_) => Ok(()),
        Err(err) if err.not_found() => Ok(()),
        Err(err) => Err(ConfigError::Dotenv(err.to_string())),
    }
}
