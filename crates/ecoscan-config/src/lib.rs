//! Configuration for the EcoScan services.
//!
//! Every section has safe defaults, so a bare `EcoscanConfig::default()` is
//! enough for local development. A TOML file can override any field, and a
//! handful of environment variables are applied on top (secrets like the
//! LLM API key never belong in the file).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration load/parse error
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Top-level configuration for all EcoScan services
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EcoscanConfig {
    pub web: WebConfig,
    pub storage: StorageConfig,
    pub ocr: OcrConfig,
    pub llm: LlmConfig,
    pub auth: AuthConfig,
}

/// Web backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
    /// Frontend origin allowed by CORS (credentials are sent cross-origin)
    pub cors_origin: String,
    /// Directory uploaded product images are written to and served from
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    /// Number of background scan workers
    pub scan_workers: usize,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            cors_origin: "http://localhost:5173".to_string(),
            upload_dir: PathBuf::from("uploads"),
            max_upload_bytes: 10 * 1024 * 1024,
            scan_workers: 2,
        }
    }
}

/// SQLite settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Database path, or `:memory:` for an in-memory database
    pub path: PathBuf,
    pub wal_mode: bool,
    pub busy_timeout_ms: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("ecoscan.db"),
            wal_mode: true,
            busy_timeout_ms: 5000,
        }
    }
}

impl StorageConfig {
    /// In-memory database config for tests
    pub fn memory() -> Self {
        Self {
            path: PathBuf::from(":memory:"),
            wal_mode: false,
            ..Self::default()
        }
    }
}

/// OCR service settings, covering both the service itself and the client
/// the backend uses to reach it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Bind address for the standalone OCR service
    pub host: String,
    pub port: u16,
    /// URL the web backend posts images to
    pub service_url: String,
    /// Path to the tesseract binary
    pub tesseract_cmd: PathBuf,
    /// Tesseract language code
    pub language: String,
    pub timeout_secs: u64,
    /// Largest image the service accepts; kept in step with the web
    /// backend's upload limit so forwarded scans are never rejected here
    pub max_upload_bytes: usize,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            service_url: "http://localhost:8000/ocr".to_string(),
            tesseract_cmd: PathBuf::from("tesseract"),
            language: "eng".to_string(),
            timeout_secs: 10,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

/// LLM provider settings (Groq's OpenAI-compatible API)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    /// Low temperature keeps the structured analysis JSON consistent
    pub analysis_temperature: f64,
    pub analysis_max_tokens: u32,
    pub chat_temperature: f64,
    pub chat_max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            analysis_temperature: 0.3,
            analysis_max_tokens: 2000,
            chat_temperature: 0.7,
            chat_max_tokens: 300,
            timeout_secs: 30,
        }
    }
}

/// Session and password hashing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub session_lifetime_secs: i64,
    pub cookie_name: String,
    pub pbkdf2_iterations: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_lifetime_secs: 3600,
            cookie_name: "ecoscan_session".to_string(),
            pbkdf2_iterations: 260_000,
        }
    }
}

impl EcoscanConfig {
    /// Load configuration: defaults, then the TOML file (if given), then
    /// environment variable overrides
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Parse a TOML config file; missing sections keep their defaults
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Overlay settings from the environment
    fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("GROQ_API_KEY") {
            self.llm.api_key = key;
        }
        if let Ok(cmd) = std::env::var("TESSERACT_CMD") {
            self.ocr.tesseract_cmd = PathBuf::from(cmd);
        }
        if let Ok(path) = std::env::var("ECOSCAN_DB_PATH") {
            self.storage.path = PathBuf::from(path);
        }
        if let Ok(url) = std::env::var("ECOSCAN_OCR_URL") {
            self.ocr.service_url = url;
        }
        if let Ok(dir) = std::env::var("ECOSCAN_UPLOAD_DIR") {
            self.web.upload_dir = PathBuf::from(dir);
        }
        if let Ok(port) = std::env::var("ECOSCAN_PORT") {
            match port.parse() {
                Ok(port) => self.web.port = port,
                Err(_) => tracing::warn!(port, "Ignoring invalid ECOSCAN_PORT"),
            }
        }
    }
}
