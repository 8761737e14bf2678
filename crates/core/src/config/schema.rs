//! Settings schema definitions

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root settings schema
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigSchema {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub auth: AuthSettings,
}

/// Backend API settings
///
/// Unset optional values fall through to the client's environment presets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Deployment environment (development, staging, production)
    #[serde(default)]
    pub environment: Option<String>,

    /// Backend base URL, e.g. `http://localhost:8080/api`
    #[serde(default)]
    pub base_url: Option<String>,

    /// Timeout for regular JSON calls
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Timeout for upload and recognition calls
    #[serde(default = "default_upload_timeout_secs")]
    pub upload_timeout_secs: u64,

    /// Substitute mock data on read paths when the backend is unreachable
    #[serde(default)]
    pub mock_fallback: Option<bool>,

    /// Override for the artificial mock latency
    #[serde(default)]
    pub mock_latency_ms: Option<u64>,

    /// Path shape for questions of a category: "by-category" or "nested"
    #[serde(default = "default_questions_path")]
    pub questions_path: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            environment: None,
            base_url: None,
            timeout_secs: default_timeout_secs(),
            upload_timeout_secs: default_upload_timeout_secs(),
            mock_fallback: None,
            mock_latency_ms: None,
            questions_path: default_questions_path(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_upload_timeout_secs() -> u64 {
    300
}

fn default_questions_path() -> String {
    "by-category".to_string()
}

/// Authentication state settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthSettings {
    /// Where the persisted auth token lives
    #[serde(default)]
    pub state_file: Option<PathBuf>,
}

impl AuthSettings {
    /// Resolve the state file path, defaulting to the user config directory
    pub fn state_path(&self) -> PathBuf {
        self.state_file.clone().unwrap_or_else(default_state_path)
    }
}

fn default_state_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("mistake-notebook")
        .join("state.json")
}
