//! Per-invocation state: settings, API client and session

use crate::output::OutputFormat;
use anyhow::{Context as _, Result};
use notebook_api_client::{AuthContext, ClientConfig, FileTokenStore, NotebookClient};
use notebook_core::config::Config;
use std::path::PathBuf;
use tracing::debug;

/// Environment variable overriding the state file location
pub const STATE_FILE_ENV: &str = "NOTEBOOK_STATE_FILE";

/// Everything a command needs
pub struct Context {
    pub client: NotebookClient,
    pub auth: AuthContext,
    pub format: OutputFormat,
    pub state_path: PathBuf,
}

impl Context {
    /// Load settings, resolve the client configuration and open the token store
    pub fn load(config_path: Option<&str>, format: OutputFormat) -> Result<Self> {
        let config = Config::load(config_path)?;
        if let Some(path) = &config.path {
            debug!(path = %path, "Loaded settings file");
        }

        let client_config = ClientConfig::from_settings(&config.schema.api)?;
        let state_path = std::env::var_os(STATE_FILE_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| config.schema.auth.state_path());

        let store = FileTokenStore::open(&state_path)
            .with_context(|| format!("cannot open state file {}", state_path.display()))?;
        let client = NotebookClient::with_config(client_config)?;

        Ok(Self {
            client,
            auth: AuthContext::new(store),
            format,
            state_path,
        })
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }
}
