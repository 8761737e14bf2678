//! Configuration for the notebook API client
//!
//! A single source for base URL, timeouts and mock policy. Resolution order is
//! environment variables, then the settings file, then the environment preset.

use crate::error::{ApiError, ApiResult};
use notebook_core::config::ApiSettings;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Development backend, also the fallback when nothing else is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

/// Environment types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development against a backend that may not be running
    #[default]
    Development,
    /// Staging environment
    Staging,
    /// Production environment
    Production,
}

impl Environment {
    /// Parse from a name, unknown names map to development
    pub fn parse(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "staging" | "stage" => Self::Staging,
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    /// Parse from the `NOTEBOOK_ENV` environment variable
    pub fn from_env() -> Option<Self> {
        env::var("NOTEBOOK_ENV").ok().map(|v| Self::parse(&v))
    }
}

/// Path shape used for "questions of a category"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionsPath {
    /// `/questions/by-category/{id}`
    #[default]
    ByCategory,
    /// `/categories/{id}/questions`
    Nested,
}

impl QuestionsPath {
    /// Build the relative path for a category id
    #[must_use]
    pub fn for_category(self, category_id: &str) -> String {
        match self {
            Self::ByCategory => format!("questions/by-category/{category_id}"),
            Self::Nested => format!("categories/{category_id}/questions"),
        }
    }
}

impl FromStr for QuestionsPath {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "by-category" => Ok(Self::ByCategory),
            "nested" => Ok(Self::Nested),
            other => Err(ApiError::config(format!(
                "questions_path must be \"by-category\" or \"nested\", got \"{other}\""
            ))),
        }
    }
}

impl fmt::Display for QuestionsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ByCategory => f.write_str("by-category"),
            Self::Nested => f.write_str("nested"),
        }
    }
}

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Backend base URL, e.g. `http://localhost:8080/api`
    pub base_url: String,
    /// Timeout for regular JSON calls
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
    /// Timeout for upload and recognition calls
    #[serde(with = "duration_secs")]
    pub upload_timeout: Duration,
    /// Serve mock data on read paths while the backend is unreachable
    pub mock_fallback: bool,
    /// Override for the artificial mock latency (per-generator default if unset)
    #[serde(default, with = "duration_millis_opt")]
    pub mock_latency: Option<Duration>,
    /// Path shape for questions of a category
    pub questions_path: QuestionsPath,
    /// Current environment
    pub environment: Environment,
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

mod duration_millis_opt {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(
        duration: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        duration
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        let millis = Option::<u64>::deserialize(deserializer)?;
        Ok(millis.map(Duration::from_millis))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::development()
    }
}

impl ClientConfig {
    /// Create configuration from environment variables
    ///
    /// Reads the following environment variables:
    /// - `NOTEBOOK_ENV`: Environment (development/staging/production)
    /// - `NOTEBOOK_API_BASE_URL`: Backend base URL
    /// - `NOTEBOOK_TIMEOUT_SECS`: Timeout for regular calls
    /// - `NOTEBOOK_UPLOAD_TIMEOUT_SECS`: Timeout for uploads
    /// - `NOTEBOOK_MOCK_FALLBACK`: `true`/`false`
    /// - `NOTEBOOK_MOCK_LATENCY_MS`: Mock latency override
    /// - `NOTEBOOK_QUESTIONS_PATH`: `by-category` or `nested`
    pub fn from_env() -> ApiResult<Self> {
        Self::resolve(&ApiSettings::default(), |key| env::var(key).ok())
    }

    /// Create configuration from the settings file, with environment overrides
    pub fn from_settings(settings: &ApiSettings) -> ApiResult<Self> {
        Self::resolve(settings, |key| env::var(key).ok())
    }

    /// Resolve configuration from settings and a variable lookup
    ///
    /// The lookup wins over the settings, which win over the preset.
    pub fn resolve(
        settings: &ApiSettings,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> ApiResult<Self> {
        let environment = lookup("NOTEBOOK_ENV")
            .or_else(|| settings.environment.clone())
            .map(|name| Environment::parse(&name))
            .unwrap_or_default();

        let mut config = Self::preset(environment);

        if let Some(url) = lookup("NOTEBOOK_API_BASE_URL").or_else(|| settings.base_url.clone()) {
            config.base_url = url;
        }

        config.timeout = match lookup("NOTEBOOK_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse_number("NOTEBOOK_TIMEOUT_SECS", &raw)?),
            None => Duration::from_secs(settings.timeout_secs),
        };

        config.upload_timeout = match lookup("NOTEBOOK_UPLOAD_TIMEOUT_SECS") {
            Some(raw) => {
                Duration::from_secs(parse_number("NOTEBOOK_UPLOAD_TIMEOUT_SECS", &raw)?)
            }
            None => Duration::from_secs(settings.upload_timeout_secs),
        };

        if let Some(raw) = lookup("NOTEBOOK_MOCK_FALLBACK") {
            config.mock_fallback = parse_bool("NOTEBOOK_MOCK_FALLBACK", &raw)?;
        } else if let Some(enabled) = settings.mock_fallback {
            config.mock_fallback = enabled;
        }

        if let Some(raw) = lookup("NOTEBOOK_MOCK_LATENCY_MS") {
            config.mock_latency = Some(Duration::from_millis(parse_number(
                "NOTEBOOK_MOCK_LATENCY_MS",
                &raw,
            )?));
        } else if let Some(ms) = settings.mock_latency_ms {
            config.mock_latency = Some(Duration::from_millis(ms));
        }

        config.questions_path = match lookup("NOTEBOOK_QUESTIONS_PATH") {
            Some(raw) => raw.parse()?,
            None => settings.questions_path.parse()?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Preset for an environment
    #[must_use]
    pub fn preset(environment: Environment) -> Self {
        match environment {
            Environment::Development => Self::development(),
            Environment::Staging => Self::staging(),
            Environment::Production => Self::production(),
        }
    }

    /// Create development configuration (mock fallback on)
    #[must_use]
    pub fn development() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
            upload_timeout: Duration::from_secs(300),
            mock_fallback: true,
            mock_latency: None,
            questions_path: QuestionsPath::default(),
            environment: Environment::Development,
        }
    }

    /// Create staging configuration
    #[must_use]
    pub fn staging() -> Self {
        Self {
            mock_fallback: false,
            environment: Environment::Staging,
            ..Self::development()
        }
    }

    /// Create production configuration (mock fallback off)
    #[must_use]
    pub fn production() -> Self {
        Self {
            mock_fallback: false,
            environment: Environment::Production,
            ..Self::development()
        }
    }

    /// Builder-style method to set base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Builder-style method to set timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builder-style method to set upload timeout
    #[must_use]
    pub fn with_upload_timeout(mut self, timeout: Duration) -> Self {
        self.upload_timeout = timeout;
        self
    }

    /// Builder-style method to toggle mock fallback
    #[must_use]
    pub fn with_mock_fallback(mut self, enabled: bool) -> Self {
        self.mock_fallback = enabled;
        self
    }

    /// Builder-style method to override mock latency
    #[must_use]
    pub fn with_mock_latency(mut self, latency: Duration) -> Self {
        self.mock_latency = Some(latency);
        self
    }

    /// Builder-style method to set the questions path shape
    #[must_use]
    pub fn with_questions_path(mut self, path: QuestionsPath) -> Self {
        self.questions_path = path;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> ApiResult<()> {
        if self.base_url.is_empty() {
            return Err(ApiError::config("base_url cannot be empty"));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ApiError::config("base_url must start with http:// or https://"));
        }

        if self.timeout.is_zero() || self.upload_timeout.is_zero() {
            return Err(ApiError::config("timeouts cannot be zero"));
        }

        Ok(())
    }
}

fn parse_number(var: &str, raw: &str) -> ApiResult<u64> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::config(format!("{var} must be a whole number, got \"{raw}\"")))
}

fn parse_bool(var: &str, raw: &str) -> ApiResult<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ApiError::config(format!("{var} must be true or false, got \"{raw}\""))),
    }
}
