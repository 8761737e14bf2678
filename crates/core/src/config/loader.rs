//! Settings file loading

use super::schema::ConfigSchema;
use crate::error::{Error, Result, ResultExt};
use std::path::Path;

/// Settings wrapper
#[derive(Debug, Clone)]
pub struct Config {
    pub schema: ConfigSchema,
    pub path: Option<String>,
}

impl Config {
    /// Load settings from a file path or use defaults
    ///
    /// An explicit path that does not exist is an error; when no path is given the
    /// standard locations are searched and defaults are used if none exists.
    pub fn load(path: Option<&str>) -> Result<Self> {
        if let Some(p) = path {
            if !Path::new(p).exists() {
                return Err(Error::config_not_found(p));
            }
        }

        let config_path = path.map(String::from).or_else(find_config_file);

        let schema = if let Some(p) = &config_path {
            load_config_file(p)?
        } else {
            ConfigSchema::default()
        };

        Ok(Self {
            schema,
            path: config_path,
        })
    }

    /// Load with defaults only (no file)
    pub fn defaults() -> Self {
        Self {
            schema: ConfigSchema::default(),
            path: None,
        }
    }
}

/// Find a settings file in standard locations
fn find_config_file() -> Option<String> {
    let candidates = [".notebook.toml", "notebook.toml", ".config/notebook.toml"];

    candidates
        .into_iter()
        .find(|candidate| Path::new(candidate).exists())
        .map(String::from)
}

/// Load and parse a TOML settings file
fn load_config_file(path: &str) -> Result<ConfigSchema> {
    let content = std::fs::read_to_string(path)
        .map_err(Error::from)
        .context(format!("Reading config file {path}"))?;

    let schema: ConfigSchema = toml::from_str(&content)
        .map_err(Error::from)
        .context(format!("Parsing config file {path}"))?;

    validate(&schema).context(format!("Checking config file {path}"))?;
    Ok(schema)
}

/// Reject values no client could work with
fn validate(schema: &ConfigSchema) -> Result<()> {
    let api = &schema.api;
    if api.timeout_secs == 0 {
        return Err(Error::invalid_value("api.timeout_secs", "must be greater than zero"));
    }
    if api.upload_timeout_secs == 0 {
        return Err(Error::invalid_value(
            "api.upload_timeout_secs",
            "must be greater than zero",
        ));
    }
    if !matches!(api.questions_path.trim(), "by-category" | "nested") {
        return Err(Error::invalid_value(
            "api.questions_path",
            format!("expected \"by-category\" or \"nested\", got \"{}\"", api.questions_path),
        )
        .with_suggestion("Use questions_path = \"by-category\" unless the backend nests questions under categories"));
    }
    Ok(())
}
