//! Core utilities shared by the mistake notebook client crates
//!
//! - **Error handling**: errors with codes, context and recovery suggestions
//! - **Configuration**: TOML settings file with defaults for every section
//! - **Local state**: a small persisted key-value store (holds the auth token)
//!
//! # Example
//!
//! ```rust,no_run
//! use notebook_core::{config::Config, storage::LocalStore};
//!
//! let config = Config::load(None)?;
//! let store = LocalStore::open(config.schema.auth.state_path())?;
//!
//! if let Some(token) = store.get("token")? {
//!     println!("Signed in ({} chars)", token.len());
//! }
//! # Ok::<(), notebook_core::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod storage;

pub use error::{Error, ErrorCode, Result, ResultExt};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{ApiSettings, AuthSettings, Config, ConfigSchema};
    pub use crate::error::{exit_codes, Error, ErrorCode, Result, ResultExt};
    pub use crate::storage::LocalStore;
}
