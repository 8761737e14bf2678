//! API client for the mistake notebook backend
//!
//! The backend recognizes photographed test questions, groups them into
//! categories and renders practice papers. This crate is the client side:
//!
//! - **One configuration source**: base URL, timeouts and mock policy from
//!   environment variables, the settings file or presets
//! - **Interceptor pipeline**: bearer token injection from an explicit
//!   [`AuthContext`], request correlation ids, session invalidation on 401
//! - **Uniform envelopes**: every operation returns `{success, data, message}`
//!   no matter whether the backend or a mock generator produced the data
//! - **Mock fallback**: deterministic data on read paths while the backend is
//!   unreachable; writes never fabricate success
//!
//! # Example
//!
//! ```rust,no_run
//! use notebook_api_client::{AuthContext, ClientConfig, NotebookClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = NotebookClient::with_config(ClientConfig::development())?;
//!     let auth = AuthContext::with_token("secret-token");
//!
//!     let categories = client.categories(&auth).get_categories().await?;
//!     for category in categories.data.unwrap_or_default() {
//!         println!("{} {} ({})", category.icon, category.name, category.count);
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod client;
pub mod config;
pub mod endpoints;
pub mod envelope;
pub mod error;
pub mod middleware;
pub mod mock;
pub mod models;

pub use auth::{AuthContext, FileTokenStore, MemoryTokenStore, TokenStore};
pub use client::{NotebookClient, RawResponse, Transport};
pub use config::{ClientConfig, Environment, QuestionsPath};
pub use envelope::{Envelope, Failure};
pub use error::{ApiError, ApiResult, ErrorKind};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::auth::{AuthContext, FileTokenStore, MemoryTokenStore, TokenStore};
    pub use crate::client::NotebookClient;
    pub use crate::config::{ClientConfig, Environment, QuestionsPath};
    pub use crate::endpoints::{CategoriesApi, RecognitionApi, TestPaperApi};
    pub use crate::envelope::{Envelope, Failure};
    pub use crate::error::{ApiError, ApiResult, ErrorKind};
    pub use crate::models::*;
}
