//! CLI command implementations

pub mod auth;
pub mod categories;
pub mod paper;
pub mod questions;
pub mod recognize;
