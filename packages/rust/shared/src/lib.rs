//! Shared types, error model, and configuration for guidebook.
//!
//! This crate is the foundation depended on by all other guidebook crates.
//! It provides:
//! - [`GuidebookError`] — the unified error type
//! - Domain types ([`GuidePage`], [`ContentBlock`], [`RunMetadata`])
//! - Configuration ([`AppConfig`], [`RunConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, FetchConfig, RunConfig, SelectorConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from,
};
pub use error::{GuidebookError, Result};
pub use types::{ContentBlock, FailedPage, GuidePage, RunMetadata};
