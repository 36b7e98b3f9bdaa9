//! Shared types, error model, and configuration for Footprint.
//!
//! This crate is the foundation depended on by all other Footprint crates.
//! It provides:
//! - [`FootprintError`]: the unified error type
//! - Output document types ([`OutputDocument`], [`Provenance`], [`SourceType`])
//! - Configuration ([`AppConfig`], [`GitHubConfig`], [`LeetCodeConfig`], config loading)

pub mod config;
pub mod de;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, GitHubConfig, GitHubSection, LeetCodeConfig, LeetCodeSection, OutputSection,
    config_dir, config_file_path, init_config, load_config, load_config_from, validate_config,
};
pub use error::{FootprintError, Result};
pub use types::{OutputDocument, Provenance, SourceType};
