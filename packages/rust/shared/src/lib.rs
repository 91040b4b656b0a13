//! Shared types, error model, and configuration for herodex.
//!
//! This crate is the foundation depended on by all other herodex crates.
//! It provides:
//! - [`HerodexError`]: the unified error type
//! - Domain types ([`CharacterIdentity`], [`CharacterProfile`], [`Ability`], [`NewsItem`])
//! - Configuration ([`AppConfig`], [`ScrapeConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, NewsSourceConfig, PolicyConfig, PolicyFailureMode, ScheduleConfig, ScrapeConfig,
    ScrapeSection, SourceConfig, StorageConfig, config_dir, config_file_path, init_config,
    load_config, load_config_from,
};
pub use error::{HerodexError, Result};
pub use types::{
    Ability, CharacterIdentity, CharacterProfile, CharacterStats, FeedType, NewsItem, PassKind,
};
