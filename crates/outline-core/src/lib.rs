//! Core types, configuration, and error handling for mcp-outline.
//!
//! This crate provides the shared foundation used by all other crates:
//! - [`OutlineError`]: unified error type using `thiserror`
//! - [`OutlineConfig`]: configuration loaded from `.mcp-outline.toml`
//! - Shared records: [`RevisionRecord`], [`Document`], [`SearchHit`],
//!   [`Collection`], [`AuthInfo`], [`ImportFormat`]

mod config;
mod error;
mod types;

pub use config::{
    AnalysisConfig, ApiConfig, CacheConfig, OutlineConfig, ServerConfig, Transport,
    DEFAULT_ACTIVE_GAP_HOURS, DEFAULT_API_URL, DEFAULT_BIND, DEFAULT_CACHE_TTL_SECS,
    DEFAULT_MINOR_CHANGE_PERCENT, DEFAULT_MODERATE_CHANGE_PERCENT, DEFAULT_RAPID_GAP_HOURS,
    DEFAULT_TIMEOUT_SECS,
};
pub use error::OutlineError;
pub use types::{
    AuthInfo, Author, Collection, CollectionRef, Document, ImportFormat, RevisionRecord,
    SearchHit, UNKNOWN, UNTITLED,
};

/// A convenience `Result` type for mcp-outline operations.
pub type Result<T> = std::result::Result<T, OutlineError>;
