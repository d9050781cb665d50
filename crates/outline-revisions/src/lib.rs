//! Revision caching and analysis for mcp-outline.
//!
//! - [`cache::RevisionCache`]: time-expiring store of fetched revisions
//! - [`compare`]: size-delta statistics between two revision bodies
//! - [`history`]: activity summary across a revision listing
//!
//! Nothing here performs I/O or formats output.

pub mod cache;
pub mod compare;
pub mod history;

pub use cache::RevisionCache;
pub use compare::{compare, ChangeMagnitude, ChangeStatistics};
pub use history::{summarize, Cadence, HistorySummary, InsufficientHistory};
