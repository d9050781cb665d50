//! MCP server interface exposing Outline to LLM agents.
//!
//! Implements a Model Context Protocol server using rmcp. Document tools
//! (`search_documents`, `read_document`, `list_collections`), revision tools
//! backed by a shared [`outline_revisions::RevisionCache`], import tools and
//! user activity tools are served over stdio or streamable HTTP.
//!
//! # Examples
//!
//! ```no_run
//! use outline_core::OutlineConfig;
//!
//! # async fn example() -> Result<(), outline_core::OutlineError> {
//! let config = OutlineConfig::default();
//! outline_mcp::server::run_server(&config).await?;
//! # Ok(())
//! # }
//! ```

pub mod format;
pub mod server;
pub mod tools;
