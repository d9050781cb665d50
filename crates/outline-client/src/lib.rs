//! HTTP client for the Outline knowledge-base API.
//!
//! Wraps the RPC-style endpoints (`documents.*`, `collections.*`,
//! `revisions.*`, `auth.info`) behind typed async methods. Lookups return
//! `Result<Option<T>>` so "not found" stays distinct from a failed request.

mod client;
pub mod import;

pub use client::OutlineClient;
pub use import::ImportRequest;
