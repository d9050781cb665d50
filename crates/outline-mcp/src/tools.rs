//! Tool implementations for the Outline MCP server.
//!
//! Every tool renders Markdown via [`crate::format`]. Upstream failures come
//! back as tool error results (`is_error = true`) so the agent sees the cause
//! instead of a protocol error.

use std::sync::Arc;

use outline_client::{ImportRequest, OutlineClient};
use outline_core::{AnalysisConfig, OutlineConfig, OutlineError, RevisionRecord};
use outline_revisions::{compare, summarize, RevisionCache};
use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::*,
    schemars, tool, tool_router, ErrorData as McpError,
};
use serde::Deserialize;

use crate::format;

const DEFAULT_SEARCH_LIMIT: u32 = 10;
const DEFAULT_COLLECTIONS_LIMIT: u32 = 20;
const DEFAULT_LIST_LIMIT: u32 = 25;

/// MCP server exposing Outline documents and revision analysis.
///
/// Cloning is cheap and clones share one [`RevisionCache`], so every
/// session of an HTTP transport sees the same cached revisions.
///
/// # Examples
///
/// ```
/// use outline_core::OutlineConfig;
/// use outline_mcp::tools::OutlineServer;
///
/// let mut config = OutlineConfig::default();
/// config.api.key = Some("ol_api_example".into());
/// let server = OutlineServer::new(&config).unwrap();
/// assert!(server.cache().is_empty());
/// ```
#[derive(Clone)]
pub struct OutlineServer {
    pub(crate) client: OutlineClient,
    pub(crate) cache: Arc<RevisionCache>,
    pub(crate) analysis: AnalysisConfig,
    pub(crate) tool_router: ToolRouter<Self>,
}

// --- Parameter structs ---

/// Parameters for the `search_documents` tool.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchDocumentsParams {
    /// Full-text search query.
    pub query: String,
    /// Restrict results to one collection.
    pub collection_id: Option<String>,
    /// Maximum results (default: 10).
    pub limit: Option<u32>,
}

/// Parameters for the `read_document` tool.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ReadDocumentParams {
    /// Document id or URL slug id.
    pub document_id: String,
}

/// Parameters for tools that only take a result limit.
#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct LimitParams {
    /// Maximum results to return.
    pub limit: Option<u32>,
}

/// Parameters for the single-revision tools.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RevisionParams {
    /// The revision id to retrieve.
    pub revision_id: String,
}

/// Parameters for the `list_document_revisions` tool.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListRevisionsParams {
    /// The document whose revisions to list.
    pub document_id: String,
    /// Maximum revisions to return (default: 25).
    pub limit: Option<u32>,
    /// Revisions to skip, for pagination (default: 0).
    pub offset: Option<u32>,
}

/// Parameters for the `compare_document_revisions` tool.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CompareRevisionsParams {
    /// The earlier revision.
    pub revision_id_1: String,
    /// The later revision.
    pub revision_id_2: String,
}

/// Parameters for the `get_revision_history_summary` tool.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct HistorySummaryParams {
    /// The document to analyze.
    pub document_id: String,
    /// Most recent revisions to include (default: 25).
    pub limit: Option<u32>,
}

/// Parameters for the `import_document` tool.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ImportDocumentParams {
    /// Title of the new document.
    pub title: String,
    /// Content to import.
    pub text: String,
    /// Target collection.
    pub collection_id: Option<String>,
    /// Parent document for nesting.
    pub parent_document_id: Option<String>,
    /// "markdown" (default), "html", or "text".
    pub format: Option<String>,
}

/// Parameters for the `import_document_from_file_content` tool.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ImportFileContentParams {
    /// Title of the new document.
    pub title: String,
    /// Raw file content.
    pub file_content: String,
    /// File extension: md, markdown, html, htm, txt, or text.
    pub file_extension: String,
    /// Target collection.
    pub collection_id: Option<String>,
}

fn success(text: String) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

fn failure(text: String) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::error(vec![Content::text(text)]))
}

fn upstream(action: &str, err: &OutlineError) -> Result<CallToolResult, McpError> {
    tracing::warn!(error = %err, "{action} failed");
    failure(format!("Error {action}: {err}"))
}

#[tool_router]
impl OutlineServer {
    /// Create a server from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`OutlineError::Config`] when no API key is configured.
    pub fn new(config: &OutlineConfig) -> Result<Self, OutlineError> {
        let client = OutlineClient::new(&config.api)?;
        let cache = Arc::new(RevisionCache::with_ttl(config.cache.ttl()));
        Ok(Self::with_parts(client, cache, config.analysis.clone()))
    }

    /// Create a server from an existing client and cache.
    pub fn with_parts(
        client: OutlineClient,
        cache: Arc<RevisionCache>,
        analysis: AnalysisConfig,
    ) -> Self {
        Self {
            client,
            cache,
            analysis,
            tool_router: Self::tool_router(),
        }
    }

    /// The shared revision cache.
    pub fn cache(&self) -> &RevisionCache {
        &self.cache
    }

    /// Cache-first revision lookup. The flag is `true` on a cache hit.
    async fn fetch_revision(
        &self,
        revision_id: &str,
    ) -> Result<Option<(RevisionRecord, bool)>, OutlineError> {
        self.cache.sweep();
        if let Some(rev) = self.cache.get(revision_id) {
            return Ok(Some((rev, true)));
        }

        tracing::debug!(revision_id, "revision cache miss");
        let fetched = self.client.get_document_revision(revision_id).await?;
        Ok(fetched.map(|rev| {
            self.cache.put(revision_id, rev.clone());
            (rev, false)
        }))
    }

    #[tool(
        name = "search_documents",
        description = "Search documents by keywords. Returns matching document titles, ids and context snippets. Optionally restrict the search to one collection."
    )]
    pub async fn search_documents(
        &self,
        Parameters(params): Parameters<SearchDocumentsParams>,
    ) -> Result<CallToolResult, McpError> {
        let limit = params.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
        match self
            .client
            .search_documents(&params.query, params.collection_id.as_deref(), limit)
            .await
        {
            Ok(hits) => success(format::search_results(&params.query, &hits)),
            Err(e) => upstream("searching documents", &e),
        }
    }

    #[tool(
        name = "read_document",
        description = "Get the full Markdown content of a document by id."
    )]
    pub async fn read_document(
        &self,
        Parameters(params): Parameters<ReadDocumentParams>,
    ) -> Result<CallToolResult, McpError> {
        match self.client.get_document(&params.document_id).await {
            Ok(Some(doc)) => success(format::document(&doc)),
            Ok(None) => success(format!("Document not found: {}", params.document_id)),
            Err(e) => upstream("reading document", &e),
        }
    }

    #[tool(
        name = "list_collections",
        description = "List the collections available to the configured API token."
    )]
    pub async fn list_collections(
        &self,
        Parameters(params): Parameters<LimitParams>,
    ) -> Result<CallToolResult, McpError> {
        let limit = params.limit.unwrap_or(DEFAULT_COLLECTIONS_LIMIT);
        match self.client.list_collections(limit).await {
            Ok(collections) => success(format::collections(&collections)),
            Err(e) => upstream("listing collections", &e),
        }
    }

    #[tool(
        name = "get_document_revision",
        description = "Get a specific document revision by id, including metadata and a content preview. Recently fetched revisions are served from a short-lived cache."
    )]
    pub async fn get_document_revision(
        &self,
        Parameters(params): Parameters<RevisionParams>,
    ) -> Result<CallToolResult, McpError> {
        match self.fetch_revision(&params.revision_id).await {
            Ok(Some((rev, cached))) => success(format::revision_info(&rev, cached)),
            Ok(None) => success(format::NO_REVISION.to_string()),
            Err(e) => upstream("retrieving revision", &e),
        }
    }

    #[tool(
        name = "get_document_revision_with_metadata",
        description = "Get a document revision with size statistics (characters, words, lines) in addition to its metadata and content preview."
    )]
    pub async fn get_document_revision_with_metadata(
        &self,
        Parameters(params): Parameters<RevisionParams>,
    ) -> Result<CallToolResult, McpError> {
        match self.fetch_revision(&params.revision_id).await {
            Ok(Some((rev, cached))) => success(format::revision_with_metadata(&rev, cached)),
            Ok(None) => success(format::NO_REVISION.to_string()),
            Err(e) => upstream("retrieving revision", &e),
        }
    }

    #[tool(
        name = "list_document_revisions",
        description = "List the revisions of a document, newest first, with pagination via limit and offset."
    )]
    pub async fn list_document_revisions(
        &self,
        Parameters(params): Parameters<ListRevisionsParams>,
    ) -> Result<CallToolResult, McpError> {
        let limit = params.limit.unwrap_or(DEFAULT_LIST_LIMIT);
        let offset = params.offset.unwrap_or(0);
        self.cache.sweep();
        match self
            .client
            .list_document_revisions(&params.document_id, limit, offset)
            .await
        {
            Ok(revisions) => success(format::revisions_list(&revisions, limit, offset)),
            Err(e) => upstream("retrieving revisions", &e),
        }
    }

    #[tool(
        name = "compare_document_revisions",
        description = "Compare two revisions: metadata side by side plus character, word and line count changes and a change magnitude. This compares sizes, not a line-level diff."
    )]
    pub async fn compare_document_revisions(
        &self,
        Parameters(params): Parameters<CompareRevisionsParams>,
    ) -> Result<CallToolResult, McpError> {
        let first = match self.fetch_revision(&params.revision_id_1).await {
            Ok(rev) => rev,
            Err(e) => return upstream("comparing revisions", &e),
        };
        let second = match self.fetch_revision(&params.revision_id_2).await {
            Ok(rev) => rev,
            Err(e) => return upstream("comparing revisions", &e),
        };

        let (Some((first, _)), Some((second, _))) = (first, second) else {
            return success(format::MISSING_FOR_COMPARISON.to_string());
        };
        let stats = compare(first.text(), second.text());
        success(format::revision_comparison(
            &first,
            &second,
            &stats,
            &self.analysis,
        ))
    }

    #[tool(
        name = "get_revision_history_summary",
        description = "Summarize a document's recent revision history: contributors, average time between revisions, activity level, and characters added and removed."
    )]
    pub async fn get_revision_history_summary(
        &self,
        Parameters(params): Parameters<HistorySummaryParams>,
    ) -> Result<CallToolResult, McpError> {
        let limit = params.limit.unwrap_or(DEFAULT_LIST_LIMIT);
        self.cache.sweep();
        let revisions = match self
            .client
            .list_document_revisions(&params.document_id, limit, 0)
            .await
        {
            Ok(revisions) => revisions,
            Err(e) => return upstream("analyzing revision history", &e),
        };

        match summarize(&revisions, &self.analysis) {
            Ok(summary) => success(format::history_summary(&params.document_id, &summary)),
            Err(insufficient) => success(format::insufficient_history(&insufficient)),
        }
    }

    #[tool(
        name = "import_document",
        description = "Create a new document by importing Markdown, HTML or plain text content, optionally into a collection or under a parent document."
    )]
    pub async fn import_document(
        &self,
        Parameters(params): Parameters<ImportDocumentParams>,
    ) -> Result<CallToolResult, McpError> {
        let format = params.format.as_deref().unwrap_or("markdown");
        let request = match ImportRequest::new(&params.title, &params.text, format) {
            Ok(request) => request
                .in_collection(params.collection_id)
                .under_parent(params.parent_document_id),
            Err(e) => return failure(e.to_string()),
        };
        self.run_import(&request).await
    }

    #[tool(
        name = "import_document_from_file_content",
        description = "Import file content as a new document, choosing the format from the file extension (md, markdown, html, htm, txt, text)."
    )]
    pub async fn import_document_from_file_content(
        &self,
        Parameters(params): Parameters<ImportFileContentParams>,
    ) -> Result<CallToolResult, McpError> {
        let request = match ImportRequest::from_file_content(
            &params.title,
            &params.file_content,
            &params.file_extension,
        ) {
            Ok(request) => request.in_collection(params.collection_id),
            Err(e) => return failure(e.to_string()),
        };
        self.run_import(&request).await
    }

    async fn run_import(&self, request: &ImportRequest) -> Result<CallToolResult, McpError> {
        match self.client.import_document(request).await {
            Ok(doc) => {
                tracing::info!(document_id = %doc.id, "imported document");
                success(format::import_success(&doc))
            }
            Err(e) => upstream("importing document", &e),
        }
    }

    #[tool(
        name = "list_draft_documents",
        description = "List the current user's draft documents."
    )]
    pub async fn list_draft_documents(
        &self,
        Parameters(params): Parameters<LimitParams>,
    ) -> Result<CallToolResult, McpError> {
        let limit = params.limit.unwrap_or(DEFAULT_LIST_LIMIT);
        match self.client.list_draft_documents(limit).await {
            Ok(docs) => success(format::documents_list(&docs, "Draft Documents")),
            Err(e) => upstream("retrieving draft documents", &e),
        }
    }

    #[tool(
        name = "get_recently_viewed_documents",
        description = "List documents the current user viewed recently."
    )]
    pub async fn get_recently_viewed_documents(
        &self,
        Parameters(params): Parameters<LimitParams>,
    ) -> Result<CallToolResult, McpError> {
        let limit = params.limit.unwrap_or(DEFAULT_LIST_LIMIT);
        match self.client.get_recently_viewed_documents(limit).await {
            Ok(docs) => success(format::documents_list(&docs, "Recently Viewed Documents")),
            Err(e) => upstream("retrieving recently viewed documents", &e),
        }
    }
}
