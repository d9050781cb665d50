//! MCP server setup and lifecycle.
//!
//! Provides [`run_server`], which starts the configured transport with all
//! Outline tools registered and blocks until the client disconnects (stdio)
//! or the process receives ctrl-c (HTTP).

use std::net::SocketAddr;

use outline_core::{OutlineConfig, OutlineError, Transport};
use rmcp::{
    model::*,
    tool_handler,
    transport::{
        stdio,
        streamable_http_server::{
            session::local::LocalSessionManager, StreamableHttpServerConfig,
            StreamableHttpService,
        },
    },
    ServerHandler, ServiceExt,
};

use crate::tools::OutlineServer;

/// Path the HTTP transport serves MCP on.
pub const MCP_PATH: &str = "/mcp";

const SERVER_INSTRUCTIONS: &str = "\
Outline is a team knowledge base. Use these tools to work with its documents:\n\
- search_documents / read_document / list_collections: find and read content\n\
- list_document_revisions / get_document_revision / get_document_revision_with_metadata: inspect version history\n\
- compare_document_revisions: size changes between two revisions\n\
- get_revision_history_summary: contributors and activity across recent revisions\n\
- import_document / import_document_from_file_content: create documents from Markdown, HTML or text\n\
- list_draft_documents / get_recently_viewed_documents: the current user's drafts and recent documents";

#[tool_handler]
impl ServerHandler for OutlineServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "mcp-outline".to_string(),
                title: Some("Document Outline".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                description: Some(
                    "Search, read, import and inspect revisions of Outline documents".to_string(),
                ),
                icons: None,
                website_url: None,
            },
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
        }
    }
}

/// Start the MCP server on the transport named in `config.server`.
///
/// # Errors
///
/// Returns [`OutlineError::Config`] when the API key is missing, and
/// [`OutlineError::Io`] when the HTTP listener cannot bind.
///
/// # Examples
///
/// ```no_run
/// use outline_core::OutlineConfig;
///
/// # async fn example() -> Result<(), outline_core::OutlineError> {
/// let mut config = OutlineConfig::default();
/// config.apply_env();
/// outline_mcp::server::run_server(&config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn run_server(config: &OutlineConfig) -> Result<(), OutlineError> {
    let server = OutlineServer::new(config)?;
    tracing::info!(
        transport = %config.server.transport,
        api_url = %config.api.url,
        "starting MCP Outline server"
    );

    match config.server.transport {
        Transport::Stdio => run_stdio(server).await,
        Transport::Sse => {
            tracing::warn!("sse transport is served by the streamable HTTP endpoint");
            run_http(server, config.server.bind).await
        }
        Transport::StreamableHttp => run_http(server, config.server.bind).await,
    }
}

/// Serve over stdin/stdout until the client closes stdin.
///
/// # Errors
///
/// Returns [`OutlineError::Config`] if the MCP handshake or transport fails.
pub async fn run_stdio(server: OutlineServer) -> Result<(), OutlineError> {
    let service = server
        .serve(stdio())
        .await
        .map_err(|e| OutlineError::Config(format!("MCP server failed to start: {e}")))?;

    service
        .waiting()
        .await
        .map_err(|e| OutlineError::Config(format!("MCP server error: {e}")))?;

    Ok(())
}

/// Router serving the streamable HTTP transport at [`MCP_PATH`].
///
/// Each session gets a clone of `server`; clones share the revision cache.
pub fn http_router(server: OutlineServer) -> axum::Router {
    let service = StreamableHttpService::new(
        move || Ok(server.clone()),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig::default(),
    );
    axum::Router::new().nest_service(MCP_PATH, service)
}

/// Serve streamable HTTP on `bind` until ctrl-c.
///
/// # Errors
///
/// Returns [`OutlineError::Io`] if the listener cannot bind or the server
/// stops with an I/O error.
pub async fn run_http(server: OutlineServer, bind: SocketAddr) -> Result<(), OutlineError> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!(addr = %listener.local_addr()?, path = MCP_PATH, "listening for MCP over HTTP");

    axum::serve(listener, http_router(server))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
            }
            tracing::info!("shutting down HTTP transport");
        })
        .await?;

    Ok(())
}
