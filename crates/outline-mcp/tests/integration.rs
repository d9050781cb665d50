use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use outline_client::OutlineClient;
use outline_core::{AnalysisConfig, ApiConfig};
use outline_mcp::tools::{
    CompareRevisionsParams, HistorySummaryParams, ImportDocumentParams,
    ImportFileContentParams, LimitParams, ListRevisionsParams, OutlineServer, RevisionParams,
    SearchDocumentsParams,
};
use outline_revisions::RevisionCache;
use rmcp::{handler::server::wrapper::Parameters, model::*, ServerHandler};
use serde_json::{json, Value};

#[derive(Default)]
struct MockOutline {
    revision_fetches: AtomicUsize,
    imports: AtomicUsize,
}

fn revision(id: &str) -> Option<Value> {
    match id {
        "rev1" => Some(json!({
            "id": "rev1", "documentId": "doc1", "title": "Runbook",
            "text": "hello world", "createdAt": "2024-06-10T07:00:00Z",
            "createdBy": {"name": "Ada"}
        })),
        "rev2" => Some(json!({
            "id": "rev2", "documentId": "doc1", "title": "Runbook v2",
            "text": "hello world foo", "createdAt": "2024-06-10T09:00:00Z",
            "createdBy": {"name": "Grace"}
        })),
        "long" => Some(json!({"id": "long", "text": "x".repeat(800)})),
        _ => None,
    }
}

async fn revisions_info(State(mock): State<Arc<MockOutline>>, Json(body): Json<Value>) -> Response {
    mock.revision_fetches.fetch_add(1, Ordering::SeqCst);
    let id = body["id"].as_str().unwrap_or_default();
    match id {
        "explode" => return (StatusCode::BAD_GATEWAY, "upstream down").into_response(),
        "hollow" => return Json(json!({"data": {}})).into_response(),
        _ => {}
    }
    match revision(id) {
        Some(data) => Json(json!({ "data": data })).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({"message": "Not found"}))).into_response(),
    }
}

async fn revisions_list(Json(body): Json<Value>) -> Json<Value> {
    let data = match body["documentId"].as_str() {
        Some("doc1") => json!([
            {"id": "r3", "text": "xxxxxxxxxx", "createdAt": "2024-06-10T12:00:00Z", "createdBy": {"name": "Ada"}},
            {"id": "r2", "text": "xxxxx", "createdAt": "2024-06-10T10:00:00Z", "createdBy": {"name": "Ada"}},
            {"id": "r1", "text": "", "createdAt": "2024-06-10T07:00:00Z", "createdBy": {"name": "Grace"}}
        ]),
        Some("single") => json!([{"id": "only", "text": "x"}]),
        _ => json!([]),
    };
    Json(json!({ "data": data }))
}

async fn documents_search() -> Json<Value> {
    Json(json!({
        "data": [{"context": "how to <b>deploy</b>", "document": {"id": "d1", "title": "Deploys"}}]
    }))
}

async fn documents_drafts() -> Json<Value> {
    Json(json!({
        "data": [
            {"id": "doc1", "title": "Draft Document 1", "updatedAt": "2023-12-01T10:00:00Z"},
            {"id": "doc2", "title": "Draft Document 2"}
        ]
    }))
}

async fn documents_viewed() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"message": "API Error"}))).into_response()
}

async fn documents_import(State(mock): State<Arc<MockOutline>>) -> Json<Value> {
    mock.imports.fetch_add(1, Ordering::SeqCst);
    Json(json!({"data": {"id": "new1", "title": "Imported", "collectionId": "col1"}}))
}

async fn spawn_mock() -> (String, Arc<MockOutline>) {
    let mock = Arc::new(MockOutline::default());
    let app = Router::new()
        .route("/api/revisions.info", post(revisions_info))
        .route("/api/revisions.list", post(revisions_list))
        .route("/api/documents.search", post(documents_search))
        .route("/api/documents.drafts", post(documents_drafts))
        .route("/api/documents.viewed", post(documents_viewed))
        .route("/api/documents.import", post(documents_import))
        .with_state(mock.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/api"), mock)
}

fn server_for(url: &str, cache: RevisionCache) -> OutlineServer {
    let client = OutlineClient::new(&ApiConfig {
        key: Some("test-key".into()),
        url: url.into(),
        timeout_secs: 5,
    })
    .unwrap();
    OutlineServer::with_parts(client, Arc::new(cache), AnalysisConfig::default())
}

async fn test_server() -> (OutlineServer, Arc<MockOutline>) {
    let (url, mock) = spawn_mock().await;
    (server_for(&url, RevisionCache::new()), mock)
}

fn extract_text(result: &CallToolResult) -> &str {
    match &result.content[0].raw {
        RawContent::Text(t) => &t.text,
        _ => panic!("expected text content"),
    }
}

fn is_error(result: &CallToolResult) -> bool {
    result.is_error == Some(true)
}

fn revision_params(id: &str) -> Parameters<RevisionParams> {
    Parameters(RevisionParams {
        revision_id: id.into(),
    })
}

#[tokio::test]
async fn server_info_is_correct() {
    let (server, _) = test_server().await;
    let info = server.get_info();

    assert_eq!(info.server_info.name, "mcp-outline");
    assert_eq!(info.server_info.version, env!("CARGO_PKG_VERSION"));
    let instructions = info.instructions.unwrap();
    for tool in [
        "search_documents",
        "get_document_revision",
        "compare_document_revisions",
        "get_revision_history_summary",
        "import_document",
        "list_draft_documents",
    ] {
        assert!(instructions.contains(tool), "instructions should mention {tool}");
    }
}

#[tokio::test]
async fn second_revision_lookup_is_served_from_cache() {
    let (server, mock) = test_server().await;

    let first = server.get_document_revision(revision_params("rev1")).await.unwrap();
    let text = extract_text(&first);
    assert!(text.contains("# Document Revision"));
    assert!(text.contains("**Author:** Ada"));
    assert!(!text.contains("*[Retrieved from cache]*"));

    let second = server.get_document_revision(revision_params("rev1")).await.unwrap();
    assert!(extract_text(&second).contains("*[Retrieved from cache]*"));
    assert_eq!(mock.revision_fetches.load(Ordering::SeqCst), 1);
    assert_eq!(server.cache().len(), 1);
}

#[tokio::test]
async fn expired_cache_entry_is_refetched() {
    let (url, mock) = spawn_mock().await;
    let server = server_for(&url, RevisionCache::with_ttl(Duration::ZERO));

    server.get_document_revision(revision_params("rev1")).await.unwrap();
    let again = server.get_document_revision(revision_params("rev1")).await.unwrap();

    assert!(!extract_text(&again).contains("*[Retrieved from cache]*"));
    assert_eq!(mock.revision_fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn missing_revision_is_reported_not_cached() {
    let (server, _) = test_server().await;
    let result = server.get_document_revision(revision_params("ghost")).await.unwrap();

    assert!(!is_error(&result));
    assert_eq!(extract_text(&result), "No revision information found.");
    assert!(server.cache().is_empty());
}

#[tokio::test]
async fn empty_revision_payload_is_treated_as_missing() {
    let (server, _) = test_server().await;
    let result = server
        .get_document_revision(revision_params("hollow"))
        .await
        .unwrap();

    assert!(!is_error(&result));
    assert_eq!(extract_text(&result), "No revision information found.");
    assert!(server.cache().is_empty());

    let result = server
        .compare_document_revisions(Parameters(CompareRevisionsParams {
            revision_id_1: "hollow".into(),
            revision_id_2: "rev1".into(),
        }))
        .await
        .unwrap();
    assert_eq!(
        extract_text(&result),
        "One or both revisions could not be found."
    );
    assert!(server.cache().get("hollow").is_none());
    assert_eq!(server.cache().len(), 1);
}

#[tokio::test]
async fn upstream_failure_is_tool_error() {
    let (server, _) = test_server().await;
    let result = server
        .get_document_revision(revision_params("explode"))
        .await
        .unwrap();

    assert!(is_error(&result));
    let text = extract_text(&result);
    assert!(text.starts_with("Error retrieving revision:"));
    assert!(text.contains("upstream down"));
}

#[tokio::test]
async fn long_content_is_truncated() {
    let (server, _) = test_server().await;
    let result = server.get_document_revision(revision_params("long")).await.unwrap();
    let text = extract_text(&result);
    assert!(text.contains(&format!("{}...", "x".repeat(500))));
    assert!(!text.contains(&"x".repeat(501)));
}

#[tokio::test]
async fn revision_with_metadata_reports_statistics() {
    let (server, _) = test_server().await;
    let result = server
        .get_document_revision_with_metadata(revision_params("rev2"))
        .await
        .unwrap();
    let text = extract_text(&result);
    assert!(text.contains("Revision Statistics"));
    assert!(text.contains("**Content Length:** 15 characters"));
    assert!(text.contains("**Word Count:** 3 words"));
}

#[tokio::test]
async fn compare_uses_cache_and_reports_changes() {
    let (server, mock) = test_server().await;
    server.get_document_revision(revision_params("rev1")).await.unwrap();

    let result = server
        .compare_document_revisions(Parameters(CompareRevisionsParams {
            revision_id_1: "rev1".into(),
            revision_id_2: "rev2".into(),
        }))
        .await
        .unwrap();
    let text = extract_text(&result);

    assert!(text.contains("# Detailed Revision Comparison"));
    assert!(text.contains("Revision 1 (rev1)"));
    assert!(text.contains("Content Analysis"));
    assert!(text.contains("Changes Summary"));
    assert!(text.contains("**Characters:** +4"));
    assert!(text.contains("**Words:** +1"));
    assert!(text.contains("**Title changed:** 'Runbook' → 'Runbook v2'"));
    assert_eq!(mock.revision_fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn compare_with_missing_revision() {
    let (server, _) = test_server().await;
    let result = server
        .compare_document_revisions(Parameters(CompareRevisionsParams {
            revision_id_1: "rev1".into(),
            revision_id_2: "ghost".into(),
        }))
        .await
        .unwrap();
    assert_eq!(
        extract_text(&result),
        "One or both revisions could not be found."
    );
}

#[tokio::test]
async fn list_revisions_with_pagination_footer() {
    let (server, _) = test_server().await;
    let result = server
        .list_document_revisions(Parameters(ListRevisionsParams {
            document_id: "doc1".into(),
            limit: None,
            offset: None,
        }))
        .await
        .unwrap();
    let text = extract_text(&result);
    assert!(text.contains("# Document Revisions (3 found)"));
    assert!(text.contains("Showing 3 revisions"));

    let empty = server
        .list_document_revisions(Parameters(ListRevisionsParams {
            document_id: "nothing".into(),
            limit: Some(5),
            offset: Some(5),
        }))
        .await
        .unwrap();
    assert_eq!(extract_text(&empty), "No revisions found for this document.");
}

#[tokio::test]
async fn history_summary_end_to_end() {
    let (server, _) = test_server().await;
    let result = server
        .get_revision_history_summary(Parameters(HistorySummaryParams {
            document_id: "doc1".into(),
            limit: None,
        }))
        .await
        .unwrap();
    let text = extract_text(&result);

    assert!(text.contains("# Revision History Summary"));
    assert!(text.contains("**Analyzed Revisions:** 3"));
    assert!(text.contains("**Contributors:** 2 unique author(s)"));
    assert!(text.contains("## Activity Summary"));
    assert!(text.contains("**Average Time Between Revisions:** 2.5 hours"));
    assert!(text.contains("**Activity Level:** active"));
    assert!(text.contains("## Change Analysis"));
    assert!(text.contains("**Characters Added:** 10"));
    assert!(text.contains("**Characters Removed:** 0"));
    assert!(text.contains("**Net Change:** +10 characters"));
}

#[tokio::test]
async fn history_summary_needs_two_revisions() {
    let (server, _) = test_server().await;
    let result = server
        .get_revision_history_summary(Parameters(HistorySummaryParams {
            document_id: "single".into(),
            limit: Some(10),
        }))
        .await
        .unwrap();
    assert!(!is_error(&result));
    assert!(extract_text(&result).contains("Insufficient revision history"));
}

#[tokio::test]
async fn import_validation_never_calls_api() {
    let (server, mock) = test_server().await;

    let cases = [
        ("", "Content", None, "Error: Document title is required"),
        ("Title", "", None, "Error: Document content is required"),
        ("Title", "Content", Some("pdf"), "Error: Unsupported format 'pdf'"),
    ];
    for (title, text, format, expected) in cases {
        let result = server
            .import_document(Parameters(ImportDocumentParams {
                title: title.into(),
                text: text.into(),
                collection_id: None,
                parent_document_id: None,
                format: format.map(Into::into),
            }))
            .await
            .unwrap();
        assert!(is_error(&result));
        assert!(extract_text(&result).contains(expected), "{expected}");
    }
    assert_eq!(mock.imports.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn import_success() {
    let (server, mock) = test_server().await;
    let result = server
        .import_document(Parameters(ImportDocumentParams {
            title: "Imported".into(),
            text: "# Imported Content\n\nThis is imported content.".into(),
            collection_id: Some("col1".into()),
            parent_document_id: None,
            format: None,
        }))
        .await
        .unwrap();
    let text = extract_text(&result);
    assert!(text.contains("# Document Import Successful"));
    assert!(text.contains("new1"));
    assert_eq!(mock.imports.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn import_from_file_content_maps_extension() {
    let (server, mock) = test_server().await;

    let ok = server
        .import_document_from_file_content(Parameters(ImportFileContentParams {
            title: "Page".into(),
            file_content: "<h1>Hi</h1>".into(),
            file_extension: "htm".into(),
            collection_id: None,
        }))
        .await
        .unwrap();
    assert!(extract_text(&ok).contains("# Document Import Successful"));

    let rejected = server
        .import_document_from_file_content(Parameters(ImportFileContentParams {
            title: "Sheet".into(),
            file_content: "a,b".into(),
            file_extension: "csv".into(),
            collection_id: None,
        }))
        .await
        .unwrap();
    assert!(is_error(&rejected));
    assert!(extract_text(&rejected).contains("Unsupported file extension 'csv'"));
    assert_eq!(mock.imports.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn drafts_and_recently_viewed() {
    let (server, _) = test_server().await;

    let drafts = server
        .list_draft_documents(Parameters(LimitParams::default()))
        .await
        .unwrap();
    let text = extract_text(&drafts);
    assert!(text.contains("# Draft Documents (2 found)"));
    assert!(text.contains("1. Draft Document 1"));
    assert!(text.contains("2023-12-01T10:00:00Z"));

    let viewed = server
        .get_recently_viewed_documents(Parameters(LimitParams { limit: Some(5) }))
        .await
        .unwrap();
    assert!(is_error(&viewed));
    assert!(extract_text(&viewed).contains("Error retrieving recently viewed documents"));
    assert!(extract_text(&viewed).contains("API Error"));
}

#[tokio::test]
async fn search_renders_hits() {
    let (server, _) = test_server().await;
    let result = server
        .search_documents(Parameters(SearchDocumentsParams {
            query: "deploy".into(),
            collection_id: None,
            limit: None,
        }))
        .await
        .unwrap();
    let text = extract_text(&result);
    assert!(text.contains("# Search Results (1 found)"));
    assert!(text.contains("Deploys"));
    assert!(text.contains("how to <b>deploy</b>"));
}
