//! Typed async client for the Outline RPC API.
//!
//! Every endpoint answers with a `{"data": ...}` envelope that the client
//! unwraps. Lookups by id treat a 404 or an empty record as absent instead
//! of failing.

use std::time::Duration;

use outline_core::{
    ApiConfig, AuthInfo, Collection, Document, OutlineError, Result, RevisionRecord, SearchHit,
};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::import::ImportRequest;

/// Response envelope shared by every Outline RPC endpoint.
#[derive(Deserialize)]
struct Envelope<T> {
    data: Option<T>,
}

/// Client for the Outline RPC-style API.
///
/// Every endpoint is a `POST {base_url}/{method}` with a JSON body and a
/// bearer token. The wrapped `reqwest::Client` is reference counted, so
/// cloning is cheap.
///
/// # Examples
///
/// ```
/// use outline_core::ApiConfig;
/// use outline_client::OutlineClient;
///
/// let config = ApiConfig {
///     key: Some("ol_api_test".into()),
///     ..ApiConfig::default()
/// };
/// let client = OutlineClient::new(&config).unwrap();
/// assert_eq!(client.base_url(), "https://app.getoutline.com/api");
/// ```
#[derive(Clone)]
pub struct OutlineClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl std::fmt::Debug for OutlineClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutlineClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl OutlineClient {
    /// Create a client from an [`ApiConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`OutlineError::Config`] if no API key is configured or the
    /// HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let api_key = config
            .key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                OutlineError::Config("Missing API key. Set OUTLINE_API_KEY env var.".into())
            })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| OutlineError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url: config.url.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Verify the token and return the user and team it belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`OutlineError::Api`] for a rejected token and
    /// [`OutlineError::Request`] when the server is unreachable.
    pub async fn auth_info(&self) -> Result<AuthInfo> {
        let data = self.call("auth.info", json!({})).await?;
        Ok(data.unwrap_or_default())
    }

    /// Full-text search across documents.
    ///
    /// # Errors
    ///
    /// Returns [`OutlineError`] on HTTP or decoding failures.
    pub async fn search_documents(
        &self,
        query: &str,
        collection_id: Option<&str>,
        limit: u32,
    ) -> Result<Vec<SearchHit>> {
        let mut body = json!({ "query": query, "limit": limit });
        if let Some(id) = collection_id.filter(|id| !id.is_empty()) {
            body["collectionId"] = json!(id);
        }
        Ok(self.call("documents.search", body).await?.unwrap_or_default())
    }

    /// Fetch a document by id. `Ok(None)` means the document does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`OutlineError`] on HTTP or decoding failures.
    pub async fn get_document(&self, document_id: &str) -> Result<Option<Document>> {
        let document: Option<Document> = self
            .call_optional("documents.info", json!({ "id": document_id }))
            .await?;
        Ok(document.filter(|doc| !doc.id.is_empty()))
    }

    /// List collections visible to the token.
    ///
    /// # Errors
    ///
    /// Returns [`OutlineError`] on HTTP or decoding failures.
    pub async fn list_collections(&self, limit: u32) -> Result<Vec<Collection>> {
        Ok(self
            .call("collections.list", json!({ "limit": limit }))
            .await?
            .unwrap_or_default())
    }

    /// Fetch a single revision. `Ok(None)` means the revision does not exist,
    /// either as a 404 or as a `data` object without an id.
    ///
    /// # Errors
    ///
    /// Returns [`OutlineError`] on HTTP or decoding failures.
    pub async fn get_document_revision(
        &self,
        revision_id: &str,
    ) -> Result<Option<RevisionRecord>> {
        let revision: Option<RevisionRecord> = self
            .call_optional("revisions.info", json!({ "id": revision_id }))
            .await?;
        Ok(revision.filter(|rev| !rev.id.is_empty()))
    }

    /// List revisions of a document, newest first.
    ///
    /// `offset` is only sent when non-zero.
    ///
    /// # Errors
    ///
    /// Returns [`OutlineError`] on HTTP or decoding failures.
    pub async fn list_document_revisions(
        &self,
        document_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<RevisionRecord>> {
        let mut body = json!({ "documentId": document_id, "limit": limit });
        if offset > 0 {
            body["offset"] = json!(offset);
        }
        Ok(self.call("revisions.list", body).await?.unwrap_or_default())
    }

    /// Drafts owned by the token's user.
    ///
    /// # Errors
    ///
    /// Returns [`OutlineError`] on HTTP or decoding failures.
    pub async fn list_draft_documents(&self, limit: u32) -> Result<Vec<Document>> {
        Ok(self
            .call("documents.drafts", json!({ "limit": limit }))
            .await?
            .unwrap_or_default())
    }

    /// Documents the token's user viewed most recently.
    ///
    /// # Errors
    ///
    /// Returns [`OutlineError`] on HTTP or decoding failures.
    pub async fn get_recently_viewed_documents(
        &self,
        limit: u32,
    ) -> Result<Vec<Document>> {
        Ok(self
            .call("documents.viewed", json!({ "limit": limit }))
            .await?
            .unwrap_or_default())
    }

    /// Upload content through `documents.import` and return the new document.
    ///
    /// # Errors
    ///
    /// Returns [`OutlineError::Api`] when Outline rejects the upload or
    /// answers without a document.
    pub async fn import_document(&self, request: &ImportRequest) -> Result<Document> {
        let file = Part::text(request.content.clone())
            .file_name(request.file_name())
            .mime_str(request.format.mime_type())
            .map_err(|e| OutlineError::Request(format!("invalid upload: {e}")))?;

        let mut form = Form::new()
            .part("file", file)
            .text("publish", request.publish.to_string());
        if let Some(id) = &request.collection_id {
            form = form.text("collectionId", id.clone());
        }
        if let Some(id) = &request.parent_document_id {
            form = form.text("parentDocumentId", id.clone());
        }

        let url = self.endpoint("documents.import");
        tracing::debug!(%url, format = %request.format, "uploading document");
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("Accept", "application/json")
            .multipart(form)
            .send()
            .await
            .map_err(|e| OutlineError::Request(e.to_string()))?;

        let status = response.status();
        let envelope: Envelope<Document> = Self::decode(response).await?;
        envelope.data.ok_or_else(|| OutlineError::Api {
            status: status.as_u16(),
            message: "import response did not contain a document".into(),
        })
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/{method}", self.base_url)
    }

    /// POST `body` to `method` and return the envelope's `data`.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: Value,
    ) -> Result<Option<T>> {
        let url = self.endpoint(method);
        tracing::debug!(%url, "outline request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| OutlineError::Request(e.to_string()))?;

        let envelope: Envelope<T> = Self::decode(response).await?;
        Ok(envelope.data)
    }

    /// Like [`Self::call`], but a 404 is an absent record rather than an error.
    async fn call_optional<T: DeserializeOwned>(
        &self,
        method: &str,
        body: Value,
    ) -> Result<Option<T>> {
        match self.call(method, body).await {
            Err(OutlineError::Api { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                tracing::debug!(method, "record not found");
                Ok(None)
            }
            other => other,
        }
    }

    async fn decode<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<Envelope<T>> {
        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(OutlineError::Api {
                status: status.as_u16(),
                message: api_error_message(&body_text),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| OutlineError::Request(format!("failed to read response: {e}")))?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Pull the human-readable message out of an Outline error body.
///
/// Outline answers errors with `{"ok": false, "error": "...", "message": "..."}`;
/// anything else is returned verbatim.
fn api_error_message(body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|v| v.get("message").or_else(|| v.get("error")))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| body.trim().to_string())
}
