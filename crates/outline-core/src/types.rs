use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Fallback shown for a record without a title.
pub const UNTITLED: &str = "Untitled";
/// Fallback shown for a missing author, timestamp or id.
pub const UNKNOWN: &str = "Unknown";

/// Author descriptor attached to revisions and documents.
///
/// # Examples
///
/// ```
/// use outline_core::Author;
///
/// let author: Author = serde_json::from_str(r#"{"id": "u1", "name": "Ada"}"#).unwrap();
/// assert_eq!(author.name.as_deref(), Some("Ada"));
/// assert!(author.email.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Author {
    /// User id.
    pub id: Option<String>,
    /// Display name.
    pub name: Option<String>,
    /// Email address, when the token is allowed to see it.
    pub email: Option<String>,
}

/// A stored historical version of a document.
///
/// Every field except `id` may be absent in the API payload; the accessor
/// methods apply the display defaults ("Untitled", "Unknown", empty text).
///
/// # Examples
///
/// ```
/// use outline_core::RevisionRecord;
///
/// let rev: RevisionRecord = serde_json::from_str(r#"{"id": "rev1"}"#).unwrap();
/// assert_eq!(rev.title(), "Untitled");
/// assert_eq!(rev.author_name(), "Unknown");
/// assert_eq!(rev.text(), "");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RevisionRecord {
    /// Revision id.
    pub id: String,
    /// Document the revision belongs to.
    pub document_id: Option<String>,
    /// Document title at that revision.
    pub title: Option<String>,
    /// Markdown body at that revision.
    pub text: Option<String>,
    /// ISO-8601 creation timestamp.
    pub created_at: Option<String>,
    /// Who created the revision.
    pub created_by: Option<Author>,
}

impl RevisionRecord {
    /// Title, or "Untitled".
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(UNTITLED)
    }

    /// Body text, or the empty string.
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }

    /// Creation timestamp as delivered, or "Unknown".
    pub fn created_at_or_unknown(&self) -> &str {
        self.created_at.as_deref().unwrap_or(UNKNOWN)
    }

    /// Author name, or "Unknown" when the author or its name is missing.
    pub fn author_name(&self) -> &str {
        self.created_by
            .as_ref()
            .and_then(|a| a.name.as_deref())
            .filter(|n| !n.is_empty())
            .unwrap_or(UNKNOWN)
    }

    /// Id, or "Unknown" for an empty id.
    pub fn id_or_unknown(&self) -> &str {
        if self.id.is_empty() {
            UNKNOWN
        } else {
            &self.id
        }
    }
}

/// Collection reference embedded in some document payloads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CollectionRef {
    /// Collection id.
    pub id: String,
    /// Collection name.
    pub name: Option<String>,
}

/// An Outline document.
///
/// # Examples
///
/// ```
/// use outline_core::Document;
///
/// let doc: Document = serde_json::from_str(
///     r#"{"id": "doc1", "title": "Runbook", "updatedAt": "2024-01-01T00:00:00Z"}"#,
/// ).unwrap();
/// assert_eq!(doc.title(), "Runbook");
/// assert_eq!(doc.updated_at.as_deref(), Some("2024-01-01T00:00:00Z"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Document {
    /// Document id.
    pub id: String,
    /// Title.
    pub title: Option<String>,
    /// Markdown body.
    pub text: Option<String>,
    /// Relative URL inside the Outline instance.
    pub url: Option<String>,
    /// Owning collection id.
    pub collection_id: Option<String>,
    /// Parent document id for nested documents.
    pub parent_document_id: Option<String>,
    /// Expanded collection, when the endpoint includes it.
    pub collection: Option<CollectionRef>,
    /// ISO-8601 creation timestamp.
    pub created_at: Option<String>,
    /// ISO-8601 last-update timestamp.
    pub updated_at: Option<String>,
}

impl Document {
    /// Title, or "Untitled".
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(UNTITLED)
    }

    /// Body text, or the empty string.
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }
}

/// A single hit from `documents.search`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchHit {
    /// Highlighted snippet around the match.
    pub context: Option<String>,
    /// Relevance score assigned by Outline.
    pub ranking: Option<f64>,
    /// The matching document.
    pub document: Document,
}

/// An Outline collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Collection {
    /// Collection id.
    pub id: String,
    /// Collection name.
    pub name: Option<String>,
    /// Markdown description.
    pub description: Option<String>,
    /// Hex color.
    pub color: Option<String>,
}

/// Authenticated user and team, from `auth.info`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthInfo {
    /// The token owner.
    pub user: Author,
    /// The workspace the token belongs to.
    pub team: Option<CollectionRef>,
}

/// Content formats accepted by the import tools.
///
/// # Examples
///
/// ```
/// use outline_core::ImportFormat;
///
/// assert_eq!("Markdown".parse::<ImportFormat>().unwrap(), ImportFormat::Markdown);
/// assert_eq!(ImportFormat::from_extension(".htm"), Some(ImportFormat::Html));
/// assert_eq!(ImportFormat::Text.mime_type(), "text/plain");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportFormat {
    /// CommonMark / Outline markdown.
    Markdown,
    /// HTML document.
    Html,
    /// Plain text.
    Text,
}

impl ImportFormat {
    /// Resolve a file extension (with or without the leading dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim().trim_start_matches('.').to_lowercase().as_str() {
            "md" | "markdown" => Some(Self::Markdown),
            "html" | "htm" => Some(Self::Html),
            "txt" | "text" => Some(Self::Text),
            _ => None,
        }
    }

    /// MIME type sent with the uploaded file.
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Markdown => "text/markdown",
            Self::Html => "text/html",
            Self::Text => "text/plain",
        }
    }

    /// Canonical file extension used for the uploaded file name.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Html => "html",
            Self::Text => "txt",
        }
    }
}

impl fmt::Display for ImportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Markdown => write!(f, "markdown"),
            Self::Html => write!(f, "html"),
            Self::Text => write!(f, "text"),
        }
    }
}

impl FromStr for ImportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "html" => Ok(Self::Html),
            "text" | "txt" => Ok(Self::Text),
            _ => Err(format!("Unsupported format '{s}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revision_deserializes_full_payload() {
        let json = r#"{
            "id": "rev123",
            "documentId": "doc1",
            "title": "Test Document v2",
            "text": "Second version",
            "createdAt": "2023-12-01T10:00:00Z",
            "createdBy": {"id": "user1", "name": "John Doe", "email": "john@example.com"}
        }"#;
        let rev: RevisionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rev.id, "rev123");
        assert_eq!(rev.document_id.as_deref(), Some("doc1"));
        assert_eq!(rev.title(), "Test Document v2");
        assert_eq!(rev.text(), "Second version");
        assert_eq!(rev.created_at_or_unknown(), "2023-12-01T10:00:00Z");
        assert_eq!(rev.author_name(), "John Doe");
    }

    #[test]
    fn revision_missing_fields_use_defaults() {
        let rev: RevisionRecord = serde_json::from_str("{}").unwrap();
        assert_eq!(rev.id_or_unknown(), "Unknown");
        assert_eq!(rev.title(), "Untitled");
        assert_eq!(rev.text(), "");
        assert_eq!(rev.created_at_or_unknown(), "Unknown");
        assert_eq!(rev.author_name(), "Unknown");
    }

    #[test]
    fn null_author_and_empty_name_read_as_unknown() {
        let rev: RevisionRecord =
            serde_json::from_str(r#"{"id": "r", "createdBy": null}"#).unwrap();
        assert_eq!(rev.author_name(), "Unknown");

        let rev: RevisionRecord =
            serde_json::from_str(r#"{"id": "r", "createdBy": {"name": ""}}"#).unwrap();
        assert_eq!(rev.author_name(), "Unknown");
    }

    #[test]
    fn search_hit_wraps_document() {
        let json = r#"{"context": "the <b>deploy</b> step", "ranking": 0.8,
                       "document": {"id": "d1", "title": "Deploys"}}"#;
        let hit: SearchHit = serde_json::from_str(json).unwrap();
        assert_eq!(hit.document.title(), "Deploys");
        assert_eq!(hit.ranking, Some(0.8));
    }

    #[test]
    fn import_format_rejects_pdf() {
        let err = "pdf".parse::<ImportFormat>().unwrap_err();
        assert_eq!(err, "Unsupported format 'pdf'");
        assert_eq!(ImportFormat::from_extension("pdf"), None);
    }

    #[test]
    fn import_format_extension_mapping() {
        assert_eq!(ImportFormat::from_extension("MD"), Some(ImportFormat::Markdown));
        assert_eq!(ImportFormat::from_extension("txt"), Some(ImportFormat::Text));
        assert_eq!(ImportFormat::Html.extension(), "html");
    }
}
