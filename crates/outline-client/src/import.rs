//! Validated input for `documents.import`.

use outline_core::{ImportFormat, OutlineError};

/// A document upload that has passed input validation.
///
/// Construction checks title, content and format in that order, so an
/// invalid request never reaches the API.
///
/// # Examples
///
/// ```
/// use outline_client::ImportRequest;
/// use outline_core::ImportFormat;
///
/// let request = ImportRequest::new("Release notes", "# v1.2\n\n- fixes", "markdown")
///     .unwrap()
///     .in_collection(Some("col1".into()));
/// assert_eq!(request.format, ImportFormat::Markdown);
/// assert_eq!(request.file_name(), "Release notes.md");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRequest {
    /// Document title, also used as the uploaded file name.
    pub title: String,
    /// Raw file content.
    pub content: String,
    /// How Outline should interpret `content`.
    pub format: ImportFormat,
    /// Target collection.
    pub collection_id: Option<String>,
    /// Parent document for nested placement.
    pub parent_document_id: Option<String>,
    /// Publish immediately instead of creating a draft.
    pub publish: bool,
}

impl ImportRequest {
    /// Validate a request given a format name (`markdown`, `html`, `text`).
    ///
    /// # Errors
    ///
    /// Returns [`OutlineError::Validation`] with a user-facing message.
    pub fn new(title: &str, content: &str, format: &str) -> Result<Self, OutlineError> {
        validate_title_and_content(title, content)?;
        let format = format.parse::<ImportFormat>().map_err(|e| {
            OutlineError::Validation(format!(
                "Error: {e}. Supported formats: markdown, html, text"
            ))
        })?;
        Ok(Self::unchecked(title, content, format))
    }

    /// Validate a request given a file extension (`md`, `html`, `txt`, ...).
    ///
    /// # Errors
    ///
    /// Returns [`OutlineError::Validation`] with a user-facing message.
    pub fn from_file_content(
        title: &str,
        content: &str,
        extension: &str,
    ) -> Result<Self, OutlineError> {
        validate_title_and_content(title, content)?;
        let format = ImportFormat::from_extension(extension).ok_or_else(|| {
            OutlineError::Validation(format!(
                "Error: Unsupported file extension '{extension}'. Supported extensions: md, markdown, html, htm, txt, text"
            ))
        })?;
        Ok(Self::unchecked(title, content, format))
    }

    fn unchecked(title: &str, content: &str, format: ImportFormat) -> Self {
        Self {
            title: title.trim().to_string(),
            content: content.to_string(),
            format,
            collection_id: None,
            parent_document_id: None,
            publish: true,
        }
    }

    /// Place the document in a collection. Empty ids are ignored.
    pub fn in_collection(mut self, collection_id: Option<String>) -> Self {
        self.collection_id = collection_id.filter(|id| !id.trim().is_empty());
        self
    }

    /// Nest the document under a parent. Empty ids are ignored.
    pub fn under_parent(mut self, parent_document_id: Option<String>) -> Self {
        self.parent_document_id = parent_document_id.filter(|id| !id.trim().is_empty());
        self
    }

    /// File name for the multipart upload: the title with path separators
    /// and control characters replaced, plus the format's extension.
    pub fn file_name(&self) -> String {
        let stem: String = self
            .title
            .chars()
            .map(|c| {
                if c == '/' || c == '\\' || c.is_control() {
                    '_'
                } else {
                    c
                }
            })
            .collect();
        format!("{stem}.{}", self.format.extension())
    }
}

fn validate_title_and_content(title: &str, content: &str) -> Result<(), OutlineError> {
    if title.trim().is_empty() {
        return Err(OutlineError::Validation(
            "Error: Document title is required".into(),
        ));
    }
    if content.trim().is_empty() {
        return Err(OutlineError::Validation(
            "Error: Document content is required".into(),
        ));
    }
    Ok(())
}
