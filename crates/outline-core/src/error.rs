/// Errors that can occur across the mcp-outline workspace.
///
/// Library crates return this type directly. It also implements
/// [`miette::Diagnostic`] so the binary can surface it with `?` and get
/// help text for the common setup mistakes.
///
/// # Examples
///
/// ```
/// use outline_core::OutlineError;
///
/// let err = OutlineError::Config("missing API key".into());
/// assert!(err.to_string().contains("missing API key"));
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum OutlineError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    #[diagnostic(
        code(outline::config),
        help("run `mcp-outline doctor` to check API key, URL and transport settings")
    )]
    Config(String),

    /// The request never produced an HTTP response (DNS, TLS, timeout, ...).
    #[error("API request failed: {0}")]
    #[diagnostic(code(outline::request))]
    Request(String),

    /// Outline answered with a non-success status.
    #[error("Outline API error {status}: {message}")]
    #[diagnostic(code(outline::api))]
    Api {
        /// HTTP status code returned by the server.
        status: u16,
        /// Error message from the response body, or the raw body.
        message: String,
    },

    /// Tool input rejected before any request was made.
    #[error("{0}")]
    Validation(String),

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl OutlineError {
    /// Whether the error originated upstream (network or API) rather than
    /// locally.
    ///
    /// # Examples
    ///
    /// ```
    /// use outline_core::OutlineError;
    ///
    /// assert!(OutlineError::Request("timed out".into()).is_upstream());
    /// assert!(!OutlineError::Validation("bad".into()).is_upstream());
    /// ```
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Api { .. })
    }
}
