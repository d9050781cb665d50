use std::fmt;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::OutlineError;

/// Default Outline API endpoint (the hosted service).
pub const DEFAULT_API_URL: &str = "https://app.getoutline.com/api";
/// Default per-request timeout for Outline API calls.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// How long a fetched revision stays valid in the revision cache.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;
/// Changes below this share of the original size are "minor".
pub const DEFAULT_MINOR_CHANGE_PERCENT: f64 = 5.0;
/// Changes below this share of the original size are "moderate".
pub const DEFAULT_MODERATE_CHANGE_PERCENT: f64 = 25.0;
/// Mean gaps below this many hours mean "rapid" editing.
pub const DEFAULT_RAPID_GAP_HOURS: f64 = 1.0;
/// Mean gaps below this many hours mean "active" editing.
pub const DEFAULT_ACTIVE_GAP_HOURS: f64 = 24.0;
/// Listen address for the HTTP transports.
pub const DEFAULT_BIND: SocketAddr =
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::new(127, 0, 0, 1), 3001));

/// Top-level configuration loaded from `.mcp-outline.toml`.
///
/// Supports layered resolution: CLI flags > env vars > local config > defaults.
///
/// # Examples
///
/// ```
/// use outline_core::OutlineConfig;
///
/// let config = OutlineConfig::default();
/// assert_eq!(config.cache.ttl_secs, 300);
/// assert_eq!(config.api.url, "https://app.getoutline.com/api");
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutlineConfig {
    /// Outline API connection settings.
    #[serde(default)]
    pub api: ApiConfig,
    /// Revision cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Thresholds used when classifying revision changes.
    #[serde(default)]
    pub analysis: AnalysisConfig,
    /// MCP server transport settings.
    #[serde(default)]
    pub server: ServerConfig,
}

impl OutlineConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`OutlineError::Io`] if the file cannot be read, or
    /// [`OutlineError::Toml`] if the content is not valid TOML.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use outline_core::OutlineConfig;
    /// use std::path::Path;
    ///
    /// let config = OutlineConfig::from_file(Path::new(".mcp-outline.toml")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, OutlineError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`OutlineError::Toml`] if parsing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use outline_core::OutlineConfig;
    ///
    /// let toml = r#"
    /// [cache]
    /// ttl_secs = 60
    /// "#;
    /// let config = OutlineConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.cache.ttl_secs, 60);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, OutlineError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Overlay `OUTLINE_API_KEY`, `OUTLINE_API_URL` and `MCP_TRANSPORT` from
    /// the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|name| std::env::var(name).ok());
    }

    /// Overlay environment values obtained through `lookup`.
    ///
    /// An unrecognised `MCP_TRANSPORT` is logged and the transport falls back
    /// to stdio instead of failing startup.
    ///
    /// # Examples
    ///
    /// ```
    /// use outline_core::{OutlineConfig, Transport};
    ///
    /// let mut config = OutlineConfig::default();
    /// config.apply_env_with(|name| match name {
    ///     "OUTLINE_API_KEY" => Some("ol_api_123".into()),
    ///     "MCP_TRANSPORT" => Some("HTTP".into()),
    ///     _ => None,
    /// });
    /// assert_eq!(config.api.key.as_deref(), Some("ol_api_123"));
    /// assert_eq!(config.server.transport, Transport::StreamableHttp);
    /// ```
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("OUTLINE_API_KEY").filter(|k| !k.is_empty()) {
            self.api.key = Some(key);
        }
        if let Some(url) = lookup("OUTLINE_API_URL").filter(|u| !u.is_empty()) {
            self.api.url = url;
        }
        if let Some(raw) = lookup("MCP_TRANSPORT") {
            self.server.transport = Transport::parse_or_default(&raw);
        }
    }
}

/// Outline API connection settings.
///
/// The `Debug` output never includes the API key.
#[derive(Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API token (`ol_api_...`).
    pub key: Option<String>,
    /// Base URL of the API, without trailing slash.
    #[serde(default = "default_api_url")]
    pub url: String,
    /// Request timeout in seconds (default: 30).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.into()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            key: None,
            url: default_api_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .field("url", &self.url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Revision cache settings.
///
/// # Examples
///
/// ```
/// use outline_core::CacheConfig;
/// use std::time::Duration;
///
/// assert_eq!(CacheConfig::default().ttl(), Duration::from_secs(300));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Seconds a fetched revision is served from memory (default: 300).
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_cache_ttl_secs() -> u64 {
    DEFAULT_CACHE_TTL_SECS
}

impl CacheConfig {
    /// TTL as a [`Duration`].
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl_secs(),
        }
    }
}

/// Policy thresholds for revision analysis.
///
/// These are editorial choices rather than derived limits, so every one of
/// them can be overridden under `[analysis]`.
///
/// # Examples
///
/// ```
/// use outline_core::AnalysisConfig;
///
/// let config = AnalysisConfig::default();
/// assert_eq!(config.minor_change_percent, 5.0);
/// assert_eq!(config.moderate_change_percent, 25.0);
/// assert_eq!(config.rapid_gap_hours, 1.0);
/// assert_eq!(config.active_gap_hours, 24.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Upper bound (exclusive) of a "minor" change, in percent.
    #[serde(default = "default_minor_change_percent")]
    pub minor_change_percent: f64,
    /// Upper bound (exclusive) of a "moderate" change, in percent.
    #[serde(default = "default_moderate_change_percent")]
    pub moderate_change_percent: f64,
    /// Upper bound (exclusive) of a "rapid" mean gap, in hours.
    #[serde(default = "default_rapid_gap_hours")]
    pub rapid_gap_hours: f64,
    /// Upper bound (exclusive) of an "active" mean gap, in hours.
    #[serde(default = "default_active_gap_hours")]
    pub active_gap_hours: f64,
}

fn default_minor_change_percent() -> f64 {
    DEFAULT_MINOR_CHANGE_PERCENT
}

fn default_moderate_change_percent() -> f64 {
    DEFAULT_MODERATE_CHANGE_PERCENT
}

fn default_rapid_gap_hours() -> f64 {
    DEFAULT_RAPID_GAP_HOURS
}

fn default_active_gap_hours() -> f64 {
    DEFAULT_ACTIVE_GAP_HOURS
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            minor_change_percent: default_minor_change_percent(),
            moderate_change_percent: default_moderate_change_percent(),
            rapid_gap_hours: default_rapid_gap_hours(),
            active_gap_hours: default_active_gap_hours(),
        }
    }
}

/// MCP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Transport the server speaks (default: stdio).
    #[serde(default)]
    pub transport: Transport,
    /// Listen address for HTTP transports (default: 127.0.0.1:3001).
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,
}

fn default_bind() -> SocketAddr {
    DEFAULT_BIND
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: Transport::default(),
            bind: default_bind(),
        }
    }
}

/// MCP transport mode.
///
/// Parsing is case-insensitive and accepts `http` as an alias for
/// `streamable-http`.
///
/// # Examples
///
/// ```
/// use outline_core::Transport;
///
/// assert_eq!("STDIO".parse::<Transport>().unwrap(), Transport::Stdio);
/// assert_eq!("http".parse::<Transport>().unwrap(), Transport::StreamableHttp);
/// assert!("carrier-pigeon".parse::<Transport>().is_err());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Transport {
    /// JSON-RPC over stdin/stdout.
    #[default]
    Stdio,
    /// Legacy server-sent events mode.
    Sse,
    /// Streamable HTTP.
    #[serde(alias = "http")]
    StreamableHttp,
}

impl Transport {
    /// Every accepted canonical name.
    pub const VALID: [&'static str; 3] = ["stdio", "sse", "streamable-http"];

    /// Parse `raw`, logging and falling back to stdio when it is not a
    /// known transport.
    pub fn parse_or_default(raw: &str) -> Self {
        match raw.parse() {
            Ok(transport) => transport,
            Err(msg) => {
                tracing::error!("{msg}");
                Self::Stdio
            }
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdio => write!(f, "stdio"),
            Self::Sse => write!(f, "sse"),
            Self::StreamableHttp => write!(f, "streamable-http"),
        }
    }
}

impl FromStr for Transport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "stdio" => Ok(Self::Stdio),
            "sse" => Ok(Self::Sse),
            "streamable-http" | "http" => Ok(Self::StreamableHttp),
            _ => Err(format!(
                "Invalid transport mode: {s}. Must be one of: ['stdio', 'sse', 'streamable-http']"
            )),
        }
    }
}
