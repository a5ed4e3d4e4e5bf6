//! Configuration schema types
//!
//! This module defines the configuration structure for es-sample. Every section
//! rejects unknown keys, so a typo in a config file fails at load time instead
//! of being silently ignored.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

/// Token used on the command line and in config files for "no bound"
pub const UNBOUNDED_TOKEN: &str = "-";

/// An optional numeric cap
///
/// Written as an integer, or as `"-"` for no cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// No cap
    Unbounded,
    /// Cap at the given value
    Limited(u64),
}

impl Bound {
    /// Returns the cap, if any
    pub fn value(self) -> Option<u64> {
        match self {
            Bound::Unbounded => None,
            Bound::Limited(n) => Some(n),
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Unbounded => write!(f, "{UNBOUNDED_TOKEN}"),
            Bound::Limited(n) => write!(f, "{n}"),
        }
    }
}

impl FromStr for Bound {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == UNBOUNDED_TOKEN || s.eq_ignore_ascii_case("unbounded") {
            return Ok(Bound::Unbounded);
        }
        s.parse::<u64>()
            .map(Bound::Limited)
            .map_err(|_| format!("expected a non-negative integer or '{UNBOUNDED_TOKEN}', got '{s}'"))
    }
}

impl Serialize for Bound {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Bound::Unbounded => serializer.serialize_str(UNBOUNDED_TOKEN),
            Bound::Limited(n) => serializer.serialize_u64(*n),
        }
    }
}

impl<'de> Deserialize<'de> for Bound {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(Bound::Limited(n)),
            Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Main es-sample configuration
///
/// This is the root configuration structure that maps to the TOML file. Every
/// section is optional and falls back to its defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SampleConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Document store connection
    #[serde(default)]
    pub store: StoreConfig,

    /// Query, paging and filtering
    #[serde(default)]
    pub query: QueryConfig,

    /// Output and parallelism
    #[serde(default)]
    pub export: ExportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SampleConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.store.validate()?;
        self.query.validate()?;
        self.export.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Capacity of the fan-out queue (defaults to the page size)
    pub fn queue_capacity(&self) -> usize {
        self.export.queue_size.unwrap_or(self.query.size)
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

/// Document store connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Base URL of the store; normalized to end with exactly one `/`
    #[serde(default = "default_host")]
    pub host: String,

    /// Scroll context keep-alive (e.g. "10s", "1m")
    #[serde(default = "default_scroll")]
    pub scroll: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// TLS certificate verification for https hosts
    ///
    /// Disabling this accepts any certificate and should only be used against
    /// development clusters with self-signed certificates.
    #[serde(default = "default_true")]
    pub tls_verify: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            scroll: default_scroll(),
            timeout_seconds: default_timeout_seconds(),
            tls_verify: true,
        }
    }
}

impl StoreConfig {
    /// Normalizes `host` so relative request paths join under it
    pub fn normalize_host(&mut self) {
        self.host = normalize_host(&self.host);
    }

    fn validate(&self) -> Result<(), String> {
        if self.host.is_empty() {
            return Err("store.host cannot be empty".to_string());
        }
        if !self.host.starts_with("http://") && !self.host.starts_with("https://") {
            return Err(format!(
                "store.host must start with http:// or https://, got '{}'",
                self.host
            ));
        }
        url::Url::parse(&self.host)
            .map_err(|e| format!("store.host '{}' is not a valid URL: {e}", self.host))?;

        let scroll_re = regex::Regex::new(r"^[1-9][0-9]*(nanos|micros|ms|s|m|h|d)$")
            .map_err(|e| e.to_string())?;
        if !scroll_re.is_match(&self.scroll) {
            return Err(format!(
                "store.scroll must be a duration like '10s' or '1m', got '{}'",
                self.scroll
            ));
        }

        if self.timeout_seconds == 0 {
            return Err("store.timeout_seconds must be > 0".to_string());
        }
        Ok(())
    }
}

/// Strips trailing slashes and appends exactly one
pub fn normalize_host(host: &str) -> String {
    format!("{}/", host.trim_end_matches('/'))
}

/// Query, paging and filter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueryConfig {
    /// Filter clause passed through to the store unchanged
    #[serde(default = "default_query")]
    pub query: Value,

    /// Page size for scroll and id-batch requests
    #[serde(default = "default_size")]
    pub size: usize,

    /// Cap on the total number of fetched results
    #[serde(default = "default_limit")]
    pub limit: Bound,

    /// Cap on the number of accepted documents per run
    #[serde(default = "default_count")]
    pub count: Bound,

    /// Random sampling instead of stable `_doc` order
    #[serde(default)]
    pub random: bool,

    /// Explicit source field projection
    #[serde(default)]
    pub source_fields: Option<Vec<String>>,

    /// Stored fields to request
    #[serde(default)]
    pub stored_fields: Option<Vec<String>>,

    /// Docvalue fields to request
    #[serde(default)]
    pub docvalue_fields: Option<Vec<String>>,

    /// Glob lists of which at least one path must exist (one list per condition)
    #[serde(default)]
    pub existing: Vec<Vec<String>>,

    /// Glob lists of which at least one path must be absent (one list per condition)
    #[serde(default)]
    pub missing: Vec<Vec<String>>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            query: default_query(),
            size: default_size(),
            limit: default_limit(),
            count: default_count(),
            random: false,
            source_fields: None,
            stored_fields: None,
            docvalue_fields: None,
            existing: Vec::new(),
            missing: Vec::new(),
        }
    }
}

impl QueryConfig {
    /// Replaces a `-` entry in `source_fields` with every condition glob
    ///
    /// This lets a run fetch exactly the fields its conditions look at.
    pub fn expand_source_fields(&mut self) {
        let Some(fields) = self.source_fields.as_mut() else {
            return;
        };
        let before = fields.len();
        fields.retain(|f| f != UNBOUNDED_TOKEN);
        if fields.len() == before {
            return;
        }
        fields.extend(self.existing.iter().flatten().cloned());
        fields.extend(self.missing.iter().flatten().cloned());
    }

    fn validate(&self) -> Result<(), String> {
        if !self.query.is_object() {
            return Err(format!(
                "query.query must be a JSON object, got {}",
                self.query
            ));
        }
        if self.size == 0 {
            return Err("query.size must be > 0".to_string());
        }
        for (name, lists) in [("existing", &self.existing), ("missing", &self.missing)] {
            for globs in lists {
                if globs.is_empty() || globs.iter().any(|g| g.is_empty()) {
                    return Err(format!("query.{name} contains an empty glob list or glob"));
                }
                for glob in globs {
                    glob::Pattern::new(glob)
                        .map_err(|e| format!("query.{name}: invalid glob '{glob}': {e}"))?;
                }
            }
        }
        Ok(())
    }
}

/// Output and parallelism configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExportConfig {
    /// Output destination; `-` is standard output, unset means `<collection>.jsonl`
    #[serde(default)]
    pub output: Option<String>,

    /// Pretty-print exported documents
    #[serde(default)]
    pub pretty: bool,

    /// Number of writer workers; 0 writes inline in fetch order
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,

    /// Fan-out queue capacity (defaults to the page size)
    #[serde(default)]
    pub queue_size: Option<usize>,

    /// Delete each collection after it has been exported
    #[serde(default)]
    pub delete: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output: None,
            pretty: false,
            parallelism: default_parallelism(),
            queue_size: None,
            delete: false,
        }
    }
}

impl ExportConfig {
    fn validate(&self) -> Result<(), String> {
        if self.queue_size == Some(0) {
            return Err("export.queue_size must be > 0".to_string());
        }
        if matches!(self.output.as_deref(), Some("")) {
            return Err("export.output cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable local JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }
        if self.local_enabled && self.local_path.is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }
        Ok(())
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_host() -> String {
    "http://localhost:9200/".to_string()
}

fn default_scroll() -> String {
    "10s".to_string()
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_true() -> bool {
    true
}

fn default_query() -> Value {
    json!({ "match_all": {} })
}

fn default_size() -> usize {
    1000
}

fn default_limit() -> Bound {
    Bound::Unbounded
}

fn default_count() -> Bound {
    Bound::Limited(1)
}

fn default_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
