//! Configuration module for bucketsync.
//!
//! Provides typed configuration structs that map to the YAML configuration file,
//! with loading, validation, defaults, and a builder pattern for programmatic use.
//! The CLI layers flag and environment values on top of whatever the file holds.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for a bucketsync run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub bucket: BucketConfig,
    pub source: SourceConfig,
    pub logging: LoggingConfig,
}

/// Remote store connection settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Base URL of the store gateway.
    pub api_url: String,
    /// API key.
    pub key: String,
    /// API secret.
    pub secret: String,
    /// Pre-issued session token; when set it is reused instead of deriving one.
    pub session: Option<String>,
    /// Thread every request is scoped to.
    pub thread: String,
    /// Upper bound, in seconds, on any single remote call. A push gets it
    /// once per upload block.
    pub request_timeout_secs: u64,
}

/// Target bucket settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BucketConfig {
    /// Bucket name. A random 8-character name is generated when absent.
    pub name: Option<String>,
    /// Remove the named bucket instead of syncing into it.
    pub remove: bool,
    /// Delete remote entries that no longer exist locally.
    pub clean_orphans: bool,
}

/// Local source tree settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Directory whose contents are uploaded.
    pub path: PathBuf,
    /// Glob pattern evaluated relative to `path`.
    pub pattern: String,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
    /// Emit logs as JSON lines instead of human-readable text.
    pub json: bool,
}

// ---------------------------------------------------------------------------
// Config::load()
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/bucketsync/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("bucketsync")
            .join("config.yaml")
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Default store gateway.
pub const DEFAULT_API_URL: &str = "https://api.hub.textile.io";

/// Default per-call timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Default glob pattern: every file, recursively.
pub const DEFAULT_PATTERN: &str = "**/*";

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            key: String::new(),
            secret: String::new(),
            session: None,
            thread: String::new(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("api_url", &self.api_url)
            .field("key", &self.key)
            .field("secret", &"<redacted>")
            .field("session", &self.session.as_ref().map(|_| "<redacted>"))
            .field("thread", &self.thread)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("."),
            pattern: DEFAULT_PATTERN.to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Config::validate()
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"store.api_url"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid. Credentials and the
    /// thread id are checked by the sync engine itself, since a run must
    /// fail with a specific message before any remote call.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- store ---
        match url::Url::parse(self.store.api_url.trim()) {
            Ok(parsed) if parsed.scheme() == "http" || parsed.scheme() == "https" => {}
            Ok(parsed) => errors.push(ValidationError {
                field: "store.api_url".into(),
                message: format!("unsupported scheme '{}'", parsed.scheme()),
            }),
            Err(e) => errors.push(ValidationError {
                field: "store.api_url".into(),
                message: format!("invalid URL '{}': {e}", self.store.api_url),
            }),
        }
        if self.store.request_timeout_secs == 0 {
            errors.push(ValidationError {
                field: "store.request_timeout_secs".into(),
                message: "must be greater than 0".into(),
            });
        }

        // --- bucket ---
        if let Some(name) = &self.bucket.name {
            if name.chars().any(|c| c == '/') {
                errors.push(ValidationError {
                    field: "bucket.name".into(),
                    message: format!("must not contain '/': {name}"),
                });
            }
        }

        // --- source ---
        if self.source.pattern.trim().is_empty() {
            errors.push(ValidationError {
                field: "source.pattern".into(),
                message: "must not be empty".into(),
            });
        } else if let Err(e) = glob::Pattern::new(&self.source.pattern) {
            errors.push(ValidationError {
                field: "source.pattern".into(),
                message: format!("invalid glob '{}': {e}", self.source.pattern),
            });
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}'; valid options: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] (or an existing config) and allows
/// selective overrides.
///
/// # Example
///
/// ```rust,no_run
/// use bucketsync_core::config::ConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = ConfigBuilder::new()
///     .store_key("key")
///     .store_secret("secret")
///     .store_thread("bafk...")
///     .source_path(PathBuf::from("./public"))
///     .bucket_clean_orphans(true)
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with [`Config::default`] values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Create a builder that starts from an existing configuration.
    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    // --- store ---

    pub fn store_api_url(mut self, url: impl Into<String>) -> Self {
        self.config.store.api_url = url.into();
        self
    }

    pub fn store_key(mut self, key: impl Into<String>) -> Self {
        self.config.store.key = key.into();
        self
    }

    pub fn store_secret(mut self, secret: impl Into<String>) -> Self {
        self.config.store.secret = secret.into();
        self
    }

    pub fn store_session(mut self, session: impl Into<String>) -> Self {
        self.config.store.session = Some(session.into());
        self
    }

    pub fn store_thread(mut self, thread: impl Into<String>) -> Self {
        self.config.store.thread = thread.into();
        self
    }

    pub fn store_request_timeout_secs(mut self, seconds: u64) -> Self {
        self.config.store.request_timeout_secs = seconds;
        self
    }

    // --- bucket ---

    pub fn bucket_name(mut self, name: impl Into<String>) -> Self {
        self.config.bucket.name = Some(name.into());
        self
    }

    pub fn bucket_remove(mut self, remove: bool) -> Self {
        self.config.bucket.remove = remove;
        self
    }

    pub fn bucket_clean_orphans(mut self, clean: bool) -> Self {
        self.config.bucket.clean_orphans = clean;
        self
    }

    // --- source ---

    pub fn source_path(mut self, path: PathBuf) -> Self {
        self.config.source.path = path;
        self
    }

    pub fn source_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.config.source.pattern = pattern.into();
        self
    }

    // --- logging ---

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn logging_json(mut self, json: bool) -> Self {
        self.config.logging.json = json;
        self
    }

    // --- build ---

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate in one step. Returns `Err` with the list of
    /// validation errors if the configuration is invalid.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let config = self.build();
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(errors)
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
