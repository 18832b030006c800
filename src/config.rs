//! Configuration management for boletin.
//!
//! Settings are layered: built-in defaults, then a config file (discovered
//! with the prefer crate or given explicitly), then environment and CLI
//! overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::repository::DbContext;
use crate::scrapers::boe::DEFAULT_BASE_URL;

/// Default database filename.
pub const DEFAULT_DATABASE_FILENAME: &str = "boletin.db";

/// Default header carrying the authenticated username.
pub const DEFAULT_USER_HEADER: &str = "x-remote-user";

/// Default request timeout in seconds.
const DEFAULT_REQUEST_TIMEOUT: u64 = 30;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {format} config {path}: {message}")]
    Parse {
        path: PathBuf,
        format: &'static str,
        message: String,
    },
    #[error("unsupported DATABASE_URL '{0}': only sqlite databases are supported")]
    UnsupportedDatabase(String),
    #[error("invalid base_url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base data directory.
    pub data_dir: PathBuf,
    /// Database filename.
    pub database_filename: String,
    /// Database URL (overrides data_dir/database_filename if set).
    pub database_url: Option<String>,
    /// Origin of the bulletin site.
    pub base_url: String,
    /// User agent config: None, "impersonate", or a custom string.
    pub user_agent: Option<String>,
    /// Request timeout in seconds.
    pub request_timeout: u64,
    /// Header set by the reverse proxy with the authenticated username.
    pub user_header: String,
}

impl Default for Settings {
    fn default() -> Self {
        // Documents dir -> Home dir -> Current dir
        let data_dir = dirs::document_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("boletin");

        Self {
            data_dir,
            database_filename: DEFAULT_DATABASE_FILENAME.to_string(),
            database_url: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            user_header: DEFAULT_USER_HEADER.to_string(),
        }
    }
}

impl Settings {
    /// Get the database URL, constructing from path if not explicitly set.
    pub fn database_url(&self) -> String {
        match self.database_url {
            Some(ref url) => url.clone(),
            None => format!("sqlite:{}", self.database_path().display()),
        }
    }

    /// Get the full path to the SQLite database file.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_filename)
    }

    /// Check if the database appears to be initialized.
    pub fn database_exists(&self) -> bool {
        self.database_url.is_some() || self.database_path().exists()
    }

    /// Ensure the data directory exists.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.data_dir)
    }

    /// Request timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Create a database context for these settings.
    pub fn create_db_context(&self) -> DbContext {
        DbContext::from_url(&self.database_url())
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Data directory path.
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "target")]
    pub data_dir: Option<String>,
    /// Database filename.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    /// Origin of the bulletin site.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// User agent string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Request timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<u64>,
    /// Header carrying the authenticated username.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_header: Option<String>,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration using prefer crate for discovery.
    /// A missing or unreadable discovered file falls back to defaults.
    pub async fn load() -> Self {
        let path = match prefer::load("boletin").await {
            Ok(pref_config) => pref_config.source_path().cloned(),
            Err(_) => None,
        };

        let Some(path) = path else {
            return Self::default();
        };

        match Self::load_from_path(&path).await {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring config file: {}", e);
                Self::default()
            }
        }
    }

    /// Load configuration from a specific file path.
    /// The format is chosen by extension: TOML, YAML, or JSON (default).
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        let parse_error = |format: &'static str, message: String| ConfigError::Parse {
            path: path.to_path_buf(),
            format,
            message,
        };

        let mut config: Config = match ext {
            "toml" => toml::from_str(&contents).map_err(|e| parse_error("TOML", e.to_string()))?,
            "yaml" | "yml" => {
                serde_yaml::from_str(&contents).map_err(|e| parse_error("YAML", e.to_string()))?
            }
            _ => serde_json::from_str(&contents).map_err(|e| parse_error("JSON", e.to_string()))?,
        };

        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Get the base directory for resolving relative paths.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path that may be relative to the config file.
    /// - Absolute paths are returned as-is
    /// - Paths starting with ~ are expanded
    /// - Relative paths are resolved relative to `base_dir`
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Apply configuration to settings.
    pub fn apply_to_settings(&self, settings: &mut Settings, base_dir: &Path) {
        if let Some(ref data_dir) = self.data_dir {
            settings.data_dir = self.resolve_path(data_dir, base_dir);
        }
        if let Some(ref database) = self.database {
            settings.database_filename = database.clone();
        }
        if let Some(ref base_url) = self.base_url {
            settings.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(ref user_agent) = self.user_agent {
            settings.user_agent = Some(user_agent.clone());
        }
        if let Some(timeout) = self.request_timeout {
            settings.request_timeout = timeout;
        }
        if let Some(ref header) = self.user_header {
            settings.user_header = header.to_ascii_lowercase();
        }
    }
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides auto-discovery).
    pub config_path: Option<PathBuf>,
    /// Use CWD for relative paths instead of config file directory.
    pub use_cwd: bool,
    /// Data directory or database file (--target flag).
    pub target: Option<PathBuf>,
}

fn is_database_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext == "db" || ext == "sqlite" || ext == "sqlite3")
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    }
}

/// Only sqlite URLs (or bare paths) are accepted.
fn validate_database_url(url: &str) -> Result<(), ConfigError> {
    let scheme = url.split_once("://").map(|(scheme, _)| scheme);
    match scheme {
        None | Some("sqlite") | Some("file") => Ok(()),
        Some(_) => Err(ConfigError::UnsupportedDatabase(url.to_string())),
    }
}

/// The bulletin origin must be an absolute http(s) URL.
fn validate_base_url(base_url: &str) -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason,
    };
    let parsed = url::Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(invalid(format!("unsupported scheme {}", other))),
    }
}

/// Load settings with explicit options.
/// Returns (Settings, Config) tuple.
pub async fn load_settings_with_options(
    options: LoadOptions,
) -> Result<(Settings, Config), ConfigError> {
    let config = match options.config_path {
        Some(ref path) => Config::load_from_path(path).await?,
        None => Config::load().await,
    };

    let mut settings = Settings::default();

    let base_dir = if options.use_cwd {
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    } else {
        config
            .base_dir()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    };

    config.apply_to_settings(&mut settings, &base_dir);
    validate_base_url(&settings.base_url)?;

    // --target accepts either a directory or a database file
    if let Some(ref target) = options.target {
        let target = absolute(target);
        if is_database_file(&target) {
            if let Some(name) = target.file_name().and_then(|n| n.to_str()) {
                settings.database_filename = name.to_string();
            }
            settings.data_dir = target.parent().unwrap_or(Path::new(".")).to_path_buf();
        } else {
            settings.data_dir = target;
        }
    }

    // DATABASE_URL environment variable takes highest precedence
    if let Some(url) = std::env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()) {
        validate_database_url(&url)?;
        tracing::debug!("Using DATABASE_URL from environment: {}", url);
        settings.database_url = Some(url);
    }

    Ok((settings, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(settings.data_dir.ends_with("boletin"));
        assert_eq!(settings.database_filename, "boletin.db");
        assert_eq!(settings.base_url, "https://www.boe.es");
        assert_eq!(settings.request_timeout, 30);
        assert_eq!(settings.user_header, "x-remote-user");
    }

    #[test]
    fn test_database_url_from_path() {
        let settings = Settings {
            data_dir: PathBuf::from("/srv/boletin"),
            ..Settings::default()
        };
        assert_eq!(settings.database_url(), "sqlite:/srv/boletin/boletin.db");

        let settings = Settings {
            database_url: Some("sqlite:///tmp/other.db".to_string()),
            ..Settings::default()
        };
        assert_eq!(settings.database_url(), "sqlite:///tmp/other.db");
    }

    #[test]
    fn test_validate_database_url() {
        assert!(validate_database_url("sqlite:///tmp/x.db").is_ok());
        assert!(validate_database_url("/tmp/x.db").is_ok());
        assert!(matches!(
            validate_database_url("postgres://localhost/boletin"),
            Err(ConfigError::UnsupportedDatabase(_))
        ));
    }

    #[test]
    fn test_validate_base_url() {
        assert!(validate_base_url("https://www.boe.es").is_ok());
        assert!(validate_base_url("http://127.0.0.1:8080").is_ok());
        assert!(matches!(
            validate_base_url("www.boe.es"),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            validate_base_url("ftp://www.boe.es"),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));
    }

    #[tokio::test]
    async fn test_discovered_config_keeps_its_path() {
        // Whatever discovery finds (possibly nothing), the recorded path
        // must point at the file that was read.
        let config = Config::load().await;
        if let Some(path) = config.source_path {
            assert!(path.is_file());
        }
    }

    #[tokio::test]
    async fn test_load_toml_and_apply() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("boletin.toml");
        std::fs::write(
            &path,
            r#"
data_dir = "data"
base_url = "http://127.0.0.1:8080/"
request_timeout = 5
user_header = "X-Forwarded-User"
"#,
        )
        .unwrap();

        let config = Config::load_from_path(&path).await.unwrap();
        assert_eq!(config.source_path.as_deref(), Some(path.as_path()));

        let mut settings = Settings::default();
        config.apply_to_settings(&mut settings, &config.base_dir().unwrap());
        assert_eq!(settings.data_dir, dir.path().join("data"));
        assert_eq!(settings.base_url, "http://127.0.0.1:8080");
        assert_eq!(settings.request_timeout, 5);
        assert_eq!(settings.user_header, "x-forwarded-user");
    }

    #[tokio::test]
    async fn test_load_yaml_and_json() {
        let dir = tempdir().unwrap();

        let yaml = dir.path().join("boletin.yaml");
        std::fs::write(&yaml, "database: other.db\nuser_agent: impersonate\n").unwrap();
        let config = Config::load_from_path(&yaml).await.unwrap();
        assert_eq!(config.database.as_deref(), Some("other.db"));
        assert_eq!(config.user_agent.as_deref(), Some("impersonate"));

        let json = dir.path().join("boletin.json");
        std::fs::write(&json, r#"{"target": "/var/lib/boletin"}"#).unwrap();
        let config = Config::load_from_path(&json).await.unwrap();
        assert_eq!(config.data_dir.as_deref(), Some("/var/lib/boletin"));
    }

    #[tokio::test]
    async fn test_load_invalid_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("boletin.toml");
        std::fs::write(&path, "request_timeout = \"soon\"").unwrap();

        let err = Config::load_from_path(&path).await.unwrap_err();
        assert!(matches!(err, ConfigError::Parse { format: "TOML", .. }));

        let missing = Config::load_from_path(&dir.path().join("nope.toml")).await;
        assert!(matches!(missing, Err(ConfigError::Read { .. })));
    }

    #[tokio::test]
    async fn test_target_database_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("empty.json");
        std::fs::write(&config_path, "{}").unwrap();

        let (settings, _) = load_settings_with_options(LoadOptions {
            config_path: Some(config_path),
            use_cwd: false,
            target: Some(dir.path().join("custom.db")),
        })
        .await
        .unwrap();

        if std::env::var("DATABASE_URL").is_err() {
            assert_eq!(settings.database_path(), dir.path().join("custom.db"));
        }
    }

    #[test]
    fn test_resolve_path() {
        let config = Config::default();
        let base = Path::new("/etc/boletin");
        assert_eq!(
            config.resolve_path("/abs/path", base),
            PathBuf::from("/abs/path")
        );
        assert_eq!(
            config.resolve_path("rel", base),
            PathBuf::from("/etc/boletin/rel")
        );
    }
}
