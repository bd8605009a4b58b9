//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

// ============================================================================
// Server Configuration Constants
// ============================================================================

/// Default server host binding.
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

/// Default server port.
pub const DEFAULT_SERVER_PORT: u16 = 3001;

/// Default shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Default limit for buffered query result bodies (256 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 256 * 1024 * 1024;

/// Default CORS allowed origin for local development.
pub const DEFAULT_CORS_ALLOWED_ORIGIN: &str = "http://localhost:3000";

// ============================================================================
// Content / Sequence Store Constants
// ============================================================================

/// Default directory served by the content route.
pub const DEFAULT_CONTENT_DIRECTORY: &str = "./content";

/// Default sequence service base URL.
pub const DEFAULT_SEQUENCE_STORE_URL: &str = "http://localhost:8983/solr";

/// Default per-lookup timeout in seconds.
pub const DEFAULT_SEQUENCE_LOOKUP_TIMEOUT_SECS: u64 = 30;

/// Default number of feature documents resolved per batched lookup.
pub const DEFAULT_SEQUENCE_BATCH_SIZE: usize = 500;

/// Default connection pool size for the PostgreSQL sequence backend.
pub const DEFAULT_SEQUENCE_DB_MAX_CONNECTIONS: u32 = 10;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub content: ContentConfig,
    pub sequences: SequenceStoreConfig,
}

/// Server-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
    pub max_body_bytes: usize,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

/// Static content configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    pub directory: PathBuf,
}

/// Sequence store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceStoreConfig {
    pub backend: SequenceBackend,
    /// Base URL of the HTTP service, or the database URL for `postgres`
    pub url: String,
    pub lookup_timeout_secs: u64,
    pub batch_size: usize,
    pub on_lookup_failure: LookupFailurePolicy,
    pub max_connections: u32,
}

impl SequenceStoreConfig {
    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.lookup_timeout_secs)
    }
}

/// Where sequence text is looked up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SequenceBackend {
    /// Solr-style `feature_sequence` collection over HTTP
    #[default]
    Http,
    /// `feature_sequence` table in PostgreSQL
    Postgres,
}

impl FromStr for SequenceBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "http" | "solr" => Ok(SequenceBackend::Http),
            "postgres" | "postgresql" => Ok(SequenceBackend::Postgres),
            _ => Err(anyhow::anyhow!("Invalid sequence store backend: {}", s)),
        }
    }
}

/// What the FASTA serializer does with records whose sequence lookup failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LookupFailurePolicy {
    /// Log the failure and leave the affected records out of the output
    #[default]
    Skip,
    /// Terminate the response body with an error
    Abort,
}

impl FromStr for LookupFailurePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "skip" | "drop" => Ok(LookupFailurePolicy::Skip),
            "abort" | "fail" => Ok(LookupFailurePolicy::Abort),
            _ => Err(anyhow::anyhow!("Invalid lookup failure policy: {}", s)),
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let backend = match std::env::var("SEQUENCE_STORE_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) => SequenceBackend::default(),
        };

        let on_lookup_failure = match std::env::var("SEQUENCE_LOOKUP_FAILURE") {
            Ok(value) => value.parse()?,
            Err(_) => LookupFailurePolicy::default(),
        };

        let config = Config {
            server: ServerConfig {
                host: std::env::var("P3_HOST").unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
                port: env_or("P3_PORT", DEFAULT_SERVER_PORT),
                shutdown_timeout_secs: env_or("P3_SHUTDOWN_TIMEOUT", DEFAULT_SHUTDOWN_TIMEOUT_SECS),
                max_body_bytes: env_or("P3_MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES),
            },
            cors: CorsConfig {
                allowed_origins: std::env::var("CORS_ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| DEFAULT_CORS_ALLOWED_ORIGIN.to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                allow_credentials: env_or("CORS_ALLOW_CREDENTIALS", true),
            },
            content: ContentConfig {
                directory: std::env::var("CONTENT_DIRECTORY")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONTENT_DIRECTORY)),
            },
            sequences: SequenceStoreConfig {
                backend,
                url: std::env::var("SEQUENCE_STORE_URL")
                    .unwrap_or_else(|_| DEFAULT_SEQUENCE_STORE_URL.to_string()),
                lookup_timeout_secs: env_or(
                    "SEQUENCE_LOOKUP_TIMEOUT",
                    DEFAULT_SEQUENCE_LOOKUP_TIMEOUT_SECS,
                ),
                batch_size: env_or("SEQUENCE_BATCH_SIZE", DEFAULT_SEQUENCE_BATCH_SIZE),
                on_lookup_failure,
                max_connections: env_or(
                    "SEQUENCE_DB_MAX_CONNECTIONS",
                    DEFAULT_SEQUENCE_DB_MAX_CONNECTIONS,
                ),
            },
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port must be greater than 0");
        }

        if self.server.max_body_bytes == 0 {
            anyhow::bail!("Server max_body_bytes must be greater than 0");
        }

        if self.sequences.url.trim().is_empty() {
            anyhow::bail!("Sequence store URL cannot be empty");
        }

        if self.sequences.batch_size == 0 {
            anyhow::bail!("Sequence batch size must be greater than 0");
        }

        if self.sequences.lookup_timeout_secs == 0 {
            anyhow::bail!("Sequence lookup timeout must be greater than 0");
        }

        if self.sequences.backend == SequenceBackend::Postgres && self.sequences.max_connections == 0
        {
            anyhow::bail!("Sequence database max_connections must be greater than 0");
        }

        if self.cors.allowed_origins.is_empty() {
            tracing::warn!("No CORS origins configured - all origins will be allowed");
        }

        if !self.content.directory.is_dir() {
            tracing::warn!(
                directory = %self.content.directory.display(),
                "Content directory does not exist - content requests will fall through"
            );
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: DEFAULT_SERVER_HOST.to_string(),
                port: DEFAULT_SERVER_PORT,
                shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
                max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            },
            cors: CorsConfig {
                allowed_origins: vec![DEFAULT_CORS_ALLOWED_ORIGIN.to_string()],
                allow_credentials: true,
            },
            content: ContentConfig {
                directory: PathBuf::from(DEFAULT_CONTENT_DIRECTORY),
            },
            sequences: SequenceStoreConfig {
                backend: SequenceBackend::Http,
                url: DEFAULT_SEQUENCE_STORE_URL.to_string(),
                lookup_timeout_secs: DEFAULT_SEQUENCE_LOOKUP_TIMEOUT_SECS,
                batch_size: DEFAULT_SEQUENCE_BATCH_SIZE,
                on_lookup_failure: LookupFailurePolicy::Skip,
                max_connections: DEFAULT_SEQUENCE_DB_MAX_CONNECTIONS,
            },
        }
    }
}
