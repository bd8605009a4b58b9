//! Sequence store clients
//!
//! Feature documents only carry the MD5 of their nucleotide sequence
//! (`na_sequence_md5`); the text itself lives in a separate store. This module
//! defines the lookup contract and its backends:
//!
//! - [`HttpSequenceStore`]: Solr-style `feature_sequence` collection
//! - [`PgSequenceStore`]: `feature_sequence` table in PostgreSQL
//! - [`MemorySequenceStore`]: in-process map for tests and local runs
//!
//! Unknown hashes are omitted from lookup results rather than reported as
//! errors; callers treat a missing entry as "no sequence".

mod memory;
mod postgres;
mod solr;

pub use memory::MemorySequenceStore;
pub use postgres::PgSequenceStore;
pub use solr::HttpSequenceStore;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::{SequenceBackend, SequenceStoreConfig};

/// Sequence lookup errors
#[derive(Error, Debug)]
pub enum SequenceStoreError {
    /// Transport-level failure talking to the sequence service
    #[error("Sequence service request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Sequence service answered with a non-success status
    #[error("Sequence service returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Sequence database query failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Sequence lookup timed out after {0:?}")]
    Timeout(Duration),

    #[error("Sequence store unavailable: {0}")]
    Unavailable(String),
}

/// Lookup of nucleotide sequence text by content hash
#[async_trait]
pub trait SequenceStore: Send + Sync {
    /// Resolve a set of hashes in one request.
    ///
    /// The returned map only contains the hashes the store knows about.
    async fn sequences_by_hash(
        &self,
        hashes: &[String],
    ) -> Result<HashMap<String, String>, SequenceStoreError>;

    /// Resolve a single hash
    async fn sequence_by_hash(&self, hash: &str) -> Result<Option<String>, SequenceStoreError> {
        let mut found = self.sequences_by_hash(&[hash.to_string()]).await?;
        Ok(found.remove(hash))
    }

    /// Short name used in logs
    fn backend_name(&self) -> &'static str;
}

/// Build the configured sequence store
pub async fn connect(config: &SequenceStoreConfig) -> anyhow::Result<Arc<dyn SequenceStore>> {
    let store: Arc<dyn SequenceStore> = match config.backend {
        SequenceBackend::Http => {
            Arc::new(HttpSequenceStore::new(&config.url, config.lookup_timeout())?)
        },
        SequenceBackend::Postgres => Arc::new(
            PgSequenceStore::connect(&config.url, config.max_connections, config.lookup_timeout())
                .await?,
        ),
    };

    tracing::info!(backend = store.backend_name(), "Sequence store initialized");

    Ok(store)
}
