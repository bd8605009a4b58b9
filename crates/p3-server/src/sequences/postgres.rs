//! PostgreSQL-backed sequence store
//!
//! Expects a table of the form:
//!
//! ```sql
//! CREATE TABLE feature_sequence (
//!     md5      TEXT PRIMARY KEY,
//!     sequence TEXT NOT NULL
//! );
//! ```

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

use super::{SequenceStore, SequenceStoreError};

const SELECT_SEQUENCES: &str =
    "SELECT md5, sequence FROM feature_sequence WHERE md5 = ANY($1)";

/// Sequence store reading from a `feature_sequence` table
#[derive(Debug, Clone)]
pub struct PgSequenceStore {
    pool: PgPool,
}

impl PgSequenceStore {
    /// Wrap an existing connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a connection pool to `url`
    pub async fn connect(
        url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, SequenceStoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(url)
            .await?;

        tracing::info!(max_connections, "Sequence database connection pool created");

        Ok(Self::new(pool))
    }
}

#[async_trait]
impl SequenceStore for PgSequenceStore {
    #[instrument(skip(self, hashes), fields(count = hashes.len()))]
    async fn sequences_by_hash(
        &self,
        hashes: &[String],
    ) -> Result<HashMap<String, String>, SequenceStoreError> {
        if hashes.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(String, String)> = sqlx::query_as(SELECT_SEQUENCES)
            .bind(hashes)
            .fetch_all(&self.pool)
            .await?;

        debug!(requested = hashes.len(), found = rows.len(), "Resolved sequences");

        Ok(rows.into_iter().collect())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
