//! In-process sequence store

use async_trait::async_trait;
use p3_common::checksum::sequence_md5;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::{SequenceStore, SequenceStoreError};

/// Sequence store holding its entries in memory.
///
/// Records every lookup it serves, and can be told to fail or stall on
/// particular hashes.
#[derive(Debug, Default)]
pub struct MemorySequenceStore {
    sequences: HashMap<String, String>,
    failing: HashSet<String>,
    delay: Option<Duration>,
    lookups: AtomicUsize,
    requested: Mutex<Vec<Vec<String>>>,
}

impl MemorySequenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store sequences keyed by their MD5
    pub fn from_sequences<I, S>(sequences: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut store = Self::new();
        for sequence in sequences {
            let sequence = sequence.into();
            store.sequences.insert(sequence_md5(&sequence), sequence);
        }
        store
    }

    /// Add a sequence under an explicit hash
    pub fn with_sequence(mut self, hash: impl Into<String>, sequence: impl Into<String>) -> Self {
        self.sequences.insert(hash.into(), sequence.into());
        self
    }

    /// Fail any lookup that includes `hash`
    pub fn failing_on(mut self, hash: impl Into<String>) -> Self {
        self.failing.insert(hash.into());
        self
    }

    /// Sleep before answering each lookup
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of lookups served so far
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    /// Hashes requested by each lookup, in call order
    pub fn requested(&self) -> Vec<Vec<String>> {
        self.requested
            .lock()
            .map(|requested| requested.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl SequenceStore for MemorySequenceStore {
    async fn sequences_by_hash(
        &self,
        hashes: &[String],
    ) -> Result<HashMap<String, String>, SequenceStoreError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requested) = self.requested.lock() {
            requested.push(hashes.to_vec());
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(hash) = hashes.iter().find(|hash| self.failing.contains(*hash)) {
            return Err(SequenceStoreError::Unavailable(format!(
                "lookup of {} rejected",
                hash
            )));
        }

        Ok(hashes
            .iter()
            .filter_map(|hash| {
                self.sequences
                    .get(hash)
                    .map(|sequence| (hash.clone(), sequence.clone()))
            })
            .collect())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_from_sequences_keys_by_md5() {
        let store = MemorySequenceStore::from_sequences(["hello world"]);
        let found = store
            .sequence_by_hash("5eb63bbbe01eeed093cb22bb8f5acdc3")
            .await
            .unwrap();
        assert_eq!(found.as_deref(), Some("hello world"));
    }

    #[tokio::test]
    async fn test_unknown_hashes_are_omitted() {
        let store = MemorySequenceStore::new().with_sequence("h1", "ACGT");
        let found = store
            .sequences_by_hash(&["h1".to_string(), "h9".to_string()])
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(store.lookup_count(), 1);
        assert_eq!(store.requested(), vec![vec!["h1".to_string(), "h9".to_string()]]);
    }

    #[tokio::test]
    async fn test_failing_hash() {
        let store = MemorySequenceStore::new()
            .with_sequence("h1", "ACGT")
            .failing_on("bad");
        assert!(store.sequence_by_hash("h1").await.is_ok());
        assert!(matches!(
            store.sequence_by_hash("bad").await,
            Err(SequenceStoreError::Unavailable(_))
        ));
    }
}
