use std::collections::{HashMap, HashSet};

/// Sequences resolved so far for one request, keyed by content hash.
///
/// Filled batch by batch; entries from earlier batches are never dropped.
#[derive(Debug, Default, Clone)]
pub struct SequenceDictionary {
    entries: HashMap<String, String>,
}

impl SequenceDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert every entry of a lookup result, returning how many hashes were new
    pub fn merge(&mut self, batch: HashMap<String, String>) -> usize {
        let mut added = 0;
        for (hash, sequence) in batch {
            if self.entries.insert(hash, sequence).is_none() {
                added += 1;
            }
        }
        added
    }

    pub fn get(&self, hash: &str) -> Option<&str> {
        self.entries.get(hash).map(String::as_str)
    }

    pub fn contains(&self, hash: &str) -> bool {
        self.entries.contains_key(hash)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Hashes not yet resolved, deduplicated, in first-seen order
    pub fn missing<'a, I>(&self, hashes: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut seen = HashSet::new();
        hashes
            .into_iter()
            .filter(|hash| !self.contains(hash) && seen.insert(*hash))
            .map(str::to_string)
            .collect()
    }
}
