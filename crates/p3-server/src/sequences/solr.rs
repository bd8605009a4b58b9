//! HTTP client for a Solr-style `feature_sequence` collection

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

use super::{SequenceStore, SequenceStoreError};

/// Collection holding `{md5, sequence}` documents
const SEQUENCE_COLLECTION: &str = "feature_sequence";

#[derive(Debug, Deserialize)]
struct SelectResponse {
    response: SelectDocs,
}

#[derive(Debug, Deserialize)]
struct SelectDocs {
    #[serde(default)]
    docs: Vec<SequenceDoc>,
}

#[derive(Debug, Deserialize)]
struct SequenceDoc {
    md5: String,
    sequence: String,
}

/// Sequence store backed by an HTTP search service
#[derive(Debug, Clone)]
pub struct HttpSequenceStore {
    client: Client,
    base_url: String,
}

impl HttpSequenceStore {
    /// Create a client for the service rooted at `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SequenceStoreError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn select_url(&self) -> String {
        format!("{}/{}/select", self.base_url, SEQUENCE_COLLECTION)
    }
}

/// Build the `q` parameter matching any of the given hashes.
///
/// Hashes come from result documents, so each one is sent as a quoted phrase.
fn md5_query(hashes: &[String]) -> String {
    let terms: Vec<String> = hashes.iter().map(|hash| quote_term(hash)).collect();
    format!("md5:({})", terms.join(" OR "))
}

fn quote_term(term: &str) -> String {
    let mut quoted = String::with_capacity(term.len() + 2);
    quoted.push('"');
    for c in term.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

#[async_trait]
impl SequenceStore for HttpSequenceStore {
    #[instrument(skip(self, hashes), fields(count = hashes.len()))]
    async fn sequences_by_hash(
        &self,
        hashes: &[String],
    ) -> Result<HashMap<String, String>, SequenceStoreError> {
        if hashes.is_empty() {
            return Ok(HashMap::new());
        }

        let params = [
            ("q", md5_query(hashes)),
            ("fl", "md5,sequence".to_string()),
            ("rows", hashes.len().to_string()),
            ("wt", "json".to_string()),
        ];

        let response = self.client.post(self.select_url()).form(&params).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SequenceStoreError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body: SelectResponse = response.json().await?;
        let found: HashMap<String, String> = body
            .response
            .docs
            .into_iter()
            .map(|doc| (doc.md5, doc.sequence))
            .collect();

        debug!(requested = hashes.len(), found = found.len(), "Resolved sequences");

        Ok(found)
    }

    fn backend_name(&self) -> &'static str {
        "http"
    }
}
