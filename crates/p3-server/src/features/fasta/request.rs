use futures::stream::BoxStream;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use super::SerializeError;

/// Collections the FASTA serializer knows how to format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    /// Feature documents; sequences are resolved by hash
    GenomeFeature,
    /// Genome sequence documents; sequences are inline
    GenomeSequence,
}

impl Collection {
    pub fn as_str(self) -> &'static str {
        match self {
            Collection::GenomeFeature => "genome_feature",
            Collection::GenomeSequence => "genome_sequence",
        }
    }

    /// Suggested filename for downloads
    pub fn download_filename(self) -> String {
        format!("PATRIC_{}.fasta", self.as_str())
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = SerializeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "genome_feature" => Ok(Collection::GenomeFeature),
            "genome_sequence" => Ok(Collection::GenomeSequence),
            other => Err(SerializeError::UnsupportedCollection(other.to_string())),
        }
    }
}

/// How the query results are delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CallMethod {
    /// A lazy cursor, led by one metadata record
    Stream,
    /// A complete result page held in memory
    #[default]
    Query,
}

impl CallMethod {
    /// Anything other than `stream` is a regular query
    pub fn from_param(method: Option<&str>) -> Self {
        match method {
            Some("stream") => CallMethod::Stream,
            _ => CallMethod::Query,
        }
    }
}

/// What to serialize and how to deliver it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerializeRequest {
    pub method: CallMethod,
    pub collection: Collection,
    /// Send the body as an attachment
    pub download: bool,
}

/// Lazy, single-pass stream of result documents
pub type RecordStream = BoxStream<'static, Result<Value, SerializeError>>;

/// Results of a query, as handed to the serializer
pub enum QueryResults {
    /// Streamed cursor; the first item is metadata, not a record
    Stream(RecordStream),
    /// In-memory page of documents with the total hit count
    Documents { docs: Vec<Value>, num_found: usize },
}

impl fmt::Debug for QueryResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryResults::Stream(_) => f.write_str("QueryResults::Stream(..)"),
            QueryResults::Documents { docs, num_found } => f
                .debug_struct("QueryResults::Documents")
                .field("docs", &docs.len())
                .field("num_found", num_found)
                .finish(),
        }
    }
}

/// Search response body: `{"response": {"docs": [...], "numFound": n}}`
#[derive(Debug, Default, Deserialize)]
pub struct QueryEnvelope {
    #[serde(default)]
    pub response: Option<QueryResponse>,
}

#[derive(Debug, Default, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub docs: Vec<Value>,
    #[serde(rename = "numFound")]
    pub num_found: Option<usize>,
}

impl From<QueryEnvelope> for QueryResults {
    fn from(envelope: QueryEnvelope) -> Self {
        let response = envelope.response.unwrap_or_default();
        let num_found = response.num_found.unwrap_or(response.docs.len());
        QueryResults::Documents {
            docs: response.docs,
            num_found,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_collection_round_trip() {
        for collection in [Collection::GenomeFeature, Collection::GenomeSequence] {
            assert_eq!(collection.as_str().parse::<Collection>().unwrap(), collection);
        }
        assert!(matches!(
            "genome".parse::<Collection>(),
            Err(SerializeError::UnsupportedCollection(_))
        ));
    }

    #[test]
    fn test_download_filename() {
        assert_eq!(
            Collection::GenomeFeature.download_filename(),
            "PATRIC_genome_feature.fasta"
        );
        assert_eq!(
            Collection::GenomeSequence.download_filename(),
            "PATRIC_genome_sequence.fasta"
        );
    }

    #[test]
    fn test_call_method_from_param() {
        assert_eq!(CallMethod::from_param(Some("stream")), CallMethod::Stream);
        assert_eq!(CallMethod::from_param(Some("query")), CallMethod::Query);
        assert_eq!(CallMethod::from_param(None), CallMethod::Query);
    }

    #[test]
    fn test_envelope_into_results() {
        let envelope: QueryEnvelope = serde_json::from_value(json!({
            "response": { "numFound": 7, "docs": [{ "accession": "NC_000962" }] }
        }))
        .unwrap();

        match QueryResults::from(envelope) {
            QueryResults::Documents { docs, num_found } => {
                assert_eq!(docs.len(), 1);
                assert_eq!(num_found, 7);
            },
            other => panic!("unexpected results: {other:?}"),
        }
    }

    #[test]
    fn test_envelope_without_response_is_empty() {
        let envelope: QueryEnvelope = serde_json::from_value(json!({})).unwrap();
        match QueryResults::from(envelope) {
            QueryResults::Documents { docs, num_found } => {
                assert!(docs.is_empty());
                assert_eq!(num_found, 0);
            },
            other => panic!("unexpected results: {other:?}"),
        }
    }

    #[test]
    fn test_envelope_missing_count_uses_doc_count() {
        let envelope: QueryEnvelope = serde_json::from_value(json!({
            "response": { "docs": [{}, {}] }
        }))
        .unwrap();
        match QueryResults::from(envelope) {
            QueryResults::Documents { num_found, .. } => assert_eq!(num_found, 2),
            other => panic!("unexpected results: {other:?}"),
        }
    }
}
