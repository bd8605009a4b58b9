//! Query results to FASTA
//!
//! Two delivery modes are supported:
//!
//! - **stream**: records arrive one at a time behind a metadata record. Each
//!   feature is resolved with its own lookup before it is written, so output
//!   order always matches input order.
//! - **query**: a whole page of documents is in memory. Features are resolved
//!   in chunks of `batch_size` with one batched lookup per chunk, and each
//!   chunk is written as soon as it is resolved.
//!
//! A document that cannot be decoded is logged and left out; its neighbours
//! are still written.
//!
//! Bodies are lazy streams: nothing is looked up until the response is polled,
//! and dropping the body (client disconnect) abandons any lookup in flight.

use axum::{
    body::Body,
    http::{header, HeaderValue},
    response::Response,
};
use bytes::Bytes;
use futures::{future, stream, StreamExt};
use p3_common::fasta::{FeatureRecord, GenomeRecord, SequenceRecord};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, warn};

use super::dictionary::SequenceDictionary;
use super::request::{CallMethod, Collection, QueryResults, RecordStream, SerializeRequest};
use crate::config::{
    LookupFailurePolicy, SequenceStoreConfig, DEFAULT_SEQUENCE_BATCH_SIZE,
    DEFAULT_SEQUENCE_LOOKUP_TIMEOUT_SECS,
};
use crate::sequences::{SequenceStore, SequenceStoreError};

/// Media type of serialized responses
pub const FASTA_CONTENT_TYPE: &str = "application/sralign+dna+fasta";

/// Lazily produced FASTA response body
pub type FastaBody = stream::BoxStream<'static, Result<Bytes, SerializeError>>;

#[derive(Error, Debug)]
pub enum SerializeError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unsupported collection: {0}")]
    UnsupportedCollection(String),

    #[error("Failed to read query results: {0}")]
    Source(String),

    #[error("Sequence lookup failed for {count} hash(es): {source}")]
    Lookup {
        count: usize,
        #[source]
        source: SequenceStoreError,
    },
}

/// Tuning for the serializer
#[derive(Debug, Clone)]
pub struct SerializerOptions {
    /// Documents per batched lookup in query mode
    pub batch_size: usize,
    /// Upper bound for a single lookup call
    pub lookup_timeout: Duration,
    pub on_lookup_failure: LookupFailurePolicy,
}

impl Default for SerializerOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_SEQUENCE_BATCH_SIZE,
            lookup_timeout: Duration::from_secs(DEFAULT_SEQUENCE_LOOKUP_TIMEOUT_SECS),
            on_lookup_failure: LookupFailurePolicy::Skip,
        }
    }
}

impl From<&SequenceStoreConfig> for SerializerOptions {
    fn from(config: &SequenceStoreConfig) -> Self {
        Self {
            batch_size: config.batch_size.max(1),
            lookup_timeout: config.lookup_timeout(),
            on_lookup_failure: config.on_lookup_failure,
        }
    }
}

/// Turns query results into FASTA text
#[derive(Clone)]
pub struct FastaSerializer {
    store: Arc<dyn SequenceStore>,
    options: SerializerOptions,
}

impl FastaSerializer {
    pub fn new(store: Arc<dyn SequenceStore>, options: SerializerOptions) -> Self {
        Self { store, options }
    }

    /// Build the FASTA body for `results`.
    ///
    /// Fails up front when a stream was requested but the results carry no
    /// stream. Errors met while the body is produced end the body instead.
    pub fn serialize(
        &self,
        request: &SerializeRequest,
        results: QueryResults,
    ) -> Result<FastaBody, SerializeError> {
        match (request.method, results) {
            (CallMethod::Stream, QueryResults::Stream(records)) => {
                Ok(self.stream_records(request.collection, records))
            },
            (CallMethod::Stream, QueryResults::Documents { .. }) => Err(SerializeError::InvalidInput(
                "expected a record stream for stream serialization".to_string(),
            )),
            (CallMethod::Query, QueryResults::Documents { docs, num_found }) => {
                Ok(self.serialize_documents(request.collection, docs, num_found))
            },
            (CallMethod::Query, QueryResults::Stream(_)) => {
                warn!(
                    collection = %request.collection,
                    "Query serialization received a stream without documents, writing empty body"
                );
                Ok(stream::empty().boxed())
            },
        }
    }

    /// Serialize into a complete HTTP response with FASTA headers
    pub fn into_response(
        &self,
        request: &SerializeRequest,
        results: QueryResults,
    ) -> Result<Response, SerializeError> {
        let body = self.serialize(request, results)?;
        Ok(fasta_response(request, body))
    }

    fn stream_records(&self, collection: Collection, records: RecordStream) -> FastaBody {
        let state = StreamState {
            records: records.skip(1).boxed(),
            collection,
            resolver: self.resolver(),
            exported: 0,
            dropped: 0,
            finished: false,
        };

        stream::unfold(state, |mut state| async move {
            state.next_block().await.map(|block| (block, state))
        })
        .boxed()
    }

    fn serialize_documents(
        &self,
        collection: Collection,
        mut docs: Vec<Value>,
        num_found: usize,
    ) -> FastaBody {
        match collection {
            Collection::GenomeSequence => {
                debug!(count = docs.len(), "Serializing genome sequences");
                stream::iter(docs.into_iter().enumerate())
                    .filter_map(|(index, doc)| {
                        let block = decode_document(doc, index, GenomeRecord::from_document)
                            .map(|record| {
                                Ok::<_, SerializeError>(Bytes::from(
                                    SequenceRecord::from(record).to_fasta(),
                                ))
                            });
                        future::ready(block)
                    })
                    .boxed()
            },
            Collection::GenomeFeature => {
                docs.truncate(num_found);
                let state = BatchState {
                    docs: docs.into_iter(),
                    batch_size: self.options.batch_size.max(1),
                    resolver: self.resolver(),
                    dictionary: SequenceDictionary::new(),
                    exported: 0,
                    dropped: 0,
                    finished: false,
                };

                stream::unfold(state, |mut state| async move {
                    state.next_chunk().await.map(|chunk| (chunk, state))
                })
                .boxed()
            },
        }
    }

    fn resolver(&self) -> Resolver {
        Resolver {
            store: Arc::clone(&self.store),
            timeout: self.options.lookup_timeout,
            on_failure: self.options.on_lookup_failure,
        }
    }
}

/// Attach FASTA headers to a body
pub fn fasta_response(request: &SerializeRequest, body: FastaBody) -> Response {
    let mut response = Response::new(Body::from_stream(body));
    let headers = response.headers_mut();

    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(FASTA_CONTENT_TYPE));

    if request.download {
        let disposition = format!(
            "attachment; filename=\"{}\"",
            request.collection.download_filename()
        );
        if let Ok(value) = HeaderValue::from_str(&disposition) {
            headers.insert(header::CONTENT_DISPOSITION, value);
        }
    }

    response
}

/// Decode one document, logging and dropping it when it is malformed
fn decode_document<T>(
    doc: Value,
    index: usize,
    decode: impl FnOnce(Value) -> p3_common::Result<T>,
) -> Option<T> {
    let id = document_id(&doc);
    match decode(doc) {
        Ok(record) => Some(record),
        Err(err) => {
            warn!(index, id = %id, error = %err, "Dropping malformed document");
            None
        },
    }
}

fn document_id(doc: &Value) -> String {
    ["patric_id", "accession"]
        .iter()
        .find_map(|key| doc.get(key).and_then(Value::as_str))
        .unwrap_or_default()
        .to_string()
}

/// Sequence lookups with timeout and failure policy applied
struct Resolver {
    store: Arc<dyn SequenceStore>,
    timeout: Duration,
    on_failure: LookupFailurePolicy,
}

impl Resolver {
    async fn lookup_one(&self, hash: &str) -> Result<Option<String>, SequenceStoreError> {
        tokio::time::timeout(self.timeout, self.store.sequence_by_hash(hash))
            .await
            .map_err(|_| SequenceStoreError::Timeout(self.timeout))?
    }

    async fn lookup_many(
        &self,
        hashes: &[String],
    ) -> Result<std::collections::HashMap<String, String>, SequenceStoreError> {
        tokio::time::timeout(self.timeout, self.store.sequences_by_hash(hashes))
            .await
            .map_err(|_| SequenceStoreError::Timeout(self.timeout))?
    }

    /// Apply the failure policy: `Ok` means carry on without the records
    fn failed(&self, hashes: &[String], source: SequenceStoreError) -> Result<(), SerializeError> {
        match self.on_failure {
            LookupFailurePolicy::Skip => {
                warn!(
                    hashes = hashes.len(),
                    first = %hashes.first().map(String::as_str).unwrap_or_default(),
                    error = %source,
                    "Sequence lookup failed, dropping records"
                );
                Ok(())
            },
            LookupFailurePolicy::Abort => Err(SerializeError::Lookup {
                count: hashes.len(),
                source,
            }),
        }
    }

    /// Decode and resolve one streamed document, `None` when it is dropped
    async fn resolve_document(
        &self,
        collection: Collection,
        doc: Value,
        index: usize,
    ) -> Result<Option<SequenceRecord>, SerializeError> {
        match collection {
            Collection::GenomeSequence => {
                Ok(decode_document(doc, index, GenomeRecord::from_document).map(Into::into))
            },
            Collection::GenomeFeature => {
                let Some(mut record) = decode_document(doc, index, FeatureRecord::from_document)
                else {
                    return Ok(None);
                };
                if let Some(hash) = record.sequence_hash().map(str::to_string) {
                    match self.lookup_one(&hash).await {
                        Ok(sequence) => record.sequence = sequence,
                        Err(source) => {
                            self.failed(&[hash], source)?;
                            return Ok(None);
                        },
                    }
                }
                Ok(Some(record.into()))
            },
        }
    }
}

struct StreamState {
    records: RecordStream,
    collection: Collection,
    resolver: Resolver,
    exported: usize,
    dropped: usize,
    finished: bool,
}

impl StreamState {
    async fn next_block(&mut self) -> Option<Result<Bytes, SerializeError>> {
        if self.finished {
            return None;
        }

        while let Some(item) = self.records.next().await {
            let index = self.exported + self.dropped;
            let block = match item {
                Ok(doc) => self.resolver.resolve_document(self.collection, doc, index).await,
                Err(err) => Err(err),
            };

            match block {
                Ok(Some(record)) => {
                    self.exported += 1;
                    return Some(Ok(Bytes::from(record.to_fasta())));
                },
                Ok(None) => self.dropped += 1,
                Err(err) => {
                    self.finished = true;
                    error!(exported = self.exported, error = %err, "FASTA stream aborted");
                    return Some(Err(err));
                },
            }
        }

        self.finished = true;
        debug!(
            collection = %self.collection,
            exported = self.exported,
            dropped = self.dropped,
            "Exported documents"
        );
        None
    }
}

struct BatchState {
    docs: std::vec::IntoIter<Value>,
    batch_size: usize,
    resolver: Resolver,
    dictionary: SequenceDictionary,
    exported: usize,
    dropped: usize,
    finished: bool,
}

impl BatchState {
    async fn next_chunk(&mut self) -> Option<Result<Bytes, SerializeError>> {
        if self.finished {
            return None;
        }

        let chunk: Vec<Value> = self.docs.by_ref().take(self.batch_size).collect();
        if chunk.is_empty() {
            self.finished = true;
            debug!(
                exported = self.exported,
                dropped = self.dropped,
                resolved = self.dictionary.len(),
                "Exported documents"
            );
            return None;
        }

        match self.format_chunk(chunk).await {
            Ok(text) => Some(Ok(Bytes::from(text))),
            Err(err) => {
                self.finished = true;
                error!(exported = self.exported, error = %err, "FASTA batch aborted");
                Some(Err(err))
            },
        }
    }

    async fn format_chunk(&mut self, chunk: Vec<Value>) -> Result<String, SerializeError> {
        let offset = self.exported + self.dropped;
        let mut records = Vec::with_capacity(chunk.len());
        for (i, doc) in chunk.into_iter().enumerate() {
            match decode_document(doc, offset + i, FeatureRecord::from_document) {
                Some(record) => records.push(record),
                None => self.dropped += 1,
            }
        }

        let pending = self
            .dictionary
            .missing(records.iter().filter_map(FeatureRecord::sequence_hash));

        let mut lookup_failed = false;
        if !pending.is_empty() {
            match self.resolver.lookup_many(&pending).await {
                Ok(found) => {
                    self.dictionary.merge(found);
                },
                Err(source) => {
                    self.resolver.failed(&pending, source)?;
                    lookup_failed = true;
                },
            }
        }

        let mut text = String::new();
        for mut record in records {
            if let Some(hash) = record.sequence_hash().map(str::to_string) {
                let sequence = self.dictionary.get(&hash).map(str::to_string);
                if sequence.is_none() && lookup_failed && pending.contains(&hash) {
                    self.dropped += 1;
                    continue;
                }
                record.sequence = sequence;
            }
            text.push_str(&SequenceRecord::from(record).to_fasta());
            self.exported += 1;
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequences::MemorySequenceStore;
    use futures::TryStreamExt;
    use serde_json::json;

    fn feature(patric_id: &str, hash: &str) -> Value {
        json!({
            "patric_id": patric_id,
            "feature_id": format!("{}.feature", patric_id),
            "product": "hypothetical protein",
            "na_sequence_md5": hash
        })
    }

    fn batch_state(store: Arc<MemorySequenceStore>, docs: Vec<Value>, batch_size: usize) -> BatchState {
        BatchState {
            docs: docs.into_iter(),
            batch_size,
            resolver: Resolver {
                store,
                timeout: Duration::from_secs(5),
                on_failure: LookupFailurePolicy::Skip,
            },
            dictionary: SequenceDictionary::new(),
            exported: 0,
            dropped: 0,
            finished: false,
        }
    }

    async fn collect(body: FastaBody) -> String {
        let chunks: Vec<Bytes> = body.try_collect().await.unwrap();
        chunks
            .iter()
            .map(|chunk| std::str::from_utf8(chunk).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_batch_dictionary_holds_union_of_batches() {
        let mut store = MemorySequenceStore::new();
        let mut docs = Vec::new();
        for i in 0..1200 {
            let hash = format!("hash{}", i % 700);
            store = store.with_sequence(hash.clone(), format!("SEQ{}", i % 700));
            docs.push(feature(&format!("fig|1.peg.{}", i), &hash));
        }
        let store = Arc::new(store);

        let mut state = batch_state(Arc::clone(&store), docs, 500);
        let mut chunks = 0;
        while let Some(chunk) = state.next_chunk().await {
            chunk.unwrap();
            chunks += 1;
        }

        assert_eq!(chunks, 3);
        assert_eq!(state.dictionary.len(), 700);
        assert_eq!(state.exported, 1200);
        // the third chunk only repeats hashes resolved earlier
        assert_eq!(store.lookup_count(), 2);
    }

    #[tokio::test]
    async fn test_batch_lookups_bounded_by_batch_size() {
        let docs: Vec<Value> = (0..1001)
            .map(|i| feature(&format!("fig|1.peg.{}", i), &format!("h{}", i)))
            .collect();
        let store = Arc::new(MemorySequenceStore::new());

        let mut state = batch_state(Arc::clone(&store), docs, 500);
        while let Some(chunk) = state.next_chunk().await {
            chunk.unwrap();
        }

        let sizes: Vec<usize> = store.requested().iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![500, 500, 1]);
    }

    #[tokio::test]
    async fn test_feature_batch_limited_by_num_found() {
        let store = Arc::new(MemorySequenceStore::new().with_sequence("h1", "AC"));
        let serializer = FastaSerializer::new(Arc::clone(&store) as Arc<dyn SequenceStore>, SerializerOptions::default());
        let request = SerializeRequest {
            method: CallMethod::Query,
            collection: Collection::GenomeFeature,
            download: false,
        };

        let docs = vec![feature("fig|1.peg.1", "h1"), feature("fig|1.peg.2", "h2")];
        let body = serializer
            .serialize(&request, QueryResults::Documents { docs, num_found: 1 })
            .unwrap();

        assert_eq!(
            collect(body).await,
            ">fig|1.peg.1|fig|1.peg.1.feature hypothetical protein\nAC\n"
        );
        assert_eq!(store.requested(), vec![vec!["h1".to_string()]]);
    }

    #[tokio::test]
    async fn test_genome_batch_ignores_num_found() {
        let store = Arc::new(MemorySequenceStore::new());
        let serializer = FastaSerializer::new(store, SerializerOptions::default());
        let request = SerializeRequest {
            method: CallMethod::Query,
            collection: Collection::GenomeSequence,
            download: false,
        };

        let docs = vec![
            json!({ "accession": "A1", "description": "one", "genome_id": "1.1", "sequence": "AC" }),
            json!({ "accession": "A2", "description": "two", "genome_id": "1.1", "sequence": "GT" }),
        ];
        let body = serializer
            .serialize(&request, QueryResults::Documents { docs, num_found: 0 })
            .unwrap();

        assert_eq!(
            collect(body).await,
            ">A1   one   [1.1]\nAC\n>A2   two   [1.1]\nGT\n"
        );
    }

    #[tokio::test]
    async fn test_stream_request_without_stream_is_invalid_input() {
        let store = Arc::new(MemorySequenceStore::new());
        let serializer = FastaSerializer::new(store, SerializerOptions::default());
        let request = SerializeRequest {
            method: CallMethod::Stream,
            collection: Collection::GenomeFeature,
            download: false,
        };

        let result = serializer.serialize(
            &request,
            QueryResults::Documents {
                docs: vec![],
                num_found: 0,
            },
        );
        assert!(matches!(result, Err(SerializeError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_query_request_with_stream_is_empty() {
        let store = Arc::new(MemorySequenceStore::new());
        let serializer = FastaSerializer::new(store, SerializerOptions::default());
        let request = SerializeRequest {
            method: CallMethod::Query,
            collection: Collection::GenomeSequence,
            download: false,
        };
        let records: RecordStream = stream::iter(vec![Ok(json!({}))]).boxed();

        let body = serializer.serialize(&request, QueryResults::Stream(records)).unwrap();
        assert_eq!(collect(body).await, "");
    }

    #[test]
    fn test_download_sets_attachment_header() {
        let request = SerializeRequest {
            method: CallMethod::Query,
            collection: Collection::GenomeFeature,
            download: true,
        };
        let response = fasta_response(&request, stream::empty().boxed());

        assert_eq!(response.headers()[header::CONTENT_TYPE], FASTA_CONTENT_TYPE);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"PATRIC_genome_feature.fasta\""
        );
    }

    #[test]
    fn test_no_download_no_attachment_header() {
        let request = SerializeRequest {
            method: CallMethod::Stream,
            collection: Collection::GenomeSequence,
            download: false,
        };
        let response = fasta_response(&request, stream::empty().boxed());
        assert!(response.headers().get(header::CONTENT_DISPOSITION).is_none());
    }

    #[test]
    fn test_options_from_config() {
        let config = crate::config::Config::default().sequences;
        let options = SerializerOptions::from(&config);
        assert_eq!(options.batch_size, 500);
        assert_eq!(options.lookup_timeout, Duration::from_secs(30));
        assert_eq!(options.on_lookup_failure, LookupFailurePolicy::Skip);
    }
}
