//! FASTA export of query results
//!
//! Converts `genome_feature` and `genome_sequence` query results into FASTA
//! text. Genome sequence documents carry their sequence inline; feature
//! documents only carry `na_sequence_md5`, which is resolved through a
//! [`SequenceStore`](crate::sequences::SequenceStore) before formatting.
//!
//! # Structure
//!
//! - `request.rs` - Collections, call methods and result shapes
//! - `dictionary.rs` - Per-request accumulator of resolved sequences
//! - `serializer.rs` - Stream and batch serialization
//! - `routes.rs` - HTTP route definitions

mod dictionary;
mod request;
mod routes;
mod serializer;

pub use dictionary::SequenceDictionary;
pub use request::{
    CallMethod, Collection, QueryEnvelope, QueryResponse, QueryResults, RecordStream,
    SerializeRequest,
};
pub use routes::{fasta_routes, FastaState};
pub use serializer::{
    fasta_response, FastaBody, FastaSerializer, SerializeError, SerializerOptions,
    FASTA_CONTENT_TYPE,
};
