//! FASTA records and formatting
//!
//! A FASTA block is a header line prefixed with `>` followed by the sequence
//! wrapped at [`FASTA_LINE_WIDTH`] characters and a trailing newline.
//!
//! Two record kinds are supported:
//!
//! - [`FeatureRecord`]: `>patric_id|feature_id product`
//! - [`GenomeRecord`]: `>accession   description   [genome_name]`

mod format;
mod record;

pub use format::{format_feature_record, format_genome_record, wrap, FASTA_LINE_WIDTH};
pub use record::{FeatureRecord, GenomeRecord, SequenceRecord};
