//! P3 Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, formatting, and error handling for the P3 API workspace.
//!
//! # Overview
//!
//! - **Error Handling**: Custom error types and result types
//! - **FASTA**: Record types for genome features and genome sequences, and the
//!   pure formatters that turn them into FASTA text
//! - **Checksums**: Content hashes used to key sequence text
//! - **Logging**: Centralized `tracing` subscriber setup
//!
//! # Example
//!
//! ```
//! use p3_common::fasta::{format_feature_record, FeatureRecord};
//!
//! let record = FeatureRecord {
//!     patric_id: Some("fig|83332.12.peg.1".to_string()),
//!     feature_id: Some("RefSeq.83332.12.NC_000962.CDS.1.1524.fwd".to_string()),
//!     product: Some("Chromosomal replication initiator protein DnaA".to_string()),
//!     sequence: Some("ATGACCGATGACCCCGGTTCAGGC".to_string()),
//!     ..Default::default()
//! };
//!
//! let fasta = format_feature_record(&record);
//! assert!(fasta.starts_with(">fig|83332.12.peg.1|RefSeq"));
//! ```

pub mod checksum;
pub mod error;
pub mod fasta;
pub mod logging;

// Re-export commonly used types
pub use error::{P3Error, Result};
