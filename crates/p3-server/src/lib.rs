//! P3 API Server Library
//!
//! HTTP server exporting bioinformatics query results as FASTA and serving
//! static content.
//!
//! # Overview
//!
//! - **FASTA export**: `genome_feature` and `genome_sequence` results become
//!   FASTA text, delivered either record by record from a stream or in
//!   batches from an in-memory result page
//! - **Sequence stores**: feature sequences are resolved by MD5 through an
//!   HTTP search service or PostgreSQL
//! - **Static content**: files under the content directory, with misses
//!   handed to the next handler
//! - **Configuration**: Environment-based configuration management
//! - **Middleware**: CORS and request logging
//!
//! # Example
//!
//! ```no_run
//! use p3_server::{api, config::Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     api::serve(config).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod features;
pub mod middleware;
pub mod sequences;

// Re-export commonly used types
pub use error::{AppError, AppResult};
