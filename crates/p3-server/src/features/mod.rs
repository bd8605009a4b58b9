//! Feature modules implementing the P3 API
//!
//! Each feature is a vertical slice with its own types and routes.
//!
//! # Features
//!
//! - **fasta**: FASTA export of `genome_feature` and `genome_sequence` query results
//! - **content**: Static files served from the content directory

pub mod content;
pub mod fasta;

use axum::Router;

/// Shared state for the API feature routes
#[derive(Clone)]
pub struct FeatureState {
    pub fasta: fasta::FastaState,
}

/// Creates the API router with all feature routes mounted
///
/// - `/fasta/{collection}` - FASTA serialization
pub fn router(state: FeatureState) -> Router<()> {
    Router::new().nest("/fasta", fasta::fasta_routes().with_state(state.fasta))
}
