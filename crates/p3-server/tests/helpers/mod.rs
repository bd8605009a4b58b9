//! Test helpers for P3 server integration tests

#![allow(dead_code)]

use axum::{body::Body, response::Response, Router};
use bytes::Bytes;
use http_body_util::BodyExt;
use p3_server::{
    api::{create_router, AppState},
    config::Config,
    sequences::MemorySequenceStore,
};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;

/// Default configuration pointed at a content directory
pub fn test_config(content_dir: &Path) -> Config {
    let mut config = Config::default();
    config.content.directory = content_dir.to_path_buf();
    config
}

/// Full application router backed by an in-memory sequence store
pub fn test_app(store: Arc<MemorySequenceStore>, content_dir: &Path) -> Router {
    let config = test_config(content_dir);
    create_router(AppState::new(store, &config), &config)
}

pub async fn body_bytes(response: Response<Body>) -> Bytes {
    response
        .into_body()
        .collect()
        .await
        .expect("failed to read body")
        .to_bytes()
}

pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await.to_vec()).expect("body is not UTF-8")
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).expect("body is not JSON")
}

/// Feature document referencing a sequence by hash
pub fn feature_doc(patric_id: &str, feature_id: &str, product: &str, hash: &str) -> Value {
    json!({
        "patric_id": patric_id,
        "feature_id": feature_id,
        "product": product,
        "na_sequence_md5": hash,
    })
}

/// Genome sequence document with its sequence inline
pub fn genome_doc(accession: &str, description: &str, genome_name: &str, sequence: &str) -> Value {
    json!({
        "accession": accession,
        "description": description,
        "genome_name": genome_name,
        "genome_id": "83332.12",
        "sequence": sequence,
    })
}
