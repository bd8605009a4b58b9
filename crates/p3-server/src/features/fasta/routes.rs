use crate::error::{AppError, AppResult};
use axum::{
    body::Body,
    extract::{Path, Query, State},
    response::Response,
    routing::post,
    Router,
};
use futures::{StreamExt, TryStreamExt};
use serde::Deserialize;
use serde_json::Value;
use tokio_util::codec::{FramedRead, LinesCodec};
use tokio_util::io::StreamReader;

use super::request::{
    CallMethod, Collection, QueryEnvelope, QueryResults, RecordStream, SerializeRequest,
};
use super::serializer::{FastaSerializer, SerializeError};

/// State for the FASTA routes
#[derive(Clone)]
pub struct FastaState {
    pub serializer: FastaSerializer,
    /// Upper bound on buffered request bodies and on a single NDJSON line
    pub max_body_bytes: usize,
}

pub fn fasta_routes() -> Router<FastaState> {
    Router::new().route("/:collection", post(serialize_results))
}

#[derive(Debug, Default, Deserialize)]
struct FastaParams {
    method: Option<String>,
    #[serde(default)]
    download: bool,
}

#[tracing::instrument(skip(state, params, body), fields(collection = %collection, method = ?params.method))]
async fn serialize_results(
    State(state): State<FastaState>,
    Path(collection): Path<String>,
    Query(params): Query<FastaParams>,
    body: Body,
) -> AppResult<Response> {
    let request = SerializeRequest {
        method: CallMethod::from_param(params.method.as_deref()),
        collection: collection.parse::<Collection>()?,
        download: params.download,
    };

    let results = match request.method {
        CallMethod::Stream => QueryResults::Stream(ndjson_records(body, state.max_body_bytes)),
        CallMethod::Query => read_envelope(body, state.max_body_bytes).await?.into(),
    };

    tracing::debug!(?results, download = request.download, "Serializing query results");

    Ok(state.serializer.into_response(&request, results)?)
}

/// One JSON value per non-empty line, read lazily from the request body
fn ndjson_records(body: Body, max_line_bytes: usize) -> RecordStream {
    let reader = StreamReader::new(body.into_data_stream().map_err(std::io::Error::other));

    FramedRead::new(reader, LinesCodec::new_with_max_length(max_line_bytes))
        .filter_map(|line| async move {
            match line {
                Ok(line) if line.trim().is_empty() => None,
                Ok(line) => Some(
                    serde_json::from_str::<Value>(&line)
                        .map_err(|e| SerializeError::Source(format!("invalid record line: {}", e))),
                ),
                Err(e) => Some(Err(SerializeError::Source(e.to_string()))),
            }
        })
        .boxed()
}

async fn read_envelope(body: Body, limit: usize) -> AppResult<QueryEnvelope> {
    let bytes = axum::body::to_bytes(body, limit)
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read request body: {}", e)))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| AppError::BadRequest(format!("Invalid query results: {}", e)))
}
