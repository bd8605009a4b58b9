use crate::error::AppError;
use axum::{
    body::Body,
    extract::{Path, Request, State},
    middleware::{self, Next},
    response::Response,
    routing::get,
    Router,
};
use tower::ServiceExt;
use tower_http::services::ServeFile;

use super::resolve::ContentRoot;

/// Static content under `/*path`.
///
/// Existing files are answered by [`serve_content`]; everything else reaches
/// [`content_miss`].
pub fn content_routes(root: ContentRoot) -> Router {
    Router::new()
        .route("/*path", get(content_miss))
        .route_layer(middleware::from_fn_with_state(root, serve_content))
}

/// Serve the file named by the path remainder, or pass the request on.
///
/// The remainder arrives percent-decoded from the router. Streaming, content
/// type and range requests are left to [`ServeFile`].
pub async fn serve_content(
    State(root): State<ContentRoot>,
    path: Option<Path<String>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(Path(remainder)) = path else {
        return next.run(request).await;
    };

    let Some(file) = root.resolve(&remainder).await else {
        tracing::debug!(path = %remainder, "Content miss");
        return next.run(request).await;
    };

    tracing::debug!(path = %remainder, file = %file.display(), "Serving content");

    match ServeFile::new(file).oneshot(request).await {
        Ok(response) => response.map(Body::new),
        Err(never) => match never {},
    }
}

async fn content_miss() -> AppError {
    AppError::NotFound("Content not found".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, StatusCode};
    use http_body_util::BodyExt;
    use tempfile::TempDir;

    fn app(dir: &TempDir) -> Router {
        content_routes(ContentRoot::new(dir.path()))
    }

    #[tokio::test]
    async fn test_existing_file_served() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("style.css"), "body { color: red; }").unwrap();

        let response = app(&dir)
            .oneshot(Request::get("/style.css").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/css");
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"body { color: red; }");
    }

    #[tokio::test]
    async fn test_missing_file_reaches_next_handler() {
        let dir = TempDir::new().unwrap();

        let response = app(&dir)
            .oneshot(Request::get("/missing.html").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_percent_encoded_name_decoded() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("read me.txt"), "hello").unwrap();

        let response = app(&dir)
            .oneshot(Request::get("/read%20me.txt").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
