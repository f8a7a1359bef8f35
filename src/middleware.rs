use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;

/// Request ID propagation plus per-request logging.
///
/// Honors an incoming `x-request-id`, otherwise mints one; the id is made
/// available to handlers via extensions and echoed on the response.
pub async fn request_context(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    request.extensions_mut().insert(request_id.clone());

    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = std::time::Instant::now();

    tracing::info!(
        method = %method,
        uri = %uri,
        request_id = %request_id,
        "Request started"
    );

    let mut response = next.run(request).await;
    let duration = start.elapsed();

    tracing::info!(
        method = %method,
        uri = %uri,
        status = %response.status(),
        duration_ms = %duration.as_millis(),
        request_id = %request_id,
        "Request completed"
    );

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert("x-request-id", value);
    }

    response
}
