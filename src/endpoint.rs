/// HTTP endpoint for flood risk analysis
///
/// Serves the analysis pipeline to the presentation layer. Each request is
/// handed to a worker from a fixed pool and analyzed independently; the
/// analyzer itself is immutable and shared.
///
/// Endpoints:
/// - GET  /health                      - Service health check
/// - GET  /analyze?location={place}    - Analysis result as JSON
/// - POST /analyze  (form: location=…) - Same, for form submissions

use std::io::Read;
use std::sync::Arc;

use serde_json::{Value, json};
use threadpool::ThreadPool;
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};
use tracing::{error, info, warn};

use crate::model::AnalysisError;
use crate::pipeline::FloodAnalyzer;

const MAX_BODY_BYTES: u64 = 16 * 1024;

type JsonResponse = Response<std::io::Cursor<Vec<u8>>>;

// ---------------------------------------------------------------------------
// HTTP Server
// ---------------------------------------------------------------------------

/// Start HTTP endpoint server on the specified port. Blocks forever.
pub fn start_endpoint_server(port: u16, analyzer: Arc<FloodAnalyzer>, workers: usize) -> Result<(), String> {
    let server = Server::http(format!("0.0.0.0:{}", port))
        .map_err(|e| format!("Failed to start HTTP server: {}", e))?;
    let pool = ThreadPool::new(workers.max(1));

    info!(port, workers = workers.max(1), "HTTP endpoint listening");
    info!("   GET  /health");
    info!("   GET  /analyze?location={{place}}");
    info!("   POST /analyze (form: location={{place}})");

    for request in server.incoming_requests() {
        let analyzer = Arc::clone(&analyzer);
        pool.execute(move || handle_request(&analyzer, request));
    }

    Ok(())
}

fn handle_request(analyzer: &FloodAnalyzer, mut request: Request) {
    let method = request.method().clone();
    let url = request.url().to_string();

    let mut body = String::new();
    if method == Method::Post {
        if let Err(e) = request.as_reader().take(MAX_BODY_BYTES).read_to_string(&mut body) {
            warn!(%url, error = %e, "Could not read request body");
        }
    }

    let (status, json) = route(analyzer, &method, &url, &body);
    info!(%method, %url, status, "Request handled");

    if let Err(e) = request.respond(create_response(status, json)) {
        error!(error = %e, "Failed to send response");
    }
}

/// Dispatches one request to a handler, returning status and JSON body.
pub fn route(analyzer: &FloodAnalyzer, method: &Method, url: &str, body: &str) -> (u16, Value) {
    let (path, query) = url.split_once('?').unwrap_or((url, ""));

    match (method, path) {
        (Method::Get, "/health") => handle_health(),
        (Method::Get, "/analyze") => handle_analyze(analyzer, form_value(query, "location")),
        (Method::Post, "/analyze") => handle_analyze(analyzer, form_value(body, "location")),
        (_, "/health") | (_, "/analyze") => (
            405,
            json!({ "error": format!("Method {} not allowed", method) }),
        ),
        _ => (
            404,
            json!({
                "error": "Not found",
                "available_endpoints": ["/health", "/analyze?location={place}"]
            }),
        ),
    }
}

/// Handle /health endpoint
fn handle_health() -> (u16, Value) {
    (
        200,
        json!({
            "status": "ok",
            "service": "florisk_service",
            "version": env!("CARGO_PKG_VERSION")
        }),
    )
}

/// Handle /analyze endpoint
fn handle_analyze(analyzer: &FloodAnalyzer, location: Option<String>) -> (u16, Value) {
    let location = match location {
        Some(l) if !l.trim().is_empty() => l,
        _ => return (400, json!({ "error": "location is required" })),
    };

    match analyzer.analyze(&location) {
        Ok(result) => match serde_json::to_value(&result) {
            Ok(value) => (200, value),
            Err(e) => {
                error!(error = %e, "Could not serialize analysis result");
                (500, json!({ "error": "internal error" }))
            }
        },
        Err(e) => {
            let status = match e {
                AnalysisError::LocationNotFound(_) => 404,
                AnalysisError::GeocodingFailed(_) | AnalysisError::TelemetryFetchFailed(_) => 502,
            };
            (status, json!({ "error": e.user_message(), "location": location }))
        }
    }
}

/// First value for `key` in an `application/x-www-form-urlencoded` string.
pub fn form_value(encoded: &str, key: &str) -> Option<String> {
    encoded
        .split('&')
        .filter_map(|pair| pair.split_once('=').or(Some((pair, ""))))
        .find(|(k, _)| *k == key)
        .and_then(|(_, v)| urlencoding::decode(&v.replace('+', " ")).ok().map(|v| v.into_owned()))
}

/// Create HTTP response with JSON body
fn create_response(status_code: u16, json: Value) -> JsonResponse {
    let body = serde_json::to_string_pretty(&json).unwrap_or_else(|_| json.to_string());
    let response = Response::from_data(body.into_bytes()).with_status_code(StatusCode::from(status_code));

    match Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]) {
        Ok(header) => response.with_header(header),
        Err(_) => response,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
