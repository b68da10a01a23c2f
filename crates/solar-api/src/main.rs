use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use solar_core::{LayoutEngine, LayoutError, LayoutRequest, LayoutResult};
use tower_http::cors::CorsLayer;
use tracing::{error, info};

mod svg;

const OPENAPI_SPEC: &str = include_str!("../../../openapi.yaml");
const SWAGGER_UI_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>Solar Layout API Docs</title>
    <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script>
        window.onload = () => {
            SwaggerUIBundle({
                url: '/openapi.yaml',
                dom_id: '#swagger-ui',
                presets: [SwaggerUIBundle.presets.apis],
                layout: 'BaseLayout',
            });
        };
    </script>
</body>
</html>"#;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting Solar Layout API");

    // Build application
    let app = Router::new()
        .route("/api/health", get(health_check))
        .route("/api/layout", post(layout))
        .route("/api/generate/svg", post(generate_svg))
        .route("/openapi.yaml", get(serve_openapi_spec))
        .route("/docs", get(serve_swagger_ui))
        .layer(CorsLayer::permissive());

    // Start server
    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000")
        .await
        .expect("Failed to bind to port 3000");

    info!("API server listening on http://0.0.0.0:3000");
    info!("Try: curl http://localhost:3000/api/health");

    axum::serve(listener, app).await.expect("Server error");
}

/// Health check endpoint
async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "service": "solar-layout-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Main placement endpoint
async fn layout(Json(request): Json<LayoutRequest>) -> Result<Json<LayoutResult>, AppError> {
    info!(
        "Received layout request: {} segments, {} panels requested, raster: {}",
        request.roof_segments.len(),
        request.requested_panel_count,
        request.flux_raster.is_some()
    );

    let requested = request.requested_panel_count;
    let engine = LayoutEngine::new(request)?;
    let result = engine.layout();

    if result.metrics.panel_count < requested {
        info!(
            "Roof capacity reached: {} of {} requested panels placed",
            result.metrics.panel_count, requested
        );
    }

    info!(
        "Placement complete: {} panels, {:.0} kWh/yr, {:.1}% coverage",
        result.metrics.panel_count,
        result.metrics.annual_energy_kwh,
        result.metrics.roof_coverage_percent
    );

    Ok(Json(result))
}

#[derive(Deserialize)]
struct SvgPayload {
    request: LayoutRequest,
    result: LayoutResult,
}

/// Generate SVG visualization of a computed placement
async fn generate_svg(Json(payload): Json<SvgPayload>) -> Result<Response, AppError> {
    info!(
        "Generating SVG for {} panels on {} segments",
        payload.result.panels.len(),
        payload.request.roof_segments.len()
    );

    let svg = svg::render(&payload.request, &payload.result)?;

    Ok((StatusCode::OK, [("Content-Type", "image/svg+xml")], svg).into_response())
}

/// Application error type
struct AppError(anyhow::Error);

impl From<LayoutError> for AppError {
    fn from(err: LayoutError) -> Self {
        AppError(err.into())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("Request error: {}", self.0);

        let message = self.0.to_string();
        let status = if message.contains("Invalid roof geometry")
            || message.contains("Invalid input")
        {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        (
            status,
            Json(json!({
                "error": message,
            })),
        )
            .into_response()
    }
}

async fn serve_openapi_spec() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("Content-Type", "application/yaml")],
        OPENAPI_SPEC,
    )
}

async fn serve_swagger_ui() -> impl IntoResponse {
    Html(SWAGGER_UI_HTML)
}
