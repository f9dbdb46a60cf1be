use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{any, get};
use axum::Router;
use tower_http::services::{ServeDir, ServeFile};

use crate::data::registry::AtlasContext;
use crate::server::api::{self, ApiError, SnapshotRequest};

type SharedContext = Arc<AtlasContext>;

/// API routes plus either the bundled map page or a built `frontend/dist`.
pub fn router(context: SharedContext) -> Router {
    let api_routes = Router::new()
        .route("/api/health", get(health))
        .route("/api/snapshot", get(snapshot_get).post(snapshot_post))
        .route("/api/countries", get(countries))
        .route("/api/palettes", get(palettes))
        .route("/api/data/version", get(data_version))
        .route("/api/*rest", any(api_not_found))
        .with_state(context);

    match static_dist_dir() {
        Some(dist) => {
            tracing::info!(target: "camp_atlas::server", dist = %dist.display(), "serving static frontend");
            let spa = ServeDir::new(&dist).fallback(ServeFile::new(dist.join("index.html")));
            api_routes.fallback_service(spa)
        }
        None => api_routes.route("/", get(index)).fallback(not_found),
    }
}

fn static_dist_dir() -> Option<PathBuf> {
    let base = std::env::current_dir().ok()?;
    ["frontend/dist", "dist"]
        .iter()
        .map(|dir| base.join(dir))
        .find(|dir| dir.join("index.html").is_file())
}

async fn index() -> Html<&'static str> {
    Html(include_str!("index.html"))
}

async fn health() -> Response {
    json_result(api::health_payload().map_err(ApiError::Serialize))
}

async fn snapshot_get(
    State(context): State<SharedContext>,
    query: Result<Query<SnapshotRequest>, QueryRejection>,
) -> Response {
    match query {
        Ok(Query(request)) => json_result(api::snapshot_payload(&context, request)),
        Err(rejection) => ApiError::Query(rejection.body_text()).into_response(),
    }
}

async fn snapshot_post(State(context): State<SharedContext>, body: String) -> Response {
    json_result(api::snapshot_body_payload(&context, &body))
}

async fn countries(State(context): State<SharedContext>) -> Response {
    json_result(api::countries_payload(&context).map_err(ApiError::Serialize))
}

async fn palettes(State(context): State<SharedContext>) -> Response {
    json_result(api::palettes_payload(&context).map_err(ApiError::Serialize))
}

async fn data_version(State(context): State<SharedContext>) -> Response {
    json_result(api::data_version_payload(&context).map_err(ApiError::Serialize))
}

async fn api_not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "Route not found")
}

async fn not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "Route not found")
}

fn json_result(result: Result<String, ApiError>) -> Response {
    match result {
        Ok(body) => ([(header::CONTENT_TYPE, "application/json")], body).into_response(),
        Err(err) => err.into_response(),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.is_client_error() {
            tracing::debug!(target: "camp_atlas::server", error = %self, "request rejected");
            error_response(StatusCode::BAD_REQUEST, &self.to_string())
        } else {
            tracing::error!(target: "camp_atlas::server", error = %self, "request failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &self.to_string())
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    let body = format!(
        "{{\n  \"status\": \"error\",\n  \"message\": {}\n}}",
        serde_json::to_string(message).unwrap_or_else(|_| "\"Unknown error\"".to_string())
    );
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}
