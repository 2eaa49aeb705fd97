mod config;
mod http;
mod inventory;
mod leads;
mod metrics;
mod sheets;
mod vin;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use inventory::{Vehicle, provider::VehicleProvider};
use leads::{LeadMailer, LeadRequest, LeadResponse, PrequalRequest, PrequalResponse};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::{net::SocketAddr, sync::Arc};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use vin::{VinClient, VinError};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        error!(target = "lotline.api", "server crashed: {err}");
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenvy::dotenv().ok();
    init_tracing();

    let provider = Arc::new(VehicleProvider::from_env());
    let mailer = LeadMailer::from_env();
    if mailer.is_none() {
        warn!(
            target = "lotline.leads",
            "mail relay env not fully set; lead submissions will be rejected"
        );
    }
    let openapi: serde_json::Value = serde_yaml::from_str(include_str!("../docs/openapi.yaml"))
        .unwrap_or(serde_json::json!({"openapi":"3.0.3"}));
    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("prom recorder");

    let state = AppState {
        provider,
        mailer,
        vin: VinClient::new(),
        openapi: Arc::new(openapi),
        prometheus_handle,
    };

    let cors = CorsLayer::new()
        .allow_headers(Any)
        .allow_methods(Any)
        .allow_origin(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics_endpoint))
        .route("/openapi.json", get(openapi_json))
        .route("/docs", get(swagger_ui))
        .route("/inventory", get(list_inventory))
        .route("/inventory/compare", get(compare_inventory))
        .route("/inventory/{id}", get(get_vehicle))
        .route("/leads", post(submit_lead))
        .route("/prequalify", post(prequalify))
        .route("/vin/{vin}", get(decode_vin))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::extract::DefaultBodyLimit::max(body_limit_from_env()));

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(8000);
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    info!(target = "lotline.api", "listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

#[derive(Clone)]
struct AppState {
    provider: Arc<VehicleProvider>,
    mailer: Option<LeadMailer>,
    vin: VinClient,
    openapi: Arc<serde_json::Value>,
    prometheus_handle: PrometheusHandle,
}

#[derive(Debug, Serialize)]
struct ApiError {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

#[derive(Debug)]
enum AppError {
    NotFound(String),
    Vin(VinError),
}

impl From<VinError> for AppError {
    fn from(value: VinError) -> Self {
        Self::Vin(value)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, payload) = match self {
            AppError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                ApiError {
                    error: "not_found".to_string(),
                    detail: Some(what),
                },
            ),
            AppError::Vin(err) => {
                let status = match err {
                    VinError::InvalidVin => StatusCode::BAD_REQUEST,
                    VinError::Empty => StatusCode::NOT_FOUND,
                    VinError::Upstream(_) => StatusCode::BAD_GATEWAY,
                };
                (
                    status,
                    ApiError {
                        error: "vin_decode".to_string(),
                        detail: Some(err.to_string()),
                    },
                )
            }
        };
        (status, Json(payload)).into_response()
    }
}

/// Health and readiness check.
///
/// - Method: `GET`
/// - Path: `/health`
async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "lotline-api-rs",
    }))
}

async fn openapi_json(State(state): State<AppState>, headers: axum::http::HeaderMap) -> Response {
    if let Ok(key) = std::env::var("OPENAPI_KEY") {
        let presented = headers
            .get("X-Docs-Key")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if presented != key {
            return (
                StatusCode::UNAUTHORIZED,
                Json(ApiError {
                    error: "unauthorized".to_string(),
                    detail: None,
                }),
            )
                .into_response();
        }
    }
    Json((*state.openapi).clone()).into_response()
}

async fn swagger_ui() -> axum::http::Response<String> {
    let html = r#"<!doctype html>
<html>
<head>
  <meta charset='utf-8'/>
  <title>Lotline API Docs</title>
  <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
  <script>
    window.onload = () => {
      window.ui = SwaggerUIBundle({ url: '/openapi.json', dom_id: '#swagger-ui' });
    };
  </script>
</body>
</html>"#;
    axum::http::Response::builder()
        .header("Content-Type", "text/html; charset=utf-8")
        .body(html.to_string())
        .unwrap()
}

async fn metrics_endpoint(
    State(state): State<AppState>,
    headers: axum::http::HeaderMap,
) -> axum::http::Response<String> {
    if let Ok(secret) = std::env::var("METRICS_KEY") {
        let presented = headers
            .get("X-Metrics-Key")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if presented != secret {
            return axum::http::Response::builder()
                .status(StatusCode::UNAUTHORIZED)
                .body("unauthorized".into())
                .unwrap();
        }
    }
    let body = state.prometheus_handle.render();
    axum::http::Response::builder()
        .header("Content-Type", "text/plain; version=0.0.4")
        .body(body)
        .unwrap()
}

fn body_limit_from_env() -> usize {
    std::env::var("REQUEST_MAX_BYTES")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(256 * 1024)
}

/// Full catalog from the active provider.
///
/// An ingestion failure upstream surfaces here as an empty list, which is a
/// legitimate "no vehicles available" state, not an error.
async fn list_inventory(State(state): State<AppState>) -> Json<Vec<Vehicle>> {
    crate::metrics::inc_requests("/inventory");
    let vehicles = state.provider.vehicles().await;
    Json(vehicles.as_ref().clone())
}

async fn get_vehicle(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vehicle>, AppError> {
    crate::metrics::inc_requests("/inventory/{id}");
    let vehicles = state.provider.vehicles().await;
    vehicles
        .iter()
        .find(|vehicle| vehicle.id == id)
        .cloned()
        .map(Json)
        .ok_or(AppError::NotFound(id))
}

#[derive(Debug, Deserialize)]
struct CompareParams {
    #[serde(default)]
    ids: String,
}

/// Comparison view: `?ids=a,b,c` in requested order; unknown ids are skipped
/// rather than failing the whole comparison.
async fn compare_inventory(
    State(state): State<AppState>,
    Query(params): Query<CompareParams>,
) -> Json<Vec<Vehicle>> {
    crate::metrics::inc_requests("/inventory/compare");
    let vehicles = state.provider.vehicles().await;
    let selected = parse_ids(&params.ids)
        .into_iter()
        .filter_map(|id| vehicles.iter().find(|vehicle| vehicle.id == id).cloned())
        .collect();
    Json(selected)
}

fn parse_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

/// Lead-capture relay. The response contract is `{ok, msg?}` on every path;
/// relay failures are reported there, never as a bare 500.
async fn submit_lead(
    State(state): State<AppState>,
    Json(payload): Json<LeadRequest>,
) -> (StatusCode, Json<LeadResponse>) {
    crate::metrics::inc_requests("/leads");

    if let Err(err) = leads::validate(&payload) {
        return (
            StatusCode::BAD_REQUEST,
            Json(LeadResponse {
                ok: false,
                msg: Some(err.to_string()),
            }),
        );
    }

    let Some(mailer) = &state.mailer else {
        let err = leads::LeadError::NotConfigured;
        warn!(
            target = "lotline.leads",
            kind = payload.kind.label(),
            error = %err,
            "lead dropped"
        );
        crate::metrics::lead_relayed(payload.kind.label(), false);
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(LeadResponse {
                ok: false,
                msg: Some(err.to_string()),
            }),
        );
    };

    match mailer.relay(&payload).await {
        Ok(reference) => {
            crate::metrics::lead_relayed(payload.kind.label(), true);
            (
                StatusCode::OK,
                Json(LeadResponse {
                    ok: true,
                    msg: Some(reference),
                }),
            )
        }
        Err(err) => {
            warn!(target = "lotline.leads", error = %err, "lead relay failed");
            crate::metrics::lead_relayed(payload.kind.label(), false);
            (
                StatusCode::BAD_GATEWAY,
                Json(LeadResponse {
                    ok: false,
                    msg: Some(err.to_string()),
                }),
            )
        }
    }
}

async fn prequalify(Json(payload): Json<PrequalRequest>) -> (StatusCode, Json<PrequalResponse>) {
    crate::metrics::inc_requests("/prequalify");
    if leads::validate_prequal(&payload).is_err() {
        return (StatusCode::BAD_REQUEST, Json(PrequalResponse { ok: false }));
    }
    leads::record_prequal(&payload);
    (StatusCode::OK, Json(PrequalResponse { ok: true }))
}

async fn decode_vin(
    State(state): State<AppState>,
    Path(vin): Path<String>,
) -> Result<Json<vin::VinDecoded>, AppError> {
    crate::metrics::inc_requests("/vin/{vin}");
    let decoded = state.vin.decode(&vin).await?;
    Ok(Json(decoded))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));
    let _ = fmt().with_env_filter(filter).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compare_ids_are_trimmed_and_emptied() {
        assert_eq!(parse_ids("a, b ,,c"), vec!["a", "b", "c"]);
        assert!(parse_ids("").is_empty());
        assert!(parse_ids(" , ").is_empty());
    }
}
