//! # API REST
//!
//! Read-only REST API for the HITH explainability dashboard.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, status codes)
//!
//! All dashboard logic lives in `hith-core`; handlers only translate queries and errors.

#![warn(rust_2018_idioms)]

use axum::{
    extract::{Path as AxumPath, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use hith_core::concept_graph::GraphLayout;
use hith_core::importance::RankedFeature;
use hith_core::rationale::RationaleLine;
use hith_core::{
    DashboardService, DashboardView, ExplainError, HighlightMode, SimilarPatientsPanel, Snippet,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

/// Application state shared by all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: DashboardService,
}

#[derive(Serialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(Serialize, ToSchema)]
pub struct PatientEntry {
    pub id: String,
    pub name: String,
    /// "Eligible" or "Not Eligible"
    pub prediction: String,
}

#[derive(Serialize, ToSchema)]
pub struct ListPatientsRes {
    pub patients: Vec<PatientEntry>,
}

#[derive(Serialize, ToSchema)]
pub struct DashboardRes {
    #[schema(value_type = Object)]
    pub dashboard: DashboardView,
}

#[derive(Serialize, ToSchema)]
pub struct RationaleRes {
    #[schema(value_type = Vec<Object>)]
    pub rationale: Vec<RationaleLine>,
}

#[derive(Serialize, ToSchema)]
pub struct SnippetsRes {
    pub mode: String,
    #[schema(value_type = Vec<Object>)]
    pub snippets: Vec<Snippet>,
}

#[derive(Serialize, ToSchema)]
pub struct ImportanceRes {
    #[schema(value_type = Vec<Object>)]
    pub features: Vec<RankedFeature>,
}

#[derive(Serialize, ToSchema)]
pub struct SimilarRes {
    #[schema(value_type = Object)]
    pub similar: SimilarPatientsPanel,
}

#[derive(Serialize, ToSchema)]
pub struct GraphRes {
    /// `null` when the patient has no concept graph.
    #[schema(value_type = Object, nullable)]
    pub graph: Option<GraphLayout>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ModeQuery {
    pub mode: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TopQuery {
    pub top: Option<usize>,
}

#[derive(OpenApi)]
#[openapi(
    paths(health, list_patients, dashboard, rationale, snippets, importance, similar, graph),
    components(schemas(
        HealthRes,
        PatientEntry,
        ListPatientsRes,
        DashboardRes,
        RationaleRes,
        SnippetsRes,
        ImportanceRes,
        SimilarRes,
        GraphRes,
    ))
)]
pub struct ApiDoc;

/// Build the REST router, including Swagger UI at `/swagger-ui`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/patients", get(list_patients))
        .route("/patients/:id/dashboard", get(dashboard))
        .route("/patients/:id/rationale", get(rationale))
        .route("/patients/:id/snippets", get(snippets))
        .route("/patients/:id/importance", get(importance))
        .route("/patients/:id/similar", get(similar))
        .route("/patients/:id/graph", get(graph))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn error_status(e: ExplainError) -> (StatusCode, &'static str) {
    match e {
        ExplainError::PatientNotFound(key) => {
            tracing::debug!("patient not found: {}", key);
            (StatusCode::NOT_FOUND, "Patient not found")
        }
        ExplainError::UnknownHighlightMode(_) | ExplainError::InvalidInput(_) => {
            (StatusCode::BAD_REQUEST, "Invalid query")
        }
        e => {
            tracing::error!("dashboard error: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
        }
    }
}

fn parse_mode(mode: Option<&str>) -> Result<HighlightMode, (StatusCode, &'static str)> {
    match mode {
        None => Ok(HighlightMode::default()),
        Some(m) => m.parse().map_err(error_status),
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint used for monitoring.
#[axum::debug_handler]
async fn health(State(state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: format!(
            "HITH REST API is alive ({} patients loaded)",
            state.service.dataset().len()
        ),
    })
}

#[utoipa::path(
    get,
    path = "/patients",
    responses(
        (status = 200, description = "Patient picker entries in fixture order", body = ListPatientsRes)
    )
)]
#[axum::debug_handler]
async fn list_patients(State(state): State<AppState>) -> Json<ListPatientsRes> {
    let patients = state
        .service
        .picker()
        .into_iter()
        .map(|p| PatientEntry {
            id: p.id,
            name: p.name,
            prediction: p.eligibility.to_string(),
        })
        .collect();
    Json(ListPatientsRes { patients })
}

#[utoipa::path(
    get,
    path = "/patients/{id}/dashboard",
    params(
        ("id" = String, Path, description = "Patient id or name"),
        ("mode" = Option<String>, Query, description = "Highlight mode: impact (default) or concept")
    ),
    responses(
        (status = 200, description = "Full dashboard for the patient", body = DashboardRes),
        (status = 400, description = "Unknown highlight mode"),
        (status = 404, description = "Patient not found")
    )
)]
/// Compose every dashboard panel for one patient.
///
/// # Errors
/// Returns `404 Not Found` for an unknown patient and `400 Bad Request` for an unknown mode.
#[axum::debug_handler]
async fn dashboard(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
    Query(q): Query<ModeQuery>,
) -> Result<Json<DashboardRes>, (StatusCode, &'static str)> {
    let mode = parse_mode(q.mode.as_deref())?;
    let dashboard = state.service.dashboard(&id, mode).map_err(error_status)?;
    Ok(Json(DashboardRes { dashboard }))
}

#[utoipa::path(
    get,
    path = "/patients/{id}/rationale",
    params(("id" = String, Path, description = "Patient id or name")),
    responses(
        (status = 200, description = "Attributes the prediction rests on, with note anchors", body = RationaleRes),
        (status = 404, description = "Patient not found")
    )
)]
#[axum::debug_handler]
async fn rationale(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<RationaleRes>, (StatusCode, &'static str)> {
    let rationale = state.service.rationale(&id).map_err(error_status)?;
    Ok(Json(RationaleRes { rationale }))
}

#[utoipa::path(
    get,
    path = "/patients/{id}/snippets",
    params(
        ("id" = String, Path, description = "Patient id or name"),
        ("mode" = Option<String>, Query, description = "Highlight mode: impact (default) or concept")
    ),
    responses(
        (status = 200, description = "Highlighted, truncated note excerpts", body = SnippetsRes),
        (status = 400, description = "Unknown highlight mode"),
        (status = 404, description = "Patient not found")
    )
)]
#[axum::debug_handler]
async fn snippets(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
    Query(q): Query<ModeQuery>,
) -> Result<Json<SnippetsRes>, (StatusCode, &'static str)> {
    let mode = parse_mode(q.mode.as_deref())?;
    let snippets = state.service.snippets(&id, mode).map_err(error_status)?;
    Ok(Json(SnippetsRes {
        mode: mode.to_string(),
        snippets,
    }))
}

#[utoipa::path(
    get,
    path = "/patients/{id}/importance",
    params(
        ("id" = String, Path, description = "Patient id or name"),
        ("top" = Option<usize>, Query, description = "Maximum number of features (defaults to HITH_TOP_FEATURES)")
    ),
    responses(
        (status = 200, description = "Features ranked by descending score", body = ImportanceRes),
        (status = 400, description = "Invalid top value"),
        (status = 404, description = "Patient not found")
    )
)]
#[axum::debug_handler]
async fn importance(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
    Query(q): Query<TopQuery>,
) -> Result<Json<ImportanceRes>, (StatusCode, &'static str)> {
    if q.top == Some(0) {
        return Err((StatusCode::BAD_REQUEST, "top must be at least 1"));
    }
    let features = state.service.importance(&id, q.top).map_err(error_status)?;
    Ok(Json(ImportanceRes { features }))
}

#[utoipa::path(
    get,
    path = "/patients/{id}/similar",
    params(("id" = String, Path, description = "Patient id or name")),
    responses(
        (status = 200, description = "Similar past patients or an informational message", body = SimilarRes),
        (status = 404, description = "Patient not found")
    )
)]
#[axum::debug_handler]
async fn similar(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<SimilarRes>, (StatusCode, &'static str)> {
    let similar = state.service.similar(&id).map_err(error_status)?;
    Ok(Json(SimilarRes { similar }))
}

#[utoipa::path(
    get,
    path = "/patients/{id}/graph",
    params(("id" = String, Path, description = "Patient id or name")),
    responses(
        (status = 200, description = "Seeded concept-graph layout", body = GraphRes),
        (status = 404, description = "Patient not found")
    )
)]
#[axum::debug_handler]
async fn graph(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<GraphRes>, (StatusCode, &'static str)> {
    let graph = state.service.graph(&id).map_err(error_status)?;
    Ok(Json(GraphRes { graph }))
}
