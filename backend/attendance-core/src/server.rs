// src/server.rs
//
// Dashboard HTTP API. The pipeline itself is synchronous; handlers only hold the
// session/source locks for the duration of one pipeline run.
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::aggregation::Report;
use crate::config::Config;
use crate::error::{FilterConfigError, PipelineError};
use crate::export::to_csv_string;
use crate::filter::FilterConfig;
use crate::pipeline;
use crate::record::{AttendanceRecord, Department};
use crate::registry::{add_employee, add_shift, Employee, SessionState, Shift};
use crate::source::RecordSource;

// --- Error Handling ---

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid filter: {0}")]
    InvalidFilter(#[from] FilterConfigError),
    #[error("{0}")]
    Pipeline(#[from] PipelineError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("Error occurred: {}", self); // Log the original error

        let status_code = match &self {
            AppError::InvalidFilter(_) => StatusCode::BAD_REQUEST,
            AppError::Pipeline(PipelineError::InvalidFilterConfig(_))
            | AppError::Pipeline(PipelineError::InvalidRegistryEntry(_)) => StatusCode::BAD_REQUEST,
            AppError::Pipeline(PipelineError::MalformedRecord { .. })
            | AppError::Pipeline(PipelineError::Csv { .. })
            | AppError::Pipeline(PipelineError::Io { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status_code, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

// --- Shared State ---

#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Mutex<SessionState>>,
    pub source: Arc<Mutex<Box<dyn RecordSource + Send>>>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config, session: SessionState, source: Box<dyn RecordSource + Send>) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            source: Arc::new(Mutex::new(source)),
            config: Arc::new(config),
        }
    }
}

// --- Query Parameters ---

#[derive(Debug, Default, Deserialize)]
pub struct FilterQuery {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    /// Comma-separated department labels, e.g. `HR,Sales`.
    pub department: Option<String>,
    pub employee: Option<String>,
    /// Number of records to pull from the source.
    pub count: Option<usize>,
}

impl FilterQuery {
    pub fn to_filter_config(
        &self,
        today: NaiveDate,
        window_days: i64,
    ) -> Result<FilterConfig, FilterConfigError> {
        let mut config = FilterConfig::for_bounds(self.start, self.end, today, window_days)?;

        if let Some(labels) = self.department.as_deref() {
            let departments = labels
                .split(',')
                .filter(|s| !s.is_empty())
                .map(str::parse::<Department>)
                .collect::<Result<Vec<_>, _>>()?;
            config = config.with_departments(departments);
        }
        if let Some(needle) = self.employee.as_deref().filter(|s| !s.is_empty()) {
            config = config.with_employee_substring(needle);
        }
        Ok(config)
    }
}

async fn filtered_records(state: &AppState, query: &FilterQuery) -> Result<Vec<AttendanceRecord>, AppError> {
    let today = Local::now().date_naive();
    let filter_config = query.to_filter_config(today, state.config.default_window_days)?;
    let count = state.config.record_count(query.count)?;

    let session = state.session.lock().await;
    let mut source = state.source.lock().await;
    let output = pipeline::run(&mut **source, &session, count, &filter_config)?;
    Ok(output.filtered)
}

// --- Handlers ---

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn list_records(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> Result<Json<Vec<AttendanceRecord>>, AppError> {
    Ok(Json(filtered_records(&state, &query).await?))
}

async fn get_report(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> Result<Json<Report>, AppError> {
    let records = filtered_records(&state, &query).await?;
    Ok(Json(Report::build(&records)))
}

async fn export_csv(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> Result<Response, AppError> {
    let records = filtered_records(&state, &query).await?;
    let body = to_csv_string(&records)?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"attendance.csv\"",
            ),
        ],
        body,
    )
        .into_response())
}

async fn list_employees(State(state): State<AppState>) -> Json<Vec<Employee>> {
    Json(state.session.lock().await.employees.clone())
}

async fn create_employee(
    State(state): State<AppState>,
    Json(employee): Json<Employee>,
) -> Result<(StatusCode, Json<Employee>), AppError> {
    let mut session = state.session.lock().await;
    *session = add_employee(session.clone(), employee.clone())?;
    Ok((StatusCode::CREATED, Json(employee)))
}

async fn list_shifts(State(state): State<AppState>) -> Json<Vec<Shift>> {
    Json(state.session.lock().await.shifts.clone())
}

async fn create_shift(
    State(state): State<AppState>,
    Json(shift): Json<Shift>,
) -> Result<(StatusCode, Json<Shift>), AppError> {
    let mut session = state.session.lock().await;
    *session = add_shift(session.clone(), shift.clone())?;
    Ok((StatusCode::CREATED, Json(shift)))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/records", get(list_records))
        .route("/api/report", get(get_report))
        .route("/api/export.csv", get(export_csv))
        .route("/api/employees", get(list_employees).post(create_employee))
        .route("/api/shifts", get(list_shifts).post(create_shift))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(state: AppState) -> std::io::Result<()> {
    let addr = state.config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Dashboard API listening on http://{}", addr);
    axum::serve(listener, router(state)).await
}
