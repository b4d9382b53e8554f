//! HTTP request handlers for the sick-leave API.
//!
//! This module contains the handler functions for all API endpoints.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::EngineError;
use crate::models::{ReportQuery, SickLeaveQuery};
use crate::report::leave_summary;

use super::request::{
    CancelRequest, CollectionRequest, CreateExtensionRequest, CreateSickLeaveRequest,
    DashboardQuery, DocumentRequest, NoteRequest, TranscriptionRequest,
};
use super::response::{ApiError, ApiErrorResponse, SickLeaveDetailView, TrackingEntryView};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/sick-leaves", post(create_sick_leave).get(list_sick_leaves))
        .route("/sick-leaves/:id", get(get_sick_leave))
        .route("/sick-leaves/:id/extensions", post(create_extension))
        .route("/sick-leaves/:id/transcription", post(register_transcription))
        .route("/sick-leaves/:id/collection", post(register_collection))
        .route("/sick-leaves/:id/cancel", post(cancel_sick_leave))
        .route("/sick-leaves/:id/notes", post(add_note))
        .route("/sick-leaves/:id/documents", post(attach_document))
        .route("/sick-leaves/:id/tracking", get(get_tracking))
        .route("/employees/:id/sick-leaves", get(list_employee_sick_leaves))
        .route("/reports/reimbursement", get(reimbursement_report))
        .route("/dashboard", get(dashboard))
        .with_state(state)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn engine_error_response(correlation_id: Uuid, err: EngineError) -> Response {
    warn!(correlation_id = %correlation_id, error = %err, "Request failed");
    let api_error: ApiErrorResponse = err.into();
    json_response(api_error.status, api_error.error)
}

fn bad_request(error: ApiError) -> Response {
    json_response(StatusCode::BAD_REQUEST, error)
}

/// Unwraps a JSON body, turning extractor rejections into API errors.
fn parse_body<T>(
    correlation_id: Uuid,
    payload: Result<Json<T>, JsonRejection>,
) -> Result<T, Response> {
    let rejection = match payload {
        Ok(Json(body)) => return Ok(body),
        Err(rejection) => rejection,
    };

    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            // The body text carries serde's message, including the field name
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    Err(bad_request(error))
}

fn parse_query<T>(
    correlation_id: Uuid,
    query: Result<Query<T>, QueryRejection>,
) -> Result<T, Response> {
    query.map(|Query(params)| params).map_err(|rejection| {
        warn!(
            correlation_id = %correlation_id,
            error = %rejection.body_text(),
            "Invalid query string"
        );
        bad_request(ApiError::validation_error(rejection.body_text()))
    })
}

fn parse_id(correlation_id: Uuid, raw: &str) -> Result<Uuid, Response> {
    Uuid::parse_str(raw).map_err(|err| {
        warn!(correlation_id = %correlation_id, id = %raw, "Invalid record id");
        bad_request(ApiError::with_details(
            "VALIDATION_ERROR",
            format!("'{}' is not a valid record id", raw),
            err.to_string(),
        ))
    })
}

/// Handler for POST /sick-leaves.
async fn create_sick_leave(
    State(state): State<AppState>,
    payload: Result<Json<CreateSickLeaveRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing sick leave registration");

    let request = match parse_body(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    match state
        .engine()
        .create(request.sick_leave, &request.performed_by)
    {
        Ok(registered) => {
            info!(
                correlation_id = %correlation_id,
                record_number = %registered.record.record_number,
                "Sick leave registered"
            );
            json_response(StatusCode::CREATED, registered)
        }
        Err(err) => engine_error_response(correlation_id, err),
    }
}

/// Handler for GET /sick-leaves/:id.
async fn get_sick_leave(State(state): State<AppState>, Path(raw_id): Path<String>) -> Response {
    let correlation_id = Uuid::new_v4();
    let id = match parse_id(correlation_id, &raw_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let engine = state.engine();
    match engine.detail(id) {
        Ok(detail) => {
            let window = engine.config().settings().expiry_window_days;
            let view = SickLeaveDetailView::new(detail, Utc::now().date_naive(), window);
            json_response(StatusCode::OK, view)
        }
        Err(err) => engine_error_response(correlation_id, err),
    }
}

/// Handler for POST /sick-leaves/:id/extensions.
async fn create_extension(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: Result<Json<CreateExtensionRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, previous_id = %raw_id, "Processing extension");

    let (previous_id, request) = match parse_id(correlation_id, &raw_id)
        .and_then(|id| parse_body(correlation_id, payload).map(|body| (id, body)))
    {
        Ok(parsed) => parsed,
        Err(response) => return response,
    };

    match state
        .engine()
        .create_extension(previous_id, request.extension, &request.performed_by)
    {
        Ok(registered) => json_response(StatusCode::CREATED, registered),
        Err(err) => engine_error_response(correlation_id, err),
    }
}

/// Handler for POST /sick-leaves/:id/transcription.
async fn register_transcription(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: Result<Json<TranscriptionRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let (id, request) = match parse_id(correlation_id, &raw_id)
        .and_then(|id| parse_body(correlation_id, payload).map(|body| (id, body)))
    {
        Ok(parsed) => parsed,
        Err(response) => return response,
    };

    match state.engine().register_transcription(
        id,
        request.transcription_date,
        request.file_number,
        &request.performed_by,
    ) {
        Ok(record) => json_response(StatusCode::OK, record),
        Err(err) => engine_error_response(correlation_id, err),
    }
}

/// Handler for POST /sick-leaves/:id/collection.
///
/// A paid amount outside the tolerance still succeeds; the response carries
/// the mismatch warning.
async fn register_collection(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: Result<Json<CollectionRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let (id, request) = match parse_id(correlation_id, &raw_id)
        .and_then(|id| parse_body(correlation_id, payload).map(|body| (id, body)))
    {
        Ok(parsed) => parsed,
        Err(response) => return response,
    };

    match state.engine().register_collection(
        id,
        request.collection_date,
        request.amount_paid,
        &request.performed_by,
    ) {
        Ok(outcome) => {
            if let Some(warning) = &outcome.warning {
                warn!(
                    correlation_id = %correlation_id,
                    expected = %warning.expected,
                    paid = %warning.paid,
                    "Collected amount differs from expected"
                );
            }
            json_response(StatusCode::OK, outcome)
        }
        Err(err) => engine_error_response(correlation_id, err),
    }
}

/// Handler for POST /sick-leaves/:id/cancel.
async fn cancel_sick_leave(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: Result<Json<CancelRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let (id, request) = match parse_id(correlation_id, &raw_id)
        .and_then(|id| parse_body(correlation_id, payload).map(|body| (id, body)))
    {
        Ok(parsed) => parsed,
        Err(response) => return response,
    };

    match state
        .engine()
        .cancel(id, &request.reason, &request.performed_by)
    {
        Ok(record) => json_response(StatusCode::OK, record),
        Err(err) => engine_error_response(correlation_id, err),
    }
}

/// Handler for POST /sick-leaves/:id/notes.
async fn add_note(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: Result<Json<NoteRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let (id, request) = match parse_id(correlation_id, &raw_id)
        .and_then(|id| parse_body(correlation_id, payload).map(|body| (id, body)))
    {
        Ok(parsed) => parsed,
        Err(response) => return response,
    };

    match state
        .engine()
        .add_note(id, &request.text, &request.performed_by)
    {
        Ok(entry) => json_response(StatusCode::CREATED, TrackingEntryView::from(entry)),
        Err(err) => engine_error_response(correlation_id, err),
    }
}

/// Handler for POST /sick-leaves/:id/documents.
async fn attach_document(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: Result<Json<DocumentRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let (id, request) = match parse_id(correlation_id, &raw_id)
        .and_then(|id| parse_body(correlation_id, payload).map(|body| (id, body)))
    {
        Ok(parsed) => parsed,
        Err(response) => return response,
    };

    match state
        .engine()
        .attach_document(id, &request.path, &request.performed_by)
    {
        Ok(record) => json_response(StatusCode::OK, record),
        Err(err) => engine_error_response(correlation_id, err),
    }
}

/// Handler for GET /sick-leaves/:id/tracking.
async fn get_tracking(State(state): State<AppState>, Path(raw_id): Path<String>) -> Response {
    let correlation_id = Uuid::new_v4();
    let id = match parse_id(correlation_id, &raw_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.engine().tracking(id) {
        Ok(entries) => {
            let views: Vec<TrackingEntryView> =
                entries.into_iter().map(TrackingEntryView::from).collect();
            json_response(StatusCode::OK, views)
        }
        Err(err) => engine_error_response(correlation_id, err),
    }
}

/// Handler for GET /employees/:id/sick-leaves.
async fn list_employee_sick_leaves(
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let engine = state.engine();

    match engine.list_for_employee(&employee_id) {
        Ok(records) => {
            let today = Utc::now().date_naive();
            let window = engine.config().settings().expiry_window_days;
            let summaries: Vec<_> = records
                .iter()
                .map(|record| leave_summary(record, today, window))
                .collect();
            json_response(StatusCode::OK, summaries)
        }
        Err(err) => engine_error_response(correlation_id, err),
    }
}

/// Handler for GET /sick-leaves.
async fn list_sick_leaves(
    State(state): State<AppState>,
    query: Result<Query<SickLeaveQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let query = match parse_query(correlation_id, query) {
        Ok(query) => query,
        Err(response) => return response,
    };

    match state.engine().list(&query, Utc::now().date_naive()) {
        Ok(summaries) => {
            info!(
                correlation_id = %correlation_id,
                results = summaries.len(),
                "Listed sick leaves"
            );
            json_response(StatusCode::OK, summaries)
        }
        Err(err) => engine_error_response(correlation_id, err),
    }
}

/// Handler for GET /reports/reimbursement.
async fn reimbursement_report(
    State(state): State<AppState>,
    query: Result<Query<ReportQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let query = match parse_query(correlation_id, query) {
        Ok(query) => query,
        Err(response) => return response,
    };
    info!(
        correlation_id = %correlation_id,
        year = query.year,
        month = query.month,
        "Building reimbursement report"
    );

    match state.engine().reimbursement_report(&query) {
        Ok(report) => json_response(StatusCode::OK, report),
        Err(err) => engine_error_response(correlation_id, err),
    }
}

/// Handler for GET /dashboard.
async fn dashboard(
    State(state): State<AppState>,
    query: Result<Query<DashboardQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let query = match parse_query(correlation_id, query) {
        Ok(query) => query,
        Err(response) => return response,
    };
    let as_of = query.as_of.unwrap_or_else(|| Utc::now().date_naive());

    match state.engine().dashboard(as_of) {
        Ok(summary) => json_response(StatusCode::OK, summary),
        Err(err) => engine_error_response(correlation_id, err),
    }
}
