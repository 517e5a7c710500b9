//! Request handlers for the `/health` and `/api/v1/patients` routes.
//!
//! Handlers call the synchronous [`hps_core::PatientService`] directly and map
//! [`PatientError`] onto a status code with a short static message. Server-side failures are
//! logged in full; the client only sees the status.

use axum::{
    extract::{Path as AxumPath, Query, State},
    http::StatusCode,
    response::Json,
};

use crate::AppState;
use api_shared::{
    HealthRes, HealthService, ListPatientsQuery, PatientDetailsReq, PatientResponse,
    PatientSummary, PatientSummaryPage, StatusReq,
};
use hps_core::{PatientError, PatientId};

type ApiError = (StatusCode, &'static str);

fn parse_id(id: &str) -> Result<PatientId, ApiError> {
    PatientId::parse(id).map_err(|e| {
        tracing::warn!("Invalid patient id: {}", e);
        (StatusCode::BAD_REQUEST, "Invalid patient id")
    })
}

fn map_error(operation: &str, e: PatientError) -> ApiError {
    match e {
        PatientError::NotFound(_) => (StatusCode::NOT_FOUND, "Patient not found"),
        e if e.is_client_error() => {
            tracing::warn!("{} rejected: {}", operation, e);
            (StatusCode::BAD_REQUEST, "Invalid request")
        }
        e => {
            tracing::error!("{} error: {:?}", operation, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
        }
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint used for monitoring and load balancer checks.
#[axum::debug_handler]
pub(crate) async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/api/v1/patients",
    params(ListPatientsQuery),
    responses(
        (status = 200, description = "One page of matching patients, sorted by last then first name", body = PatientSummaryPage),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Missing or invalid API key"),
        (status = 500, description = "Internal server error")
    )
)]
#[axum::debug_handler]
pub(crate) async fn list_patients(
    State(state): State<AppState>,
    Query(query): Query<ListPatientsQuery>,
) -> Result<Json<PatientSummaryPage>, ApiError> {
    let page = query
        .page_request()
        .map_err(|e| map_error("List patients", e))?;
    let filter = query.into_filter().map_err(|e| map_error("List patients", e))?;
    let patients = state
        .patient_service
        .search_patients(&filter, page)
        .map_err(|e| map_error("List patients", e))?;
    Ok(Json(PatientSummaryPage::from(&patients)))
}

#[utoipa::path(
    post,
    path = "/api/v1/patients",
    request_body = PatientDetailsReq,
    responses(
        (status = 201, description = "Patient registered", body = PatientResponse),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Missing or invalid API key"),
        (status = 500, description = "Internal server error")
    )
)]
/// Register a new patient.
///
/// A phone number already on file does not block registration; the response sets
/// `duplicatePhoneWarning` instead.
#[axum::debug_handler]
pub(crate) async fn create_patient(
    State(state): State<AppState>,
    Json(req): Json<PatientDetailsReq>,
) -> Result<(StatusCode, Json<PatientResponse>), ApiError> {
    let registration = state
        .patient_service
        .register_patient(req.into())
        .map_err(|e| map_error("Register patient", e))?;
    Ok((
        StatusCode::CREATED,
        Json(PatientResponse::from(&registration)),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/patients/{id}",
    params(("id" = String, Path, description = "Patient id (32 lowercase hex characters)")),
    responses(
        (status = 200, description = "Patient", body = PatientResponse),
        (status = 400, description = "Malformed patient id"),
        (status = 401, description = "Missing or invalid API key"),
        (status = 404, description = "Patient not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[axum::debug_handler]
pub(crate) async fn get_patient(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<PatientResponse>, ApiError> {
    let id = parse_id(&id)?;
    let record = state
        .patient_service
        .get_patient(&id)
        .map_err(|e| map_error("Get patient", e))?;
    Ok(Json(PatientResponse::from(&record)))
}

#[utoipa::path(
    put,
    path = "/api/v1/patients/{id}",
    params(("id" = String, Path, description = "Patient id (32 lowercase hex characters)")),
    request_body = PatientDetailsReq,
    responses(
        (status = 200, description = "Patient updated", body = PatientResponse),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Missing or invalid API key"),
        (status = 404, description = "Patient not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[axum::debug_handler]
pub(crate) async fn update_patient(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
    Json(req): Json<PatientDetailsReq>,
) -> Result<Json<PatientResponse>, ApiError> {
    let id = parse_id(&id)?;
    let registration = state
        .patient_service
        .update_patient(&id, req.into())
        .map_err(|e| map_error("Update patient", e))?;
    Ok(Json(PatientResponse::from(&registration)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/patients/{id}/status",
    params(("id" = String, Path, description = "Patient id (32 lowercase hex characters)")),
    request_body = StatusReq,
    responses(
        (status = 200, description = "Status changed", body = PatientResponse),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Missing or invalid API key"),
        (status = 404, description = "Patient not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[axum::debug_handler]
pub(crate) async fn set_status(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
    Json(req): Json<StatusReq>,
) -> Result<Json<PatientResponse>, ApiError> {
    let id = parse_id(&id)?;
    let status = req.status().map_err(|e| map_error("Set status", e))?;
    let record = state
        .patient_service
        .set_status(&id, status)
        .map_err(|e| map_error("Set status", e))?;
    Ok(Json(PatientResponse::from(&record)))
}

#[utoipa::path(
    get,
    path = "/api/v1/patients/{id}/potential-duplicates",
    params(("id" = String, Path, description = "Patient id (32 lowercase hex characters)")),
    responses(
        (status = 200, description = "Active patients that may duplicate this one", body = [PatientSummary]),
        (status = 400, description = "Malformed patient id"),
        (status = 401, description = "Missing or invalid API key"),
        (status = 404, description = "Patient not found"),
        (status = 500, description = "Internal server error")
    )
)]
/// Potential duplicates of a patient, each with `matchConfidence` and `matchReason`.
#[axum::debug_handler]
pub(crate) async fn potential_duplicates(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<Vec<PatientSummary>>, ApiError> {
    let id = parse_id(&id)?;
    let candidates = state
        .patient_service
        .find_potential_duplicates(&id)
        .map_err(|e| map_error("Find potential duplicates", e))?;
    Ok(Json(candidates.iter().map(PatientSummary::from).collect()))
}
