//! HTTP request handlers for the payroll withholding API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::withholding::WithholdingRequest;

use super::request::{BatchCalculationRequest, WithholdingCalculationRequest};
use super::response::{
    ApiError, ApiErrorResponse, BatchCalculationResponse, BatchEntryResponse,
};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/calculate-tax-withholdings", post(calculate_handler))
        .route("/calculate-tax-withholdings/batch", post(batch_handler))
        .route("/audit-log/:employee_id", get(audit_log_handler))
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

fn error_response(error: ApiErrorResponse) -> Response {
    json_response(error.status, error.error)
}

/// Maps a body extraction failure to a 400 error.
fn rejection_error(rejection: JsonRejection, correlation_id: Uuid) -> ApiError {
    match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            ApiError::invalid_request(body_text)
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
            ApiError::invalid_request("Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    }
}

/// Handler for `POST /calculate-tax-withholdings`.
async fn calculate_handler(
    State(state): State<AppState>,
    payload: Result<Json<WithholdingCalculationRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing withholding request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            return json_response(
                StatusCode::BAD_REQUEST,
                rejection_error(rejection, correlation_id),
            );
        }
    };

    let employee_id = request.employee_id.clone();
    let request = match request.into_domain() {
        Ok(request) => request,
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                employee_id = %employee_id,
                error = %err,
                "Invalid withholding request"
            );
            return error_response(err.into());
        }
    };

    let start_time = Instant::now();
    match state.service().calculate(&request).await {
        Ok(result) => {
            info!(
                correlation_id = %correlation_id,
                employee_id = %employee_id,
                engine = result.engine_used().as_str(),
                total_withholdings = %result.total_withholdings,
                duration_us = start_time.elapsed().as_micros(),
                "Withholding request completed"
            );
            json_response(StatusCode::OK, result)
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                employee_id = %employee_id,
                error = %err,
                "Withholding request failed"
            );
            error_response(err.into())
        }
    }
}

/// Handler for `POST /calculate-tax-withholdings/batch`.
///
/// Always 200 once the body parses; each entry carries its own status.
async fn batch_handler(
    State(state): State<AppState>,
    payload: Result<Json<BatchCalculationRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let batch = match payload {
        Ok(Json(batch)) => batch,
        Err(rejection) => {
            return json_response(
                StatusCode::BAD_REQUEST,
                rejection_error(rejection, correlation_id),
            );
        }
    };

    info!(
        correlation_id = %correlation_id,
        entries = batch.requests.len(),
        "Processing withholding batch"
    );

    let start_time = Instant::now();

    // Entries that fail conversion never reach the service; their slots
    // are filled in afterwards so results stay in request order.
    let mut slots: Vec<Option<BatchEntryResponse>> = Vec::with_capacity(batch.requests.len());
    let mut valid: Vec<WithholdingRequest> = Vec::new();

    for request in batch.requests {
        let employee_id = request.employee_id.clone();
        match request.into_domain() {
            Ok(request) => {
                valid.push(request);
                slots.push(None);
            }
            Err(err) => {
                let api_error = ApiErrorResponse::from(err).error;
                slots.push(Some(BatchEntryResponse::failed(employee_id, api_error)));
            }
        }
    }

    let mut outcomes = state
        .service()
        .calculate_batch(&valid)
        .await
        .into_iter()
        .map(BatchEntryResponse::from);

    let results: Vec<BatchEntryResponse> = slots
        .into_iter()
        .filter_map(|slot| slot.or_else(|| outcomes.next()))
        .collect();

    let failed = results
        .iter()
        .filter(|entry| entry.error.is_some())
        .count();

    info!(
        correlation_id = %correlation_id,
        entries = results.len(),
        failed,
        duration_us = start_time.elapsed().as_micros(),
        "Withholding batch completed"
    );

    json_response(StatusCode::OK, BatchCalculationResponse { results })
}

/// Handler for `GET /audit-log/:employee_id`.
async fn audit_log_handler(
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    match state.service().audit_history(&employee_id).await {
        Ok(records) => {
            info!(
                correlation_id = %correlation_id,
                employee_id = %employee_id,
                records = records.len(),
                "Audit log listed"
            );
            json_response(StatusCode::OK, records)
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                employee_id = %employee_id,
                error = %err,
                "Audit log query failed"
            );
            error_response(err.into())
        }
    }
}
