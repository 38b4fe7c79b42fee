//! HTTP request handlers for the entitlement engine API.
//!
//! Each handler validates the path, calls one engine operation and maps
//! the result to JSON. Engine errors become [`ApiErrorResponse`]s; degraded
//! calculator results are returned with status 200 and their provenance.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::calculate_cashout;
use crate::error::{EngineError, EngineResult};
use crate::models::{PayrollInput, Period};

use super::request::{
    CashoutRequest, CashoutRuleRequest, EntitlementsRequest, LeaveCheckRequest,
    OvertimeRuleRequest, OvertimeSyncRequest,
};
use super::response::{
    ApiError, ApiErrorResponse, BatchResponse, HealthResponse, LeaveCheckResponse,
};
use super::state::AppState;

/// Header naming the user on whose behalf a write is made.
pub const ACTOR_HEADER: &str = "x-actor";

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/lunch/:employee/:year/:month", get(lunch_handler))
        .route("/overtime-sync/:year/:month", post(overtime_sync_handler))
        .route("/overtime/:employee/:year/:month", get(overtime_pay_handler))
        .route(
            "/overtime-rules/:year/:month",
            get(get_overtime_rule_handler).put(put_overtime_rule_handler),
        )
        .route("/vacation/:employee/:year", get(vacation_snapshot_handler))
        .route(
            "/vacation/:employee/:year/validate",
            post(vacation_validate_handler),
        )
        .route(
            "/vacation/:employee/:year/cashout",
            get(year_end_cashout_handler),
        )
        .route("/cashout", post(cashout_handler))
        .route("/vacation-entitlements/:year", put(entitlements_handler))
        .route(
            "/cashout-rules/:year",
            get(get_cashout_rule_handler).put(put_cashout_rule_handler),
        )
        .route(
            "/payroll/:employee/:year/:month",
            get(get_payroll_handler).put(put_payroll_handler),
        )
        .route(
            "/payroll/:employee/:year/:month/draft",
            get(payroll_draft_handler),
        )
        .route("/payroll-periods/:year/:month", get(list_payroll_handler))
        .with_state(state)
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn respond<T: Serialize>(correlation_id: Uuid, result: EngineResult<T>) -> Response {
    match result {
        Ok(body) => json_response(StatusCode::OK, &body),
        Err(error) => error_response(correlation_id, error.into()),
    }
}

fn error_response(correlation_id: Uuid, error: ApiErrorResponse) -> Response {
    warn!(
        correlation_id = %correlation_id,
        status = error.status.as_u16(),
        code = %error.error.code,
        message = %error.error.message,
        "Request failed"
    );
    error.into_response()
}

fn rejection_response(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    error_response(correlation_id, ApiErrorResponse::from_rejection(rejection))
}

fn actor(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(ACTOR_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Handler for GET /health.
async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Handler for GET /lunch/{employee}/{year}/{month}.
async fn lunch_handler(
    State(state): State<AppState>,
    Path((employee, year, month)): Path<(String, i32, u32)>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, employee = %employee, year, month, "Settling lunch");
    let result =
        Period::new(year, month).map(|period| state.engine().lunch().settle(&employee, period));
    respond(correlation_id, result)
}

/// Handler for POST /overtime-sync/{year}/{month}.
///
/// An empty body syncs from the stored duty roster.
async fn overtime_sync_handler(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, year, month, "Syncing overtime counts");

    let period = match Period::new(year, month) {
        Ok(period) => period,
        Err(error) => return error_response(correlation_id, error.into()),
    };
    let overtime = state.engine().overtime();

    let rows = if body.iter().all(u8::is_ascii_whitespace) {
        match overtime.load_duty_rows(period) {
            Ok(rows) => rows,
            Err(error) => return error_response(correlation_id, error.into()),
        }
    } else {
        match serde_json::from_slice::<OvertimeSyncRequest>(&body) {
            Ok(request) => request.rows,
            Err(error) => {
                return error_response(
                    correlation_id,
                    ApiErrorResponse::new(
                        StatusCode::BAD_REQUEST,
                        ApiError::malformed_json(format!("Invalid duty rows: {}", error)),
                    ),
                );
            }
        }
    };

    let outcome = overtime.sync_counts(period, &rows, actor(&headers));
    json_response(StatusCode::OK, &BatchResponse::from(outcome))
}

/// Handler for GET /overtime/{employee}/{year}/{month}.
async fn overtime_pay_handler(
    State(state): State<AppState>,
    Path((employee, year, month)): Path<(String, i32, u32)>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, employee = %employee, year, month, "Computing overtime pay");
    let result = Period::new(year, month)
        .map(|period| state.engine().overtime().weekday_pay(&employee, period));
    respond(correlation_id, result)
}

/// Handler for GET /overtime-rules/{year}/{month}.
async fn get_overtime_rule_handler(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    match Period::new(year, month).and_then(|period| state.engine().overtime().rule(period)) {
        Ok(Some(rule)) => json_response(StatusCode::OK, &rule),
        Ok(None) => error_response(
            correlation_id,
            ApiErrorResponse::not_found(format!("No overtime rule for {}-{:02}", year, month)),
        ),
        Err(error) => error_response(correlation_id, error.into()),
    }
}

/// Handler for PUT /overtime-rules/{year}/{month}.
async fn put_overtime_rule_handler(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
    headers: HeaderMap,
    payload: Result<Json<OvertimeRuleRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, year, month, "Saving overtime rule");
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };
    let result = Period::new(year, month).and_then(|period| {
        state
            .engine()
            .overtime()
            .upsert_rule(&request.into_rule(period), actor(&headers))
    });
    respond(correlation_id, result)
}

/// Handler for GET /vacation/{employee}/{year}.
async fn vacation_snapshot_handler(
    State(state): State<AppState>,
    Path((employee, year)): Path<(String, i32)>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, employee = %employee, year, "Reading vacation balance");
    respond(correlation_id, state.engine().vacation().snapshot(&employee, year))
}

/// Handler for POST /vacation/{employee}/{year}/validate.
async fn vacation_validate_handler(
    State(state): State<AppState>,
    Path((employee, year)): Path<(String, i32)>,
    payload: Result<Json<LeaveCheckRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };
    info!(
        correlation_id = %correlation_id,
        employee = %employee,
        year,
        requested = %request.requested_hours,
        "Validating annual leave request"
    );

    match state
        .engine()
        .vacation()
        .validate_sufficient(&employee, year, request.requested_hours)
    {
        Ok(snapshot) => json_response(
            StatusCode::OK,
            &LeaveCheckResponse {
                ok: true,
                message: "Sufficient annual leave".to_string(),
                snapshot: Some(snapshot),
            },
        ),
        Err(error @ EngineError::InsufficientLeave { .. }) => json_response(
            StatusCode::OK,
            &LeaveCheckResponse {
                ok: false,
                message: error.to_string(),
                snapshot: None,
            },
        ),
        Err(error) => error_response(correlation_id, error.into()),
    }
}

/// Handler for GET /vacation/{employee}/{year}/cashout.
async fn year_end_cashout_handler(
    State(state): State<AppState>,
    Path((employee, year)): Path<(String, i32)>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, employee = %employee, year, "Computing year-end cash-out");
    respond(
        correlation_id,
        state.engine().vacation().year_end_cashout(&employee, year),
    )
}

/// Handler for POST /cashout.
///
/// A pure conversion: nothing is read from or written to the store.
async fn cashout_handler(payload: Result<Json<CashoutRequest>, JsonRejection>) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };
    let result = calculate_cashout(
        request.remaining_hours,
        request.hours_per_day,
        request.cap_days,
        request.amount_per_day,
        request.whole_days_only,
    );
    json_response(StatusCode::OK, &result)
}

/// Handler for PUT /vacation-entitlements/{year}.
async fn entitlements_handler(
    State(state): State<AppState>,
    Path(year): Path<i32>,
    headers: HeaderMap,
    payload: Result<Json<EntitlementsRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };
    info!(
        correlation_id = %correlation_id,
        year,
        employees = request.entitlements.len(),
        "Setting vacation entitlements"
    );
    let outcome = state
        .engine()
        .vacation()
        .set_entitlements(year, &request.pairs(), actor(&headers));
    json_response(StatusCode::OK, &BatchResponse::from(outcome))
}

/// Handler for GET /cashout-rules/{year}.
async fn get_cashout_rule_handler(
    State(state): State<AppState>,
    Path(year): Path<i32>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    match state.engine().vacation().cashout_rule(year) {
        Ok(Some(rule)) => json_response(StatusCode::OK, &rule),
        Ok(None) => error_response(
            correlation_id,
            ApiErrorResponse::not_found(format!("No cash-out rule for {}", year)),
        ),
        Err(error) => error_response(correlation_id, error.into()),
    }
}

/// Handler for PUT /cashout-rules/{year}.
async fn put_cashout_rule_handler(
    State(state): State<AppState>,
    Path(year): Path<i32>,
    headers: HeaderMap,
    payload: Result<Json<CashoutRuleRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, year, "Saving cash-out rule");
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };
    respond(
        correlation_id,
        state
            .engine()
            .vacation()
            .upsert_cashout_rule(&request.into_rule(year), actor(&headers)),
    )
}

/// Handler for GET /payroll/{employee}/{year}/{month}.
async fn get_payroll_handler(
    State(state): State<AppState>,
    Path((employee, year, month)): Path<(String, i32, u32)>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let result = Period::new(year, month)
        .and_then(|period| state.engine().payroll().get_record(&employee, period));
    match result {
        Ok(Some(record)) => json_response(StatusCode::OK, &record),
        Ok(None) => error_response(
            correlation_id,
            ApiErrorResponse::not_found(format!(
                "No payroll record for {} in {}-{:02}",
                employee, year, month
            )),
        ),
        Err(error) => error_response(correlation_id, error.into()),
    }
}

/// Handler for PUT /payroll/{employee}/{year}/{month}.
async fn put_payroll_handler(
    State(state): State<AppState>,
    Path((employee, year, month)): Path<(String, i32, u32)>,
    headers: HeaderMap,
    payload: Result<Json<PayrollInput>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, employee = %employee, year, month, "Saving payroll record");
    let input = match payload {
        Ok(Json(input)) => input,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };
    let result = Period::new(year, month).and_then(|period| {
        state
            .engine()
            .payroll()
            .upsert(&employee, period, &input, actor(&headers))
    });
    respond(correlation_id, result)
}

/// Handler for GET /payroll/{employee}/{year}/{month}/draft.
async fn payroll_draft_handler(
    State(state): State<AppState>,
    Path((employee, year, month)): Path<(String, i32, u32)>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, employee = %employee, year, month, "Preparing payroll draft");
    let result = Period::new(year, month)
        .and_then(|period| state.engine().payroll().prepare_draft(&employee, period));
    respond(correlation_id, result)
}

/// Handler for GET /payroll-periods/{year}/{month}.
async fn list_payroll_handler(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let result =
        Period::new(year, month).and_then(|period| state.engine().payroll().list_records(period));
    respond(correlation_id, result)
}
