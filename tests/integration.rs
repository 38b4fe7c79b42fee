//! Integration tests for the entitlement engine API.
//!
//! This test suite drives the router end to end against an in-memory store:
//! - Meal subsidy settlement
//! - Weekday overtime sync and pay
//! - Vacation balance checks and cash-out
//! - Payroll save, read and draft
//! - Error cases

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{Datelike, NaiveDate, Weekday};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use tower::ServiceExt;

use entitlement_engine::api::{AppState, create_router};
use entitlement_engine::config::EngineConfig;
use entitlement_engine::schema::{DateSpan, FieldValue};
use entitlement_engine::services::Engine;
use entitlement_engine::store::{DocumentStore, InMemoryStore, Properties};

// =============================================================================
// Test Helpers
// =============================================================================

fn create_test_app() -> (Arc<InMemoryStore>, Router) {
    let config = EngineConfig::default();
    let store = Arc::new(InMemoryStore::provisioned(&config.collections));
    let engine = Engine::new(store.clone(), config);
    (store, create_router(AppState::new(engine)))
}

fn decimal(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn as_decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => decimal(s),
        Value::Number(n) => decimal(&n.to_string()),
        other => panic!("Expected a decimal, got {}", other),
    }
}

async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-actor", "tester");
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = if body_bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };

    (status, json)
}

fn seed(store: &InMemoryStore, collection: &str, pairs: Vec<(&str, FieldValue)>) {
    let properties: Properties = pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect();
    store.create(collection, properties).unwrap();
}

fn attend(store: &InMemoryStore, employee: &str, date: NaiveDate, status: &str) {
    seed(store, "attendance", vec![
        ("員工姓名", FieldValue::Title(employee.to_string())),
        ("出勤日期", FieldValue::Date(Some(DateSpan::day(date)))),
        ("出勤狀態", FieldValue::Select(Some(status.to_string()))),
    ]);
}

fn february_rows() -> Value {
    json!({
        "rows": [
            { "day": 2, "columns": { "檢驗線(中)": "A", "收費員(晚)": "A", "星期": "一" } },
            { "day": 3, "columns": { "打掃工作": "B、A" } },
            { "day": 7, "columns": { "檢驗線(中)": "A" } }
        ]
    })
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health() {
    let (_store, router) = create_test_app();
    let (status, body) = send(&router, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

// =============================================================================
// Meal subsidy
// =============================================================================

#[tokio::test]
async fn test_lunch_march_scenario() {
    let (store, router) = create_test_app();
    let period_start = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();

    let mut weekdays = 0;
    let mut saturdays = 0;
    let mut sundays = 0;
    let mut leave_days = 0;
    for date in period_start.iter_days().take_while(|d| d.month() == 3) {
        match date.weekday() {
            Weekday::Sat if saturdays < 2 => {
                saturdays += 1;
                attend(&store, "B", date, "出席");
            }
            Weekday::Sun if sundays < 3 => {
                sundays += 1;
                attend(&store, "B", date, "出席");
            }
            Weekday::Sat | Weekday::Sun => {}
            _ if weekdays < 20 => {
                weekdays += 1;
                attend(&store, "B", date, "出席");
            }
            _ if leave_days < 1 => {
                leave_days += 1;
                attend(&store, "B", date, "請假");
            }
            _ => {}
        }
    }

    let (status, body) = send(&router, "GET", "/lunch/B/2026/3", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["eligible_days"], 22);
    assert_eq!(as_decimal(&body["entitlement_amount"]), decimal("1980"));
    assert_eq!(body["provenance"]["status"], "computed");
}

#[tokio::test]
async fn test_lunch_with_unavailable_store_degrades() {
    let (store, router) = create_test_app();
    store.set_unavailable("attendance");

    let (status, body) = send(&router, "GET", "/lunch/B/2026/3", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["eligible_days"], 0);
    assert_eq!(body["provenance"]["status"], "degraded");
}

#[tokio::test]
async fn test_invalid_month_is_rejected() {
    let (_store, router) = create_test_app();
    let (status, body) = send(&router, "GET", "/lunch/B/2026/13", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_PERIOD");
}

// =============================================================================
// Weekday overtime
// =============================================================================

#[tokio::test]
async fn test_overtime_sync_counts_two_columns_same_day() {
    let (store, router) = create_test_app();

    let (status, body) = send(&router, "POST", "/overtime-sync/2026/2", Some(february_rows())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["succeeded_count"], 2);
    assert_eq!(body["failed_count"], 0);

    let (status, _) = send(
        &router,
        "PUT",
        "/overtime-rules/2026/2",
        Some(json!({ "shift_hours": 1, "hourly_rate": 200 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Feb 2 (two columns) and Feb 3 count; Feb 7 is a Saturday.
    let (status, body) = send(&router, "GET", "/overtime/A/2026/2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(as_decimal(&body["hours"]), decimal("3"));
    assert_eq!(as_decimal(&body["amount"]), decimal("600"));
    assert_eq!(body["provenance"]["status"], "computed");

    assert!(store.record_count("oplog") >= 2);
}

#[tokio::test]
async fn test_overtime_sync_is_idempotent() {
    let (store, router) = create_test_app();

    send(&router, "POST", "/overtime-sync/2026/2", Some(february_rows())).await;
    send(&router, "POST", "/overtime-sync/2026/2", Some(february_rows())).await;

    assert_eq!(store.record_count("overtime_count"), 2);
}

#[tokio::test]
async fn test_overtime_sync_with_empty_body_reads_roster() {
    let (store, router) = create_test_app();
    seed(&store, "duty", vec![
        ("年份", FieldValue::Number(Some(Decimal::from(2026)))),
        ("月份", FieldValue::Number(Some(Decimal::from(2)))),
        ("日期", FieldValue::Title("2日".to_string())),
        ("檢驗線(中)", FieldValue::Text("C".to_string())),
    ]);

    let (status, body) = send(&router, "POST", "/overtime-sync/2026/2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"]["succeeded"], json!(["C"]));
}

#[tokio::test]
async fn test_overtime_pay_without_rule_degrades() {
    let (_store, router) = create_test_app();
    let (status, body) = send(&router, "GET", "/overtime/A/2026/2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(as_decimal(&body["amount"]), Decimal::ZERO);
    assert_eq!(body["provenance"]["status"], "degraded");
}

#[tokio::test]
async fn test_missing_overtime_rule_is_not_found() {
    let (_store, router) = create_test_app();
    let (status, body) = send(&router, "GET", "/overtime-rules/2026/2", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_malformed_sync_body_is_bad_request() {
    let (_store, router) = create_test_app();
    let request = Request::builder()
        .method("POST")
        .uri("/overtime-sync/2026/2")
        .body(Body::from("{ not json"))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Vacation
// =============================================================================

#[tokio::test]
async fn test_insufficient_leave_reports_remaining_and_requested() {
    let (_store, router) = create_test_app();

    let (status, body) = send(
        &router,
        "PUT",
        "/vacation-entitlements/2026",
        Some(json!({ "entitlements": [{ "employee": "C", "hours": 10 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["succeeded_count"], 1);

    let (status, body) = send(
        &router,
        "POST",
        "/vacation/C/2026/validate",
        Some(json!({ "requested_hours": 12 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], false);
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("10"), "message: {}", message);
    assert!(message.contains("12"), "message: {}", message);

    let (_, body) = send(
        &router,
        "POST",
        "/vacation/C/2026/validate",
        Some(json!({ "requested_hours": 8 })),
    )
    .await;
    assert_eq!(body["ok"], true);
    assert_eq!(as_decimal(&body["snapshot"]["remaining_hours"]), decimal("10"));
}

#[tokio::test]
async fn test_snapshot_subtracts_approved_annual_leave() {
    let (store, router) = create_test_app();
    send(
        &router,
        "PUT",
        "/vacation-entitlements/2026",
        Some(json!({ "entitlements": [{ "employee": "D", "hours": 56 }] })),
    )
    .await;
    seed(&store, "leave", vec![
        ("員工姓名", FieldValue::Title("D".to_string())),
        ("假別", FieldValue::Select(Some("特休".to_string()))),
        ("狀態", FieldValue::Select(Some("通過".to_string()))),
        (
            "請假期間",
            FieldValue::Date(Some(DateSpan::day(NaiveDate::from_ymd_opt(2026, 4, 1).unwrap()))),
        ),
        ("請假時數", FieldValue::Number(Some(Decimal::from(16)))),
    ]);

    let (status, body) = send(&router, "GET", "/vacation/D/2026", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(as_decimal(&body["used_hours"]), decimal("16"));
    assert_eq!(as_decimal(&body["remaining_hours"]), decimal("40"));
}

#[tokio::test]
async fn test_cashout_scenario() {
    let (_store, router) = create_test_app();
    let (status, body) = send(
        &router,
        "POST",
        "/cashout",
        Some(json!({
            "remaining_hours": 37,
            "hours_per_day": 8,
            "cap_days": 5,
            "amount_per_day": 1000,
            "whole_days_only": true
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(as_decimal(&body["remaining_days"]), decimal("4.625"));
    assert_eq!(as_decimal(&body["cashout_days"]), decimal("4"));
    assert_eq!(as_decimal(&body["cashout_amount"]), decimal("4000"));
}

#[tokio::test]
async fn test_cashout_missing_field_is_validation_error() {
    let (_store, router) = create_test_app();
    let (status, body) = send(&router, "POST", "/cashout", Some(json!({ "cap_days": 5 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_year_end_cashout_uses_stored_rule() {
    let (_store, router) = create_test_app();
    send(
        &router,
        "PUT",
        "/vacation-entitlements/2026",
        Some(json!({ "entitlements": [{ "employee": "E", "hours": 80 }] })),
    )
    .await;
    let (status, _) = send(
        &router,
        "PUT",
        "/cashout-rules/2026",
        Some(json!({ "cap_days": 3, "hours_per_day": 8, "amount_per_hour": 150 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&router, "GET", "/vacation/E/2026/cashout", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rule_is_default"], false);
    assert_eq!(as_decimal(&body["result"]["cashout_days"]), decimal("3"));
    assert_eq!(as_decimal(&body["result"]["cashout_amount"]), decimal("3600"));
}

#[tokio::test]
async fn test_invalid_cashout_rule_is_rejected() {
    let (_store, router) = create_test_app();
    let (status, body) = send(
        &router,
        "PUT",
        "/cashout-rules/2026",
        Some(json!({ "cap_days": 3, "hours_per_day": 0, "amount_per_hour": 150 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

// =============================================================================
// Payroll
// =============================================================================

#[tokio::test]
async fn test_payroll_save_and_read() {
    let (_store, router) = create_test_app();
    let (status, body) = send(
        &router,
        "PUT",
        "/payroll/A/2026/3",
        Some(json!({ "items": { "full_salary": 30000, "salary_advance": 2000 } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(as_decimal(&body["net_pay"]), decimal("28000"));

    let (status, body) = send(&router, "GET", "/payroll/A/2026/3", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(as_decimal(&body["gross_total"]), decimal("30000"));
    assert_eq!(as_decimal(&body["deduct_total"]), decimal("2000"));

    let (status, body) = send(&router, "GET", "/payroll-periods/2026/3", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_payroll_absent_record_is_not_found() {
    let (_store, router) = create_test_app();
    let (status, _) = send(&router, "GET", "/payroll/A/2026/3", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_payroll_blank_employee_writes_nothing() {
    let (store, router) = create_test_app();
    let (status, body) = send(
        &router,
        "PUT",
        "/payroll/%20/2026/3",
        Some(json!({ "items": { "full_salary": 30000 } })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MISSING_FIELD");
    assert_eq!(store.record_count("payroll"), 0);
}

#[tokio::test]
async fn test_draft_suggestion_does_not_override_stored_value() {
    let (_store, router) = create_test_app();
    send(&router, "POST", "/overtime-sync/2026/2", Some(february_rows())).await;
    send(
        &router,
        "PUT",
        "/overtime-rules/2026/2",
        Some(json!({ "hourly_rate": 200 })),
    )
    .await;

    // No record yet: the overtime suggestion is used.
    let (status, body) = send(&router, "GET", "/payroll/A/2026/2/draft", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(as_decimal(&body["items"]["weekday_overtime_pay"]), decimal("600"));

    send(
        &router,
        "PUT",
        "/payroll/A/2026/2",
        Some(json!({ "items": { "weekday_overtime_pay": 500 } })),
    )
    .await;

    let (_, body) = send(&router, "GET", "/payroll/A/2026/2/draft", None).await;
    assert_eq!(as_decimal(&body["items"]["weekday_overtime_pay"]), decimal("500"));
    let suggestion = body["suggestions"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["item"] == "weekday_overtime_pay")
        .unwrap();
    assert_eq!(suggestion["applied"], false);
    assert_eq!(as_decimal(&suggestion["suggested"]), decimal("600"));
}
