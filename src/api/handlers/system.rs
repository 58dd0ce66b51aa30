//! System endpoints: health check and the recurrence-pattern catalog.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, and current timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// Supported recurrence pattern form.
#[derive(Debug, Serialize, ToSchema)]
struct RecurrencePatternInfo {
    form: &'static str,
    example: &'static str,
    description: &'static str,
}

/// `GET /config/recurrence-patterns` — List supported pattern forms.
///
/// The admin authoring UI builds pattern strings from these forms with its
/// weekday multi-select and ordinal dropdown; the strings are the wire
/// format between that UI and the schedule evaluator.
#[utoipa::path(
    get,
    path = "/config/recurrence-patterns",
    tag = "System",
    summary = "List supported recurrence pattern forms",
    description = "Returns the grammar of pattern strings the schedule evaluator understands.",
    responses(
        (status = 200, description = "Pattern form catalog", body = Vec<RecurrencePatternInfo>),
    )
)]
pub async fn recurrence_patterns_handler() -> impl IntoResponse {
    let forms = vec![
        RecurrencePatternInfo {
            form: "Daily",
            example: "Daily",
            description: "Active every day within the season window",
        },
        RecurrencePatternInfo {
            form: "Weekly on <Day>[, <Day>...]",
            example: "Weekly on Sunday, Wednesday",
            description: "Active on one or more weekdays every week",
        },
        RecurrencePatternInfo {
            form: "Monthly on the <Ordinal> <Day>",
            example: "Monthly on the 3rd Saturday",
            description: "Active on one week-of-month slot; ordinals 1st through 4th",
        },
        RecurrencePatternInfo {
            form: "Monthly on the Last <Day>",
            example: "Monthly on the Last Friday",
            description: "Active on the final occurrence of the weekday each month",
        },
    ];
    (StatusCode::OK, Json(forms))
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config/recurrence-patterns", get(recurrence_patterns_handler))
}
