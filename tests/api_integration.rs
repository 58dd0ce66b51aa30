//! End-to-end tests against a spawned server instance.
//!
//! Each test binds an ephemeral port, runs the full router in-memory
//! (persistence disabled), and drives it over real HTTP and WebSocket
//! connections.

#![allow(clippy::panic)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;

use tenbyten_directory::api;
use tenbyten_directory::app_state::AppState;
use tenbyten_directory::domain::{EventBus, ListingRegistry};
use tenbyten_directory::service::ListingService;
use tenbyten_directory::ws::handler::ws_handler;

/// Spawns the service on an ephemeral port and returns its address.
async fn spawn_app() -> anyhow::Result<SocketAddr> {
    let registry = Arc::new(ListingRegistry::new());
    let event_bus = EventBus::new(1000);
    let listing_service = Arc::new(ListingService::new(Arc::clone(&registry), event_bus.clone()));
    let app_state = AppState {
        listing_service,
        event_bus,
    };

    let app = Router::new()
        .merge(api::build_router())
        .route("/ws", get(ws_handler))
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(addr)
}

fn market_body(name: &str, pattern: &str) -> serde_json::Value {
    serde_json::json!({
        "kind": "market",
        "name": name,
        "description": "Outdoor antique market",
        "city": "Elkhorn",
        "region": "WI",
        "season_start_date": "2026-05-01",
        "season_end_date": "2026-09-30",
        "is_recurring": true,
        "recurring_pattern": pattern,
    })
}

#[tokio::test]
async fn health_endpoint_reports_healthy() -> anyhow::Result<()> {
    let addr = spawn_app().await?;
    let client = reqwest::Client::new();

    let response = client.get(format!("http://{addr}/health")).send().await?;
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await?;
    assert_eq!(body.get("status").and_then(|v| v.as_str()), Some("healthy"));
    Ok(())
}

#[tokio::test]
async fn recurrence_pattern_catalog_is_served() -> anyhow::Result<()> {
    let addr = spawn_app().await?;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("http://{addr}/config/recurrence-patterns"))
        .send()
        .await?;
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await?;
    let Some(forms) = body.as_array() else {
        panic!("expected an array, got {body}");
    };
    assert_eq!(forms.len(), 4);
    Ok(())
}

#[tokio::test]
async fn create_then_get_round_trips() -> anyhow::Result<()> {
    let addr = spawn_app().await?;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("http://{addr}/api/v1/listings"))
        .json(&market_body("Sunday Flea", "Weekly on Sunday"))
        .send()
        .await?;
    assert_eq!(response.status(), 201);
    let created: serde_json::Value = response.json().await?;
    let Some(id) = created.get("listing_id").and_then(|v| v.as_str()) else {
        panic!("missing listing_id in {created}");
    };

    let response = client
        .get(format!("http://{addr}/api/v1/listings/{id}"))
        .send()
        .await?;
    assert_eq!(response.status(), 200);
    let fetched: serde_json::Value = response.json().await?;
    assert_eq!(
        fetched.get("name").and_then(|v| v.as_str()),
        Some("Sunday Flea")
    );
    assert_eq!(
        fetched.get("recurring_pattern").and_then(|v| v.as_str()),
        Some("Weekly on Sunday")
    );
    assert_eq!(
        fetched.get("season_start_date").and_then(|v| v.as_str()),
        Some("2026-05-01")
    );
    Ok(())
}

#[tokio::test]
async fn create_rejects_unknown_kind() -> anyhow::Result<()> {
    let addr = spawn_app().await?;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("http://{addr}/api/v1/listings"))
        .json(&serde_json::json!({"kind": "popup", "name": "Popup"}))
        .send()
        .await?;
    assert_eq!(response.status(), 400);

    let body: serde_json::Value = response.json().await?;
    let code = body
        .get("error")
        .and_then(|e| e.get("code"))
        .and_then(|c| c.as_u64());
    assert_eq!(code, Some(1002));
    Ok(())
}

#[tokio::test]
async fn list_filters_by_active_date() -> anyhow::Result<()> {
    let addr = spawn_app().await?;
    let client = reqwest::Client::new();

    let _ = client
        .post(format!("http://{addr}/api/v1/listings"))
        .json(&market_body("Sunday Flea", "Weekly on Sunday"))
        .send()
        .await?;
    let _ = client
        .post(format!("http://{addr}/api/v1/listings"))
        .json(&serde_json::json!({
            "kind": "consignment",
            "name": "Second Story",
            "city": "Madison",
            "region": "WI",
            "season_start_date": "2026-01-01",
            "season_end_date": "2026-12-31",
            "recurring_pattern": "Daily",
        }))
        .send()
        .await?;

    // 2026-05-04 is a Monday: only the daily consignment shop is active.
    let response = client
        .get(format!(
            "http://{addr}/api/v1/listings?active_on=2026-05-04"
        ))
        .send()
        .await?;
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await?;
    let Some(data) = body.get("data").and_then(|v| v.as_array()) else {
        panic!("missing data array in {body}");
    };
    assert_eq!(data.len(), 1);
    let Some(hit) = data.first() else {
        panic!("empty data array");
    };
    assert_eq!(
        hit.get("name").and_then(|v| v.as_str()),
        Some("Second Story")
    );

    // Both are active on a Sunday inside both seasons.
    let response = client
        .get(format!(
            "http://{addr}/api/v1/listings?active_on=2026-05-03"
        ))
        .send()
        .await?;
    let body: serde_json::Value = response.json().await?;
    let total = body
        .get("pagination")
        .and_then(|p| p.get("total"))
        .and_then(|t| t.as_u64());
    assert_eq!(total, Some(2));
    Ok(())
}

#[tokio::test]
async fn next_occurrence_endpoint_matches_evaluator() -> anyhow::Result<()> {
    let addr = spawn_app().await?;
    let client = reqwest::Client::new();

    let created: serde_json::Value = client
        .post(format!("http://{addr}/api/v1/listings"))
        .json(&market_body("Sunday Flea", "Weekly on Sunday"))
        .send()
        .await?
        .json()
        .await?;
    let Some(id) = created.get("listing_id").and_then(|v| v.as_str()) else {
        panic!("missing listing_id in {created}");
    };

    let response = client
        .get(format!(
            "http://{addr}/api/v1/listings/{id}/next-occurrence?from=2026-05-01"
        ))
        .send()
        .await?;
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await?;
    // First in-season Sunday on or after May 1 2026.
    assert_eq!(
        body.get("next_occurrence").and_then(|v| v.as_str()),
        Some("2026-05-03")
    );

    // Past the season end there is no next occurrence.
    let response = client
        .get(format!(
            "http://{addr}/api/v1/listings/{id}/next-occurrence?from=2026-12-01"
        ))
        .send()
        .await?;
    let body: serde_json::Value = response.json().await?;
    assert!(body.get("next_occurrence").is_some_and(|v| v.is_null()));
    Ok(())
}

#[tokio::test]
async fn calendar_counts_the_month() -> anyhow::Result<()> {
    let addr = spawn_app().await?;
    let client = reqwest::Client::new();

    let _ = client
        .post(format!("http://{addr}/api/v1/listings"))
        .json(&market_body("Sunday Flea", "Weekly on Sunday"))
        .send()
        .await?;

    let response = client
        .get(format!("http://{addr}/api/v1/calendar?year=2026&month=5"))
        .send()
        .await?;
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await?;
    let Some(days) = body.get("days").and_then(|v| v.as_array()) else {
        panic!("missing days array in {body}");
    };
    assert_eq!(days.len(), 31);

    for day in days {
        let date = day.get("date").and_then(|v| v.as_str()).unwrap_or_default();
        let count = day
            .get("active_count")
            .and_then(|v| v.as_u64())
            .unwrap_or_default();
        // May 2026 Sundays: 3, 10, 17, 24, 31.
        let expected = u64::from(matches!(
            date,
            "2026-05-03" | "2026-05-10" | "2026-05-17" | "2026-05-24" | "2026-05-31"
        ));
        assert_eq!(count, expected, "unexpected count on {date}");
    }

    let response = client
        .get(format!("http://{addr}/api/v1/calendar?year=2026&month=13"))
        .send()
        .await?;
    assert_eq!(response.status(), 400);
    Ok(())
}

#[tokio::test]
async fn patch_then_delete_listing() -> anyhow::Result<()> {
    let addr = spawn_app().await?;
    let client = reqwest::Client::new();

    let created: serde_json::Value = client
        .post(format!("http://{addr}/api/v1/listings"))
        .json(&market_body("Sunday Flea", "Weekly on Sunday"))
        .send()
        .await?
        .json()
        .await?;
    let Some(id) = created.get("listing_id").and_then(|v| v.as_str()) else {
        panic!("missing listing_id in {created}");
    };

    let response = client
        .patch(format!("http://{addr}/api/v1/listings/{id}"))
        .json(&serde_json::json!({"name": "Sunday Flea & Vintage"}))
        .send()
        .await?;
    assert_eq!(response.status(), 200);
    let patched: serde_json::Value = response.json().await?;
    assert_eq!(
        patched.get("name").and_then(|v| v.as_str()),
        Some("Sunday Flea & Vintage")
    );

    let response = client
        .delete(format!("http://{addr}/api/v1/listings/{id}"))
        .send()
        .await?;
    assert_eq!(response.status(), 204);

    let response = client
        .get(format!("http://{addr}/api/v1/listings/{id}"))
        .send()
        .await?;
    assert_eq!(response.status(), 404);
    Ok(())
}

#[tokio::test]
async fn websocket_streams_listing_events() -> anyhow::Result<()> {
    let addr = spawn_app().await?;
    let client = reqwest::Client::new();

    let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws")).await?;

    // Subscribe to everything.
    let subscribe = serde_json::json!({
        "id": "sub-1",
        "type": "command",
        "timestamp": "2026-01-01T00:00:00Z",
        "payload": {"command": "subscribe", "listing_ids": ["*"]},
    });
    ws.send(Message::text(subscribe.to_string())).await?;

    let ack = tokio::time::timeout(Duration::from_secs(5), ws.next())
        .await?
        .transpose()?;
    let Some(Message::Text(ack)) = ack else {
        panic!("expected a text subscribe ack");
    };
    assert!(ack.contains("\"wildcard\":true"));

    // A mutation through the REST API shows up on the socket.
    let response = client
        .post(format!("http://{addr}/api/v1/listings"))
        .json(&market_body("Sunday Flea", "Weekly on Sunday"))
        .send()
        .await?;
    assert_eq!(response.status(), 201);

    let event = tokio::time::timeout(Duration::from_secs(5), ws.next())
        .await?
        .transpose()?;
    let Some(Message::Text(event)) = event else {
        panic!("expected a text event frame");
    };
    assert!(event.contains("listing_created"));
    assert!(event.contains("Sunday Flea"));
    Ok(())
}
