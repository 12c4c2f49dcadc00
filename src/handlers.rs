use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Json},
};
use std::sync::Arc;
use tera::Context;
use tracing::error;

use crate::models::Field;
use crate::state::AppState;

fn render_template(
    tera: &tera::Tera,
    template: &str,
    context: &Context,
) -> Result<Html<String>, (StatusCode, &'static str)> {
    tera.render(template, context).map(Html).map_err(|e| {
        error!("Template render error for '{}': {}", template, e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Render error")
    })
}

/// GET / - Dashboard listing every reading with its availability.
pub async fn dashboard(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let poll = state.poll.read().await;

    let readings: Vec<serde_json::Value> = Field::ALL
        .iter()
        .map(|&field| {
            let descriptor = field.descriptor();
            let value = poll
                .record
                .as_ref()
                .and_then(|record| record.get(field))
                .map(|v| v.to_string());
            serde_json::json!({
                "key": field.key(),
                "name": descriptor.name,
                "icon": descriptor.icon,
                "unit": descriptor.unit,
                "diagnostic": descriptor.diagnostic,
                "value": value,
                "available": poll.available(field),
            })
        })
        .collect();

    let mut context = Context::new();
    context.insert("host", &state.config.host);
    context.insert("last_success", &poll.last_success);
    context.insert("last_error", &poll.last_error);
    context.insert("cycles_completed", &poll.cycles_completed);
    context.insert("readings", &readings);
    drop(poll);

    render_template(&state.tera, "dashboard.html", &context)
}

/// GET /api/status - JSON record plus per-field availability.
pub async fn api_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let poll = state.poll.read().await;

    let available: serde_json::Map<String, serde_json::Value> = Field::ALL
        .iter()
        .map(|&field| (field.key().to_string(), poll.available(field).into()))
        .collect();

    let record = match (&poll.record, poll.last_success) {
        (Some(record), true) => serde_json::to_value(record).unwrap_or_default(),
        _ => serde_json::Value::Null,
    };

    Json(serde_json::json!({
        "host": state.config.host,
        "last_success": poll.last_success,
        "last_error": poll.last_error,
        "cycles_completed": poll.cycles_completed,
        "record": record,
        "available": available,
    }))
}

/// GET /health - liveness probe for the service itself.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{StatusRecord, Value};
    use crate::state::{Config, PollState};
    use std::time::Duration;

    fn test_state(poll: PollState) -> Arc<AppState> {
        let config = Config {
            host: "192.0.2.1".into(),
            scan_interval: Duration::from_secs(30),
            bind_address: "127.0.0.1:0".into(),
        };
        let state = AppState::new(tera::Tera::default(), config);
        *state.poll.try_write().unwrap() = poll;
        Arc::new(state)
    }

    #[tokio::test]
    async fn test_api_status_before_first_cycle() {
        let state = test_state(PollState::default());
        let response = api_status(State(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_api_status_hides_record_after_failure() {
        let mut record = StatusRecord::new();
        record.set(Field::CableModemStatus, Value::text("Online"));
        let state = test_state(PollState {
            record: Some(record),
            last_success: false,
            last_error: Some("router unreachable".into()),
            cycles_completed: 3,
        });

        let poll = state.poll.read().await;
        assert!(!poll.available(Field::CableModemStatus));
        drop(poll);

        let response = api_status(State(state)).await.into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["record"].is_null());
        assert_eq!(json["available"]["cable_modem_status"], false);
        assert_eq!(json["last_error"], "router unreachable");
    }
}
