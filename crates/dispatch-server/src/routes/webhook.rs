use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use dispatch_core::classify::classify;
use dispatch_core::derive::derive_parameters;
use dispatch_core::event::{ChangeNotification, NotificationKind};

use crate::state::AppState;

/// POST /api/events — the dispatcher.
///
/// Per invocation: parse, answer the subscription handshake if that is what
/// arrived, otherwise classify the secret, derive parameters, trigger the
/// routed platform, and translate the outcome into the HTTP status. This
/// handler is the only place that writes the HTTP response.
///
/// Delivery is at-least-once with no deduplication here; the event id is
/// logged so a wrapping layer can dedup if exactly-once triggering is needed.
pub async fn handle_event(State(app): State<AppState>, body: Bytes) -> Response {
    let notification = ChangeNotification::parse(&body);
    let event_id = notification.event_id.as_deref().unwrap_or("none");

    match notification.kind {
        NotificationKind::Validation { validation_code } => {
            tracing::info!(event_id, "answering subscription validation handshake");
            // Shape mandated by the Event Grid handshake protocol.
            Json(serde_json::json!({ "validationResponse": validation_code })).into_response()
        }
        NotificationKind::Unrecognized => {
            // Not a caller fault: a 4xx/5xx would make the delivery system
            // retry or alert on junk it will never stop sending.
            tracing::info!(event_id, "ignoring unrecognized notification");
            Json(serde_json::json!({ "status": "ignored" })).into_response()
        }
        NotificationKind::SecretChanged(event) => {
            let decision = classify(&event.secret_name);
            let params = derive_parameters(
                &event.secret_name,
                &event.vault_name,
                &app.config.overrides,
            );
            tracing::info!(
                event_id,
                vault = %event.vault_name,
                secret = %event.secret_name,
                platform = %decision.platform,
                mode = %params.mode,
                preview_only = params.preview_only,
                "dispatching secret change"
            );

            let trigger = app.triggers.for_platform(decision.platform);
            let outcome = trigger.trigger(&event, &params).await;

            // 5xx on failure so the delivery system redelivers; retries are
            // its job, not ours.
            let status = if outcome.success {
                StatusCode::OK
            } else {
                tracing::warn!(
                    event_id,
                    platform = %outcome.platform,
                    error = outcome.error.as_deref().unwrap_or("unknown"),
                    "trigger failed"
                );
                StatusCode::BAD_GATEWAY
            };
            (status, Json(outcome)).into_response()
        }
    }
}
