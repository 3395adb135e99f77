use axum::extract::State;
use axum::Json;

use crate::state::AppState;

/// GET /api/health — liveness plus a summary of which trigger platforms have
/// a complete credential set. Never exposes secret material.
pub async fn health(State(app): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "platforms": {
            "github_actions": { "configured": app.config.github.is_configured() },
            "azure_devops": { "configured": app.config.ado.is_configured() },
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispatch_core::config::DispatchConfig;

    #[tokio::test]
    async fn health_reports_unconfigured_platforms() {
        let app = AppState::new(DispatchConfig::from_lookup(|_| None)).unwrap();
        let Json(body) = health(State(app)).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["platforms"]["github_actions"]["configured"], false);
        assert_eq!(body["platforms"]["azure_devops"]["configured"], false);
    }
}
