use async_trait::async_trait;
use dispatch_core::config::GitHubConfig;
use dispatch_core::types::{ExecutionParameters, Platform, SecretEvent, TriggerOutcome};
use dispatch_core::DispatchError;
use std::time::Duration;

use super::{truncate_body, PipelineTrigger};

pub const GITHUB_API_BASE: &str = "https://api.github.com";

/// Branch the dispatched workflow runs against.
const WORKFLOW_REF: &str = "main";

// ---------------------------------------------------------------------------
// GitHubActionsTrigger
// ---------------------------------------------------------------------------

/// Triggers a GitHub Actions workflow via the workflow-dispatch endpoint.
///
/// Dispatch creation returns 204 with no body, so a successful outcome
/// carries no run reference; GitHub does not hand one back.
pub struct GitHubActionsTrigger {
    client: reqwest::Client,
    base_url: String,
    config: GitHubConfig,
}

impl GitHubActionsTrigger {
    pub fn new(config: GitHubConfig, timeout: Duration) -> anyhow::Result<Self> {
        Self::with_base_url(config, timeout, GITHUB_API_BASE)
    }

    /// Same as [`new`](Self::new) with an explicit API base URL, so tests can
    /// point the client at a local mock server.
    pub fn with_base_url(
        config: GitHubConfig,
        timeout: Duration,
        base_url: impl Into<String>,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("easypim-dispatch")
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            config,
        })
    }
}

#[async_trait]
impl PipelineTrigger for GitHubActionsTrigger {
    fn platform(&self) -> Platform {
        Platform::GitHubActions
    }

    async fn trigger(&self, event: &SecretEvent, params: &ExecutionParameters) -> TriggerOutcome {
        // Credential gate: no network call is attempted with an incomplete set.
        if let Some(&name) = self.config.missing().first() {
            let err = DispatchError::MissingCredential {
                platform: Platform::GitHubActions,
                name,
            };
            tracing::warn!(%err, "github actions trigger skipped");
            return TriggerOutcome::failed(Platform::GitHubActions, err.to_string());
        }
        let token = self.config.token.as_deref().unwrap_or_default();
        let repository = self.config.repository.as_deref().unwrap_or_default();

        let url = format!(
            "{}/repos/{}/actions/workflows/{}/dispatches",
            self.base_url, repository, self.config.workflow
        );

        // Workflow-dispatch inputs are declared as strings on the workflow
        // side, so the booleans go over the wire stringified.
        let body = serde_json::json!({
            "ref": WORKFLOW_REF,
            "inputs": {
                "configSecretName": event.secret_name,
                "WhatIf": params.preview_only.to_string(),
                "Mode": params.mode.to_string(),
                "Verbose": params.verbose.to_string(),
                "run_description": params.description,
            }
        });

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("token {token}"))
            .header("Accept", "application/vnd.github+json")
            .json(&body)
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(err) => {
                tracing::warn!(error = %err, "github actions dispatch request failed");
                return TriggerOutcome::failed(
                    Platform::GitHubActions,
                    format!("workflow dispatch request failed: {err}"),
                );
            }
        };

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, "github actions dispatch rejected");
            return TriggerOutcome::failed(
                Platform::GitHubActions,
                format!(
                    "workflow dispatch returned {status}: {}",
                    truncate_body(&detail)
                ),
            );
        }

        tracing::info!(
            repository,
            workflow = %self.config.workflow,
            secret = %event.secret_name,
            "github actions workflow dispatched"
        );
        TriggerOutcome::succeeded(Platform::GitHubActions, None, None)
    }
}
