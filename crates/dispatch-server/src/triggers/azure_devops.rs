use async_trait::async_trait;
use base64::Engine;
use dispatch_core::config::AdoConfig;
use dispatch_core::types::{ExecutionParameters, Platform, SecretEvent, TriggerOutcome};
use dispatch_core::DispatchError;
use serde_json::Value;
use std::time::Duration;

use super::{truncate_body, PipelineTrigger};

pub const ADO_API_BASE: &str = "https://dev.azure.com";

/// Branch the pipeline run checks out.
const SOURCE_REF: &str = "refs/heads/main";

// ---------------------------------------------------------------------------
// AzureDevOpsTrigger
// ---------------------------------------------------------------------------

/// Triggers an Azure DevOps pipeline via the pipeline-runs endpoint.
pub struct AzureDevOpsTrigger {
    client: reqwest::Client,
    base_url: String,
    config: AdoConfig,
}

impl AzureDevOpsTrigger {
    pub fn new(config: AdoConfig, timeout: Duration) -> anyhow::Result<Self> {
        Self::with_base_url(config, timeout, ADO_API_BASE)
    }

    /// Same as [`new`](Self::new) with an explicit API base URL, so tests can
    /// point the client at a local mock server.
    pub fn with_base_url(
        config: AdoConfig,
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
impl PipelineTrigger for AzureDevOpsTrigger {
    fn platform(&self) -> Platform {
        Platform::AzureDevOps
    }

    async fn trigger(&self, event: &SecretEvent, params: &ExecutionParameters) -> TriggerOutcome {
        // Credential gate: no network call is attempted with an incomplete set.
        if let Some(&name) = self.config.missing().first() {
            let err = DispatchError::MissingCredential {
                platform: Platform::AzureDevOps,
                name,
            };
            tracing::warn!(%err, "azure devops trigger skipped");
            return TriggerOutcome::failed(Platform::AzureDevOps, err.to_string());
        }
        let organization = self.config.organization.as_deref().unwrap_or_default();
        let project = self.config.project.as_deref().unwrap_or_default();
        let pipeline_id = self.config.pipeline_id.as_deref().unwrap_or_default();
        let pat = self.config.pat.as_deref().unwrap_or_default();

        let url = format!(
            "{}/{organization}/{project}/_apis/pipelines/{pipeline_id}/runs?api-version=7.0",
            self.base_url
        );

        // PAT auth: Basic with an empty username.
        let auth = base64::engine::general_purpose::STANDARD.encode(format!(":{pat}"));

        let body = serde_json::json!({
            "resources": {
                "repositories": { "self": { "refName": SOURCE_REF } }
            },
            "templateParameters": {
                "configSecretName": event.secret_name,
                "whatIfMode": params.preview_only,
                "mode": params.mode.to_string(),
                "verbose": params.verbose,
                "runDescription": params.description,
            }
        });

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Basic {auth}"))
            .json(&body)
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(err) => {
                tracing::warn!(error = %err, "azure devops run request failed");
                return TriggerOutcome::failed(
                    Platform::AzureDevOps,
                    format!("pipeline run request failed: {err}"),
                );
            }
        };

        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            tracing::warn!(status = %status, "azure devops run rejected");
            return TriggerOutcome::failed(
                Platform::AzureDevOps,
                format!("pipeline run returned {status}: {}", truncate_body(&text)),
            );
        }

        // Pull the run id and web link out of the response when present; a
        // body we cannot parse still counts as a successful trigger.
        let (run_reference, run_url) = match serde_json::from_str::<Value>(&text) {
            Ok(json) => {
                let reference = json
                    .get("id")
                    .map(|id| id.to_string().trim_matches('"').to_string());
                let url = json
                    .pointer("/_links/web/href")
                    .or_else(|| json.get("url"))
                    .and_then(Value::as_str)
                    .map(str::to_string);
                (reference, url)
            }
            Err(_) => (None, None),
        };

        tracing::info!(
            organization,
            project,
            pipeline_id,
            run = run_reference.as_deref().unwrap_or("unknown"),
            secret = %event.secret_name,
            "azure devops pipeline run queued"
        );
        TriggerOutcome::succeeded(Platform::AzureDevOps, run_reference, run_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispatch_core::types::Mode;

    fn configured() -> AdoConfig {
        AdoConfig {
            organization: Some("contoso".to_string()),
            project: Some("governance".to_string()),
            pipeline_id: Some("42".to_string()),
            pat: Some("test-pat".to_string()),
        }
    }

    fn params() -> ExecutionParameters {
        ExecutionParameters {
            preview_only: false,
            mode: Mode::Initial,
            verbose: true,
            description: "Triggered by secret change: s in v [initial mode]".to_string(),
        }
    }

    fn event() -> SecretEvent {
        SecretEvent {
            vault_name: "kv-prod".to_string(),
            secret_name: "easypim-ado-config".to_string(),
        }
    }

    #[tokio::test]
    async fn missing_pat_fails_without_network_call() {
        let mut server = mockito::Server::new_async().await;
        let mock = server.mock("POST", mockito::Matcher::Any).expect(0).create_async().await;

        let config = AdoConfig {
            pat: None,
            ..configured()
        };
        let trigger =
            AzureDevOpsTrigger::with_base_url(config, Duration::from_secs(1), server.url())
                .unwrap();
        let outcome = trigger.trigger(&event(), &params()).await;

        assert!(!outcome.success);
        assert!(outcome.error.unwrap().contains("ADO_PAT"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn missing_organization_is_named_in_error() {
        let config = AdoConfig {
            organization: None,
            ..configured()
        };
        let trigger = AzureDevOpsTrigger::with_base_url(
            config,
            Duration::from_secs(1),
            "http://127.0.0.1:9",
        )
        .unwrap();
        let outcome = trigger.trigger(&event(), &params()).await;
        assert!(!outcome.success);
        assert!(outcome.error.unwrap().contains("ADO_ORGANIZATION"));
    }

    #[tokio::test]
    async fn successful_run_surfaces_id_and_web_link() {
        let mut server = mockito::Server::new_async().await;
        let basic = base64::engine::general_purpose::STANDARD.encode(":test-pat");
        let mock = server
            .mock(
                "POST",
                "/contoso/governance/_apis/pipelines/42/runs?api-version=7.0",
            )
            .match_header("authorization", format!("Basic {basic}").as_str())
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "resources": {
                    "repositories": { "self": { "refName": "refs/heads/main" } }
                },
                "templateParameters": {
                    "configSecretName": "easypim-ado-config",
                    "whatIfMode": false,
                    "mode": "initial",
                    "verbose": true,
                }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"id":917,"_links":{"web":{"href":"https://dev.azure.com/contoso/governance/_build/results?buildId=917"}}}"#,
            )
            .create_async()
            .await;

        let trigger = AzureDevOpsTrigger::with_base_url(
            configured(),
            Duration::from_secs(5),
            server.url(),
        )
        .unwrap();
        let outcome = trigger.trigger(&event(), &params()).await;

        mock.assert_async().await;
        assert!(outcome.success);
        assert_eq!(outcome.run_reference.as_deref(), Some("917"));
        assert_eq!(
            outcome.run_url.as_deref(),
            Some("https://dev.azure.com/contoso/governance/_build/results?buildId=917")
        );
    }

    #[tokio::test]
    async fn non_2xx_response_becomes_failed_outcome() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock(
                "POST",
                "/contoso/governance/_apis/pipelines/42/runs?api-version=7.0",
            )
            .with_status(401)
            .with_body("TF400813: the user is not authorized")
            .create_async()
            .await;

        let trigger = AzureDevOpsTrigger::with_base_url(
            configured(),
            Duration::from_secs(5),
            server.url(),
        )
        .unwrap();
        let outcome = trigger.trigger(&event(), &params()).await;

        assert!(!outcome.success);
        let error = outcome.error.unwrap();
        assert!(error.contains("401"), "{error}");
        assert!(error.contains("TF400813"), "{error}");
    }

    #[tokio::test]
    async fn unparseable_success_body_still_succeeds() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock(
                "POST",
                "/contoso/governance/_apis/pipelines/42/runs?api-version=7.0",
            )
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let trigger = AzureDevOpsTrigger::with_base_url(
            configured(),
            Duration::from_secs(5),
            server.url(),
        )
        .unwrap();
        let outcome = trigger.trigger(&event(), &params()).await;

        assert!(outcome.success);
        assert!(outcome.run_reference.is_none());
        assert!(outcome.run_url.is_none());
    }
}
