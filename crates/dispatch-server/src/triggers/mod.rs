//! Pipeline trigger clients.
//!
//! One trait, two implementations. Both platforms get the same derivation
//! output; only the wire shape differs. All failures — missing credentials,
//! transport errors, non-2xx responses — become a failed
//! [`TriggerOutcome`]; nothing here panics or returns an error to the
//! dispatcher, and no retries are attempted (retry responsibility sits with
//! the event-delivery system via HTTP status semantics).

pub mod azure_devops;
pub mod github;

use async_trait::async_trait;
use dispatch_core::config::DispatchConfig;
use dispatch_core::types::{ExecutionParameters, Platform, SecretEvent, TriggerOutcome};
use std::sync::Arc;

pub use azure_devops::AzureDevOpsTrigger;
pub use github::GitHubActionsTrigger;

// ---------------------------------------------------------------------------
// PipelineTrigger
// ---------------------------------------------------------------------------

#[async_trait]
pub trait PipelineTrigger: Send + Sync {
    fn platform(&self) -> Platform;

    /// Issue one trigger call for the given secret change.
    async fn trigger(&self, event: &SecretEvent, params: &ExecutionParameters) -> TriggerOutcome;
}

// ---------------------------------------------------------------------------
// TriggerSet
// ---------------------------------------------------------------------------

/// The two trigger clients, one per platform. Routing is exclusive: a single
/// invocation uses exactly one of them.
#[derive(Clone)]
pub struct TriggerSet {
    github: Arc<dyn PipelineTrigger>,
    azure_devops: Arc<dyn PipelineTrigger>,
}

impl TriggerSet {
    pub fn new(github: Arc<dyn PipelineTrigger>, azure_devops: Arc<dyn PipelineTrigger>) -> Self {
        Self {
            github,
            azure_devops,
        }
    }

    pub fn from_config(config: &DispatchConfig) -> anyhow::Result<Self> {
        Ok(Self::new(
            Arc::new(GitHubActionsTrigger::new(
                config.github.clone(),
                config.http_timeout,
            )?),
            Arc::new(AzureDevOpsTrigger::new(
                config.ado.clone(),
                config.http_timeout,
            )?),
        ))
    }

    pub fn for_platform(&self, platform: Platform) -> &Arc<dyn PipelineTrigger> {
        match platform {
            Platform::GitHubActions => &self.github,
            Platform::AzureDevOps => &self.azure_devops,
        }
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Cap response bodies quoted in error strings so a chatty upstream cannot
/// flood the logs.
pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 300;
    if body.len() <= MAX {
        body.to_string()
    } else {
        let cut = body
            .char_indices()
            .take_while(|(i, _)| *i <= MAX)
            .last()
            .map(|(i, _)| i)
            .unwrap_or(0);
        format!("{}…", &body[..cut])
    }
}
