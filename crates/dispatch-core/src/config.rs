use crate::types::Mode;
use serde::Serialize;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Environment variable names
// ---------------------------------------------------------------------------

pub const ENV_GITHUB_TOKEN: &str = "GITHUB_TOKEN";
pub const ENV_GITHUB_REPOSITORY: &str = "GITHUB_REPOSITORY";
pub const ENV_GITHUB_WORKFLOW: &str = "GITHUB_WORKFLOW";

pub const ENV_ADO_ORGANIZATION: &str = "ADO_ORGANIZATION";
pub const ENV_ADO_PROJECT: &str = "ADO_PROJECT";
pub const ENV_ADO_PIPELINE_ID: &str = "ADO_PIPELINE_ID";
pub const ENV_ADO_PAT: &str = "ADO_PAT";

pub const ENV_OVERRIDE_WHATIF: &str = "EASYPIM_WHATIF";
pub const ENV_OVERRIDE_MODE: &str = "EASYPIM_MODE";
pub const ENV_OVERRIDE_VERBOSE: &str = "EASYPIM_VERBOSE";

pub const ENV_HTTP_TIMEOUT_SECS: &str = "EASYPIM_HTTP_TIMEOUT_SECS";

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Workflow file dispatched when `GITHUB_WORKFLOW` is not set.
pub const DEFAULT_GITHUB_WORKFLOW: &str = "easypim-orchestrator.yml";

// ---------------------------------------------------------------------------
// Per-platform credentials
// ---------------------------------------------------------------------------

/// GitHub Actions trigger credentials. Each field is individually optional
/// so a missing value can be reported by name instead of as a blanket
/// "not configured".
#[derive(Debug, Clone, Default)]
pub struct GitHubConfig {
    pub token: Option<String>,
    /// `owner/repo` the workflow-dispatch call targets.
    pub repository: Option<String>,
    pub workflow: String,
}

impl GitHubConfig {
    /// Environment variables still required before this platform can be
    /// triggered, in the order they are checked.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.token.is_none() {
            missing.push(ENV_GITHUB_TOKEN);
        }
        if self.repository.is_none() {
            missing.push(ENV_GITHUB_REPOSITORY);
        }
        missing
    }

    pub fn is_configured(&self) -> bool {
        self.missing().is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct AdoConfig {
    pub organization: Option<String>,
    pub project: Option<String>,
    pub pipeline_id: Option<String>,
    pub pat: Option<String>,
}

impl AdoConfig {
    /// Environment variables still required before this platform can be
    /// triggered, in the order they are checked.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.organization.is_none() {
            missing.push(ENV_ADO_ORGANIZATION);
        }
        if self.project.is_none() {
            missing.push(ENV_ADO_PROJECT);
        }
        if self.pipeline_id.is_none() {
            missing.push(ENV_ADO_PIPELINE_ID);
        }
        if self.pat.is_none() {
            missing.push(ENV_ADO_PAT);
        }
        missing
    }

    pub fn is_configured(&self) -> bool {
        self.missing().is_empty()
    }
}

// ---------------------------------------------------------------------------
// Overrides
// ---------------------------------------------------------------------------

/// Operator-level parameter overrides. A populated field always beats the
/// pattern-derived value; `None` means "not set or not a valid literal", and
/// derivation falls through to the pattern result.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Overrides {
    pub preview_only: Option<bool>,
    pub mode: Option<Mode>,
    pub verbose: Option<bool>,
}

// ---------------------------------------------------------------------------
// DispatchConfig
// ---------------------------------------------------------------------------

/// Immutable snapshot of the process environment taken once and injected
/// into every invocation. Nothing in the dispatch path reads the ambient
/// environment directly, which keeps override precedence unit-testable.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    pub github: GitHubConfig,
    pub ado: AdoConfig,
    pub overrides: Overrides,
    pub http_timeout: Duration,
}

impl DispatchConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a snapshot from an arbitrary lookup function. Tests pass a
    /// closure over a map; `from_env` passes `std::env::var`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let github = GitHubConfig {
            token: non_empty(ENV_GITHUB_TOKEN),
            repository: non_empty(ENV_GITHUB_REPOSITORY),
            workflow: non_empty(ENV_GITHUB_WORKFLOW)
                .unwrap_or_else(|| DEFAULT_GITHUB_WORKFLOW.to_string()),
        };

        let ado = AdoConfig {
            organization: non_empty(ENV_ADO_ORGANIZATION),
            project: non_empty(ENV_ADO_PROJECT),
            pipeline_id: non_empty(ENV_ADO_PIPELINE_ID),
            pat: non_empty(ENV_ADO_PAT),
        };

        let overrides = Overrides {
            preview_only: non_empty(ENV_OVERRIDE_WHATIF)
                .and_then(|raw| parse_bool_override(ENV_OVERRIDE_WHATIF, &raw)),
            mode: non_empty(ENV_OVERRIDE_MODE)
                .and_then(|raw| parse_mode_override(ENV_OVERRIDE_MODE, &raw)),
            verbose: non_empty(ENV_OVERRIDE_VERBOSE)
                .and_then(|raw| parse_bool_override(ENV_OVERRIDE_VERBOSE, &raw)),
        };

        let http_timeout = non_empty(ENV_HTTP_TIMEOUT_SECS)
            .and_then(|raw| match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
                _ => {
                    tracing::warn!(
                        value = %raw,
                        "ignoring invalid {ENV_HTTP_TIMEOUT_SECS}: expected positive integer seconds"
                    );
                    None
                }
            })
            .unwrap_or(Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS));

        Self {
            github,
            ado,
            overrides,
            http_timeout,
        }
    }
}

/// Parse an override boolean. Invalid literals are ignored (with a warning),
/// never fatal: a typo in an operator override must not take the dispatcher
/// down.
fn parse_bool_override(name: &str, raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => {
            tracing::warn!(value = %raw, "ignoring invalid boolean override {name}");
            None
        }
    }
}

fn parse_mode_override(name: &str, raw: &str) -> Option<Mode> {
    match raw.parse::<Mode>() {
        Ok(mode) => Some(mode),
        Err(_) => {
            tracing::warn!(value = %raw, "ignoring invalid mode override {name}");
            None
        }
    }
}
