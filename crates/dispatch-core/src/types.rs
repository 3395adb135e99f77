use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Platform
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    #[serde(rename = "github_actions")]
    GitHubActions,
    #[serde(rename = "azure_devops")]
    AzureDevOps,
}

impl Platform {
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::GitHubActions => "github_actions",
            Platform::AzureDevOps => "azure_devops",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Platform {
    type Err = crate::error::DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "github_actions" | "github" => Ok(Platform::GitHubActions),
            "azure_devops" | "ado" => Ok(Platform::AzureDevOps),
            _ => Err(crate::error::DispatchError::InvalidPlatform(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

/// Reconciliation mode forwarded to the downstream orchestrator: `Delta`
/// applies incremental changes, `Initial` performs a full resync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Delta,
    Initial,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Delta => "delta",
            Mode::Initial => "initial",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Mode {
    type Err = crate::error::DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "delta" => Ok(Mode::Delta),
            "initial" => Ok(Mode::Initial),
            _ => Err(crate::error::DispatchError::InvalidMode(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// SecretEvent
// ---------------------------------------------------------------------------

/// The vault and secret a change notification refers to. Fields the payload
/// did not carry are filled with [`crate::event::UNKNOWN_PLACEHOLDER`] so the
/// gap is visible in logs instead of silently dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretEvent {
    pub vault_name: String,
    pub secret_name: String,
}

// ---------------------------------------------------------------------------
// RoutingDecision
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingDecision {
    pub platform: Platform,
}

// ---------------------------------------------------------------------------
// ExecutionParameters
// ---------------------------------------------------------------------------

/// Parameters handed to the triggered pipeline run. Derived from the secret
/// name, then overridden field-by-field by operator configuration; see
/// [`crate::derive::derive_parameters`] for the precedence rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionParameters {
    pub preview_only: bool,
    pub mode: Mode,
    pub verbose: bool,
    pub description: String,
}

impl Default for ExecutionParameters {
    fn default() -> Self {
        Self {
            preview_only: false,
            mode: Mode::Delta,
            verbose: false,
            description: String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// TriggerOutcome
// ---------------------------------------------------------------------------

/// Normalized result of one trigger attempt. Every failure a trigger client
/// can hit — missing credentials, transport errors, non-2xx responses — is
/// folded into this shape; errors never cross the client boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerOutcome {
    pub success: bool,
    pub platform: Platform,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TriggerOutcome {
    pub fn succeeded(
        platform: Platform,
        run_reference: Option<String>,
        run_url: Option<String>,
    ) -> Self {
        Self {
            success: true,
            platform,
            run_reference,
            run_url,
            error: None,
        }
    }

    pub fn failed(platform: Platform, error: impl Into<String>) -> Self {
        Self {
            success: false,
            platform,
            run_reference: None,
            run_url: None,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn mode_parses_case_insensitively() {
        assert_eq!(Mode::from_str("delta").unwrap(), Mode::Delta);
        assert_eq!(Mode::from_str("Initial").unwrap(), Mode::Initial);
        assert_eq!(Mode::from_str("DELTA").unwrap(), Mode::Delta);
    }

    #[test]
    fn mode_rejects_unknown_literal() {
        assert!(Mode::from_str("bogus").is_err());
        assert!(Mode::from_str("").is_err());
    }

    #[test]
    fn platform_round_trips_through_as_str() {
        for p in [Platform::GitHubActions, Platform::AzureDevOps] {
            assert_eq!(Platform::from_str(p.as_str()).unwrap(), p);
        }
    }

    #[test]
    fn failed_outcome_carries_error_and_no_run() {
        let outcome = TriggerOutcome::failed(Platform::AzureDevOps, "boom");
        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("boom"));
        assert!(outcome.run_reference.is_none());
        assert!(outcome.run_url.is_none());
    }

    #[test]
    fn outcome_serializes_without_empty_optionals() {
        let outcome = TriggerOutcome::succeeded(Platform::GitHubActions, None, None);
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["platform"], "github_actions");
        assert!(json.get("error").is_none());
        assert!(json.get("run_url").is_none());
    }
}
