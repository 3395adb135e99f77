use crate::types::{Platform, RoutingDecision};

// ---------------------------------------------------------------------------
// RoutingRule
// ---------------------------------------------------------------------------

/// One routing rule: if any token appears in the (lowercased) secret name,
/// route to `platform`.
pub struct RoutingRule {
    pub id: &'static str,
    pub tokens: &'static [&'static str],
    pub platform: Platform,
}

/// Ordered routing rules. Evaluation is first-match-wins in declaration
/// order, so adding a rule whose tokens overlap an earlier one does not
/// change existing routing.
pub fn routing_rules() -> &'static [RoutingRule] {
    &[RoutingRule {
        id: "azure-devops-tokens",
        tokens: &["ado", "azdo", "devops"],
        platform: Platform::AzureDevOps,
    }]
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

/// Decide which automation platform executes for the given secret name.
/// Total: every name yields exactly one decision, defaulting to GitHub
/// Actions when no rule matches.
pub fn classify(secret_name: &str) -> RoutingDecision {
    let name = secret_name.to_ascii_lowercase();
    for rule in routing_rules() {
        if rule.tokens.iter().any(|t| name.contains(t)) {
            tracing::debug!(rule = rule.id, platform = %rule.platform, "routing rule matched");
            return RoutingDecision {
                platform: rule.platform,
            };
        }
    }
    RoutingDecision {
        platform: Platform::GitHubActions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ado_tokens_route_to_azure_devops() {
        for name in [
            "easypim-ado-config",
            "my-AzDO-secret",
            "policy-DevOps-prod",
            "ado",
            "prefix-ADO",
        ] {
            assert_eq!(classify(name).platform, Platform::AzureDevOps, "{name}");
        }
    }

    #[test]
    fn everything_else_routes_to_github_actions() {
        for name in ["easypim-config", "prod-secret", "", "easypim-initial-setup"] {
            assert_eq!(classify(name).platform, Platform::GitHubActions, "{name}");
        }
    }

    #[test]
    fn token_match_is_case_insensitive() {
        assert_eq!(classify("EASYPIM-ADO").platform, Platform::AzureDevOps);
        assert_eq!(classify("DevOps").platform, Platform::AzureDevOps);
    }

    #[test]
    fn scenario_test_ado_secret_routes_to_azure_devops() {
        assert_eq!(
            classify("easypim-test-ado").platform,
            Platform::AzureDevOps
        );
    }
}
