use crate::config::Overrides;
use crate::types::{ExecutionParameters, Mode};

// ---------------------------------------------------------------------------
// ParameterRule
// ---------------------------------------------------------------------------

/// One derivation rule: if any token appears in the (lowercased) secret
/// name, apply the effect. Unlike routing, every matching rule fires — the
/// effects accumulate.
pub struct ParameterRule {
    pub id: &'static str,
    pub tokens: &'static [&'static str],
    pub apply: fn(&mut ExecutionParameters),
}

/// Ordered derivation rules, evaluated in declaration order.
pub fn parameter_rules() -> &'static [ParameterRule] {
    &[
        ParameterRule {
            id: "preview-on-test-or-debug",
            tokens: &["test", "debug"],
            apply: |p| p.preview_only = true,
        },
        ParameterRule {
            id: "initial-on-setup-tokens",
            tokens: &["initial", "setup", "bootstrap"],
            apply: |p| p.mode = Mode::Initial,
        },
        ParameterRule {
            id: "verbose-on-debug-tokens",
            tokens: &["verbose", "debug"],
            apply: |p| p.verbose = true,
        },
    ]
}

// ---------------------------------------------------------------------------
// Derivation
// ---------------------------------------------------------------------------

/// Compute execution parameters for a secret change.
///
/// Precedence, lowest to highest: built-in defaults, then pattern rules on
/// the secret name, then operator overrides. An override that is present
/// always wins — operators can force known-safe behavior fleet-wide without
/// renaming secrets or redeploying.
pub fn derive_parameters(
    secret_name: &str,
    vault_name: &str,
    overrides: &Overrides,
) -> ExecutionParameters {
    let mut params = ExecutionParameters::default();

    let name = secret_name.to_ascii_lowercase();
    for rule in parameter_rules() {
        if rule.tokens.iter().any(|t| name.contains(t)) {
            tracing::debug!(rule = rule.id, "parameter rule matched");
            (rule.apply)(&mut params);
        }
    }

    if let Some(preview) = overrides.preview_only {
        params.preview_only = preview;
    }
    if let Some(mode) = overrides.mode {
        params.mode = mode;
    }
    if let Some(verbose) = overrides.verbose {
        params.verbose = verbose;
    }

    params.description = build_description(secret_name, vault_name, &params);
    params
}

/// Human-readable run description. Purely informational; nothing parses it
/// back.
fn build_description(secret_name: &str, vault_name: &str, params: &ExecutionParameters) -> String {
    let mut description = format!("Triggered by secret change: {secret_name} in {vault_name}");
    if params.mode == Mode::Initial {
        description.push_str(" [initial mode]");
    }
    if params.preview_only {
        description.push_str(" [preview only]");
    }
    description
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_overrides() -> Overrides {
        Overrides::default()
    }

    #[test]
    fn plain_name_gets_defaults() {
        let params = derive_parameters("easypim-config", "kv-prod", &no_overrides());
        assert!(!params.preview_only);
        assert_eq!(params.mode, Mode::Delta);
        assert!(!params.verbose);
        assert_eq!(
            params.description,
            "Triggered by secret change: easypim-config in kv-prod"
        );
    }

    #[test]
    fn test_and_debug_names_enable_preview() {
        for name in ["easypim-test", "a-TEST-b", "debug-policy"] {
            let params = derive_parameters(name, "kv", &no_overrides());
            assert!(params.preview_only, "{name}");
        }
    }

    #[test]
    fn setup_tokens_select_initial_mode() {
        for name in ["easypim-initial", "pim-setup", "bootstrap-policies"] {
            let params = derive_parameters(name, "kv", &no_overrides());
            assert_eq!(params.mode, Mode::Initial, "{name}");
        }
    }

    #[test]
    fn debug_name_enables_both_preview_and_verbose() {
        let params = derive_parameters("easypim-debug", "kv", &no_overrides());
        assert!(params.preview_only);
        assert!(params.verbose);
    }

    #[test]
    fn override_beats_pattern_result() {
        let overrides = Overrides {
            preview_only: Some(false),
            mode: Some(Mode::Delta),
            verbose: None,
        };
        // Name says preview+initial; overrides force both back off.
        let params = derive_parameters("easypim-test-setup", "kv", &overrides);
        assert!(!params.preview_only);
        assert_eq!(params.mode, Mode::Delta);
    }

    #[test]
    fn override_forces_preview_on_plain_name() {
        let overrides = Overrides {
            preview_only: Some(true),
            ..Overrides::default()
        };
        let params = derive_parameters("easypim-config", "kv", &overrides);
        assert!(params.preview_only);
    }

    #[test]
    fn absent_override_leaves_pattern_value() {
        let params = derive_parameters("easypim-test", "kv", &no_overrides());
        assert!(params.preview_only);
    }

    #[test]
    fn description_annotates_active_flags() {
        let params = derive_parameters("easypim-initial-test", "kv-prod", &no_overrides());
        assert_eq!(
            params.description,
            "Triggered by secret change: easypim-initial-test in kv-prod [initial mode] [preview only]"
        );
    }

    #[test]
    fn scenario_test_ado_secret() {
        let params = derive_parameters("easypim-test-ado", "kv", &no_overrides());
        assert!(params.preview_only);
        assert_eq!(params.mode, Mode::Delta);
        assert!(!params.verbose);
    }

    #[test]
    fn scenario_initial_setup_secret() {
        let params = derive_parameters("easypim-initial-setup", "kv", &no_overrides());
        assert!(!params.preview_only);
        assert_eq!(params.mode, Mode::Initial);
    }
}
