use crate::types::SecretEvent;
use serde_json::Value;

// ---------------------------------------------------------------------------
// Event type constants (Event Grid wire values)
// ---------------------------------------------------------------------------

pub const VALIDATION_EVENT_TYPE: &str = "Microsoft.EventGrid.SubscriptionValidationEvent";
pub const SECRET_CHANGED_EVENT_TYPE: &str = "Microsoft.KeyVault.SecretNewVersionCreated";

/// Placeholder for payload fields the notification did not carry.
pub const UNKNOWN_PLACEHOLDER: &str = "Unknown";

// ---------------------------------------------------------------------------
// ChangeNotification
// ---------------------------------------------------------------------------

/// Typed view of one inbound Event Grid notification.
///
/// Delivery is at-least-once and this component keeps no state, so the same
/// notification may be dispatched more than once. `event_id` is the delivery
/// system's identifier for the event; callers that need exactly-once
/// triggering must deduplicate on it upstream of this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeNotification {
    pub event_id: Option<String>,
    pub kind: NotificationKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationKind {
    /// One-time subscription handshake; must be answered with the echoed code.
    Validation { validation_code: String },
    /// A new version of a Key Vault secret was created.
    SecretChanged(SecretEvent),
    /// Anything else: non-JSON, unexpected shape, or an event type this
    /// dispatcher does not handle. Treated as a no-op, never an error.
    Unrecognized,
}

impl ChangeNotification {
    /// Parse a raw request body into a typed notification. Total: malformed
    /// bodies yield `Unrecognized` rather than an error, so delivery retries
    /// of junk payloads are not amplified into failures.
    ///
    /// Event Grid posts events as a one-element JSON array; a bare object is
    /// accepted too since test harnesses and the Azure portal send both.
    pub fn parse(body: &[u8]) -> ChangeNotification {
        let value: Value = match serde_json::from_slice(body) {
            Ok(v) => v,
            Err(err) => {
                tracing::warn!(error = %err, "ignoring non-JSON notification body");
                return ChangeNotification {
                    event_id: None,
                    kind: NotificationKind::Unrecognized,
                };
            }
        };

        let event = match &value {
            Value::Array(items) => match items.first() {
                Some(first) => first,
                None => {
                    return ChangeNotification {
                        event_id: None,
                        kind: NotificationKind::Unrecognized,
                    }
                }
            },
            _ => &value,
        };

        let event_id = event
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string);
        let event_type = event.get("eventType").and_then(Value::as_str);
        let data = event.get("data");

        let kind = match event_type {
            Some(VALIDATION_EVENT_TYPE) => {
                match data
                    .and_then(|d| d.get("validationCode"))
                    .and_then(Value::as_str)
                {
                    Some(code) => NotificationKind::Validation {
                        validation_code: code.to_string(),
                    },
                    // A validation event without a code cannot be answered;
                    // fall through to the no-op path.
                    None => NotificationKind::Unrecognized,
                }
            }
            Some(SECRET_CHANGED_EVENT_TYPE) => {
                NotificationKind::SecretChanged(SecretEvent {
                    vault_name: string_field(data, "VaultName"),
                    secret_name: string_field(data, "ObjectName"),
                })
            }
            _ => NotificationKind::Unrecognized,
        };

        ChangeNotification { event_id, kind }
    }
}

/// Read `data.<name>` as a string, substituting the placeholder when the
/// field is absent or not a string.
fn string_field(data: Option<&Value>, name: &str) -> String {
    data.and_then(|d| d.get(name))
        .and_then(Value::as_str)
        .unwrap_or(UNKNOWN_PLACEHOLDER)
        .to_string()
}
