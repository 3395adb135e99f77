use crate::triggers::TriggerSet;
use dispatch_core::config::DispatchConfig;
use std::sync::Arc;

/// Shared application state passed to all route handlers.
///
/// The configuration snapshot is immutable for the life of the process;
/// handlers only ever read it, so concurrent invocations need no locking.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<DispatchConfig>,
    pub triggers: TriggerSet,
}

impl AppState {
    pub fn new(config: DispatchConfig) -> anyhow::Result<Self> {
        let triggers = TriggerSet::from_config(&config)?;
        Ok(Self {
            config: Arc::new(config),
            triggers,
        })
    }

    /// Build state with caller-supplied trigger clients. Integration tests
    /// use this to observe dispatches without network calls.
    pub fn with_triggers(config: DispatchConfig, triggers: TriggerSet) -> Self {
        Self {
            config: Arc::new(config),
            triggers,
        }
    }
}
