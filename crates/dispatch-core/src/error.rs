use crate::types::Platform;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("invalid mode '{0}': expected 'delta' or 'initial'")]
    InvalidMode(String),

    #[error("invalid platform: {0}")]
    InvalidPlatform(String),

    #[error("missing {platform} credential: {name} is not set")]
    MissingCredential {
        platform: Platform,
        name: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, DispatchError>;
