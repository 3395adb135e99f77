pub mod classify;
pub mod config;
pub mod derive;
pub mod error;
pub mod event;
pub mod types;

pub use error::{DispatchError, Result};
