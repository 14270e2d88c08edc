//! Error types surfaced by the library.
//!
//! Nothing here is fatal to a host: prediction misses and failed placements
//! are ordinary outcomes, not errors. These types cover configuration and
//! observer faults only.

use thiserror::Error;

/// Failure to load or validate [`Settings`](crate::config::Settings).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A provider could not be read or a value had the wrong type.
    #[error("failed to load settings: {0}")]
    Load(#[from] Box<figment::Error>),
    /// A value parsed but lies outside its permitted range.
    #[error("invalid setting `{field}`: {detail}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        detail: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, detail: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            detail: detail.into(),
        }
    }
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Load(Box::new(err))
    }
}

/// Error reported by a state change listener.
///
/// The orchestrator logs and counts these; they never interrupt a tick.
#[derive(Debug, Clone, Error)]
#[error("listener `{listener}` failed: {detail}")]
pub struct ListenerError {
    /// Name the listener registered under.
    pub listener: String,
    /// Description of the failure.
    pub detail: String,
}

impl ListenerError {
    /// Convenience constructor for listener implementations.
    pub fn new(listener: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            listener: listener.into(),
            detail: detail.into(),
        }
    }
}

/// A block name that does not match any [`BlockKind`](crate::world::BlockKind).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown block kind `{0}`")]
pub struct UnknownBlockKind(pub String);
