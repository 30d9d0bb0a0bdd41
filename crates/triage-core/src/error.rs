//! Error types

use thiserror::Error;

/// Rejected rule definition, raised once at load time
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("rule has an empty id")]
    EmptyId,

    #[error("rule `{0}` has no patterns")]
    NoPatterns(String),

    #[error("rule `{id}` confidence {confidence} is outside [0, 1]")]
    ConfidenceOutOfRange { id: String, confidence: f64 },

    #[error("rule `{id}` has an invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        id: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("duplicate rule id `{0}`")]
    Duplicate(String),
}

/// Rejected capability registry
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("capability profile has an empty handler name")]
    EmptyName,

    #[error("duplicate capability profile for handler `{0}`")]
    DuplicateHandler(String),

    #[error("fallback handler `{0}` has no capability profile")]
    MissingFallback(String),

    #[error("failed to parse capability profiles: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Internal failure while selecting a handler
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RoutingError {
    #[error("{stage} produced a non-finite confidence")]
    NonFiniteConfidence { stage: &'static str },

    #[error("routing panicked: {0}")]
    Panicked(String),
}
