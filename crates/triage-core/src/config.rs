//! Configuration for the routing engine

use serde::{Deserialize, Serialize};

/// Routing thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Explicit-tier confidence at or above which its first suggestion is taken
    pub explicit_threshold: f64,

    /// Combined confidence below which the fallback tree is consulted
    pub escalation_threshold: f64,

    /// Confidence of the generalist when no tier suggests anything
    pub default_confidence: f64,

    /// Alternatives reported in the trace
    pub max_alternatives: usize,
}

impl RoutingConfig {
    pub fn new() -> Self {
        Self {
            explicit_threshold: 0.9,
            escalation_threshold: 0.7,
            default_confidence: 0.5,
            max_alternatives: 3,
        }
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = RoutingConfig::new();
        assert_eq!(config.explicit_threshold, 0.9);
        assert_eq!(config.escalation_threshold, 0.7);
        assert_eq!(config.default_confidence, 0.5);
        assert_eq!(config.max_alternatives, 3);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: RoutingConfig = serde_json::from_str(r#"{"escalation_threshold":0.6}"#).unwrap();
        assert_eq!(config.escalation_threshold, 0.6);
        assert_eq!(config.explicit_threshold, 0.9);
    }
}
