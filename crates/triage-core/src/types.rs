//! Core types for handler routing

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Execution shape requested or implied by a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinationType {
    Single,
    Parallel,
    Sequential,
    Hierarchical,
    /// No dominant signal; the handler decides how to split work
    Hybrid,
}

impl CoordinationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoordinationType::Single => "single",
            CoordinationType::Parallel => "parallel",
            CoordinationType::Sequential => "sequential",
            CoordinationType::Hierarchical => "hierarchical",
            CoordinationType::Hybrid => "hybrid",
        }
    }

    pub const ALL: [CoordinationType; 5] = [
        CoordinationType::Single,
        CoordinationType::Parallel,
        CoordinationType::Sequential,
        CoordinationType::Hierarchical,
        CoordinationType::Hybrid,
    ];
}

/// Latency class a handler is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceTier {
    Ultra,
    High,
    Medium,
    Strategic,
}

impl PerformanceTier {
    /// Whether the tier can honor a "fast" requirement
    pub fn is_fast(&self) -> bool {
        matches!(self, PerformanceTier::Ultra | PerformanceTier::High)
    }
}

/// Named confidence levels used by the rule tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    /// HIGH (0.9): explicit pattern hit
    High,
    /// MEDIUM (0.7): strong but indirect signal
    Medium,
    /// LOW (0.3): nothing matched
    Low,
}

impl ConfidenceTier {
    pub fn value(&self) -> f64 {
        match self {
            ConfidenceTier::High => 0.9,
            ConfidenceTier::Medium => 0.7,
            ConfidenceTier::Low => 0.3,
        }
    }

    pub fn from_score(score: f64) -> Self {
        if score >= 0.9 {
            ConfidenceTier::High
        } else if score >= 0.7 {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }
}

/// Clamp a confidence into [0, 1]; NaN collapses to 0
pub fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Tier-1 (explicit pattern) result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub pattern_type: String,
    pub confidence: f64,
    pub matched_text: String,
    /// Matched domain rule ids, in rule registration order
    pub domain_hints: Vec<String>,
    pub coordination: Option<CoordinationType>,
    pub suggested_handlers: Vec<String>,
}

impl MatchResult {
    pub const UNKNOWN: &'static str = "unknown";

    pub fn unknown() -> Self {
        Self {
            pattern_type: Self::UNKNOWN.to_string(),
            confidence: ConfidenceTier::Low.value(),
            matched_text: String::new(),
            domain_hints: Vec::new(),
            coordination: None,
            suggested_handlers: Vec::new(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.pattern_type == Self::UNKNOWN
    }
}

/// Requirement indicator hits extracted from a request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirements {
    pub fast: usize,
    pub thorough: usize,
    pub parallel: usize,
    pub sequential: usize,
    /// Tightest explicit `<Ns` bound in the request
    pub max_seconds: Option<u64>,
}

impl Requirements {
    pub fn needs_fast(&self) -> bool {
        self.fast > 0
    }

    /// Number of requirement kinds that fired (time bound included)
    pub fn category_count(&self) -> usize {
        [self.fast, self.thorough, self.parallel, self.sequential]
            .iter()
            .filter(|&&hits| hits > 0)
            .count()
            + usize::from(self.max_seconds.is_some())
    }
}

/// Tier-2 (semantic context) result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedContext {
    pub text: String,
    /// Matched domains only; every score is in (0, 1]
    pub domain_scores: BTreeMap<String, f64>,
    pub coordination: CoordinationType,
    pub requirements: Requirements,
    /// Texts of the well-formed entries among the last five history items
    pub history_window: Vec<String>,
    pub historical_domains: Vec<String>,
    pub confidence: f64,
    /// Ranked (handler, score), best first
    pub suggested_handlers: Vec<(String, f64)>,
}

impl EnrichedContext {
    pub fn domain_score(&self, domain: &str) -> f64 {
        self.domain_scores.get(domain).copied().unwrap_or(0.0)
    }

    pub fn top_suggestion(&self) -> Option<&(String, f64)> {
        self.suggested_handlers.first()
    }
}

/// Result of checking a handler against a request's requirements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub is_valid: bool,
    pub confidence: f64,
    pub issues: Vec<String>,
    pub recommendations: Vec<String>,
}
