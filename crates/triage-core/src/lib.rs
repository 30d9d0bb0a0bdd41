//! Multi-tier routing of problem descriptions to specialist handlers

mod analyzer;
mod capability;
mod config;
mod engine;
mod error;
mod fallback;
pub mod handlers;
mod matcher;
mod rules;
mod text;
mod types;

pub use analyzer::{builtin_domains, DomainProfile, SemanticContextAnalyzer, HISTORY_WINDOW};
pub use capability::{CapabilityRegistry, CapabilityValidator, HandlerCapabilityProfile};
pub use config::RoutingConfig;
pub use engine::{
    ContextSummary, RouteOutcome, RoutingEngine, RoutingTrace, RuleCounts, Selection,
    SelectionSource, SystemStats, CONTEXT_PATTERN,
};
pub use error::{RegistryError, RoutingError, RuleError};
pub use fallback::{FallbackDecision, FallbackDecisionTree, FallbackRule, DEFAULT_RULE};
pub use matcher::{ExplicitMatcher, DOMAIN_SPECIFIC};
pub use rules::{builtin_coordination_rules, builtin_domain_rules, DomainRule, PatternRule};
pub use text::normalize;
pub use types::{
    ConfidenceTier, CoordinationType, EnrichedContext, MatchResult, PerformanceTier,
    Requirements, ValidationOutcome,
};

pub use triage_learn::{HandlerStats, OutcomeMetrics, SuccessTracker};
