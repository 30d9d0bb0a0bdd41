//! Routing orchestrator combining the three tiers

use crate::analyzer::SemanticContextAnalyzer;
use crate::capability::{CapabilityRegistry, CapabilityValidator};
use crate::config::RoutingConfig;
use crate::error::{RoutingError, RuleError};
use crate::fallback::{FallbackDecision, FallbackDecisionTree};
use crate::handlers;
use crate::matcher::ExplicitMatcher;
use crate::text::normalize;
use crate::types::{
    clamp_confidence, CoordinationType, EnrichedContext, MatchResult, Requirements,
    ValidationOutcome,
};
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;
use triage_learn::{HandlerStats, OutcomeMetrics, SuccessTracker};

/// Tracker key for selections taken from the semantic tier
pub const CONTEXT_PATTERN: &str = "context_analysis";

/// Which stage produced the selected handler
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "tier", rename_all = "snake_case")]
pub enum SelectionSource {
    Explicit { pattern: String },
    Context,
    Default,
    Fallback { rule: String },
    Degraded,
}

/// Tier-2 summary carried in the trace
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextSummary {
    pub domains: BTreeMap<String, f64>,
    pub coordination: CoordinationType,
    pub requirements: Requirements,
    pub historical_domains: Vec<String>,
    pub confidence: f64,
}

impl From<&EnrichedContext> for ContextSummary {
    fn from(ctx: &EnrichedContext) -> Self {
        Self {
            domains: ctx.domain_scores.clone(),
            coordination: ctx.coordination,
            requirements: ctx.requirements.clone(),
            historical_domains: ctx.historical_domains.clone(),
            confidence: ctx.confidence,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutingTrace {
    pub explicit: Option<MatchResult>,
    pub context: Option<ContextSummary>,
    pub source: SelectionSource,
    /// Whether the fallback tree was consulted
    pub escalated: bool,
    pub fallback: Option<FallbackDecision>,
    pub validation: Option<ValidationOutcome>,
    pub alternatives: Vec<(String, f64)>,
    pub elapsed_us: u64,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    pub handler: String,
    pub confidence: f64,
    pub coordination: CoordinationType,
    pub trace: RoutingTrace,
}

/// Result of [`RoutingEngine::select`].
///
/// `Degraded` still names a usable handler, but it was chosen because the
/// pipeline failed rather than because the generalist fit best.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    Routed(Selection),
    Degraded {
        selection: Selection,
        error: RoutingError,
    },
}

impl RouteOutcome {
    pub fn selection(&self) -> &Selection {
        match self {
            RouteOutcome::Routed(selection) => selection,
            RouteOutcome::Degraded { selection, .. } => selection,
        }
    }

    pub fn handler(&self) -> &str {
        &self.selection().handler
    }

    pub fn confidence(&self) -> f64 {
        self.selection().confidence
    }

    pub fn trace(&self) -> &RoutingTrace {
        &self.selection().trace
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, RouteOutcome::Degraded { .. })
    }

    pub fn error(&self) -> Option<&RoutingError> {
        match self {
            RouteOutcome::Routed(_) => None,
            RouteOutcome::Degraded { error, .. } => Some(error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleCounts {
    pub coordination_rules: usize,
    pub domain_rules: usize,
    pub semantic_domains: usize,
    pub fallback_rules: usize,
    pub capability_profiles: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemStats {
    pub pattern_weights: BTreeMap<String, f64>,
    pub handler_stats: BTreeMap<String, HandlerStats>,
    pub rule_counts: RuleCounts,
}

/// Routes requests through the explicit, semantic and fallback tiers.
///
/// Selection never mutates state. The only mutable part is the success
/// tracker, written by [`RoutingEngine::record_success`] after a handler ran.
#[derive(Debug)]
pub struct RoutingEngine {
    config: RoutingConfig,
    matcher: ExplicitMatcher,
    analyzer: SemanticContextAnalyzer,
    fallback: FallbackDecisionTree,
    validator: CapabilityValidator,
    tracker: RwLock<SuccessTracker>,
}

impl RoutingEngine {
    /// Engine with the builtin rule registries and the given profiles
    pub fn new(config: RoutingConfig, registry: CapabilityRegistry) -> Result<Self, RuleError> {
        let analyzer = SemanticContextAnalyzer::builtin();
        let fallback = FallbackDecisionTree::builtin(analyzer.domains());
        Ok(Self::from_parts(
            config,
            ExplicitMatcher::builtin()?,
            analyzer,
            fallback,
            CapabilityValidator::new(registry),
        ))
    }

    pub fn with_defaults() -> Result<Self, RuleError> {
        Self::new(RoutingConfig::default(), CapabilityRegistry::builtin())
    }

    pub fn from_parts(
        config: RoutingConfig,
        matcher: ExplicitMatcher,
        analyzer: SemanticContextAnalyzer,
        fallback: FallbackDecisionTree,
        validator: CapabilityValidator,
    ) -> Self {
        Self {
            config,
            matcher,
            analyzer,
            fallback,
            validator,
            tracker: RwLock::new(SuccessTracker::new()),
        }
    }

    /// Seed the engine with previously learned weights
    pub fn with_tracker(mut self, tracker: SuccessTracker) -> Self {
        self.tracker = RwLock::new(tracker);
        self
    }

    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        self.validator.registry()
    }

    /// Pick a handler for `request`. Never panics; internal failures come back
    /// as [`RouteOutcome::Degraded`].
    pub fn select(&self, request: &str, history: &[Value]) -> RouteOutcome {
        let started = Instant::now();
        let result = panic::catch_unwind(AssertUnwindSafe(|| self.route(request, history)))
            .unwrap_or_else(|payload| Err(RoutingError::Panicked(panic_message(payload))));
        let elapsed_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

        match result {
            Ok(mut selection) => {
                selection.trace.elapsed_us = elapsed_us;
                tracing::debug!(
                    handler = %selection.handler,
                    confidence = selection.confidence,
                    elapsed_us,
                    "request routed"
                );
                RouteOutcome::Routed(selection)
            }
            Err(error) => {
                tracing::warn!(%error, "routing failed, falling back to generalist");
                RouteOutcome::Degraded {
                    selection: self.degraded_selection(&error, elapsed_us),
                    error,
                }
            }
        }
    }

    /// Feed back an execution outcome; returns the updated pattern weight
    pub fn record_success(&self, request: &str, handler: &str, metrics: OutcomeMetrics) -> f64 {
        let explicit = self.matcher.analyze(&normalize(request));
        let pattern = self.pattern_key(&explicit);
        self.tracker.write().record(pattern, handler, metrics)
    }

    pub fn pattern_weight(&self, pattern: &str) -> f64 {
        self.tracker.read().get_weight(pattern)
    }

    /// Copy of the tracker state
    pub fn tracker_snapshot(&self) -> SuccessTracker {
        self.tracker.read().clone()
    }

    pub fn get_system_stats(&self) -> SystemStats {
        let tracker = self.tracker.read();
        let handler_stats = tracker
            .handlers()
            .filter_map(|h| tracker.get_handler_stats(h).map(|s| (h.to_string(), s)))
            .collect();

        SystemStats {
            pattern_weights: tracker.pattern_weights().into_iter().collect(),
            handler_stats,
            rule_counts: RuleCounts {
                coordination_rules: self.matcher.coordination_rule_count(),
                domain_rules: self.matcher.domain_rule_count(),
                semantic_domains: self.analyzer.domains().len(),
                fallback_rules: self.fallback.len(),
                capability_profiles: self.registry().len(),
            },
        }
    }

    fn route(&self, request: &str, history: &[Value]) -> Result<Selection, RoutingError> {
        let text = normalize(request);
        let (explicit, context) = rayon::join(
            || self.matcher.analyze(&text),
            || self.analyzer.analyze(&text, history),
        );

        let (mut handler, mut confidence, mut source) = self.combine(&explicit, &context)?;

        let escalated = confidence < self.config.escalation_threshold;
        let mut fallback = None;
        if escalated {
            let decision = self.fallback.decide(&context);
            let candidate = ensure_finite(decision.confidence, "fallback tier")?;
            if candidate > confidence {
                handler = decision.handler.clone();
                confidence = clamp_confidence(candidate);
                source = SelectionSource::Fallback {
                    rule: decision.rule.clone(),
                };
            }
            fallback = Some(decision);
        }

        if !self.registry().contains(&handler) {
            tracing::warn!(%handler, "selected handler has no capability profile, using generalist");
            handler = handlers::GENERALIST.to_string();
            confidence = clamp_confidence(self.config.default_confidence);
            source = SelectionSource::Default;
        }

        let validation = self.validator.validate(&handler, &context);
        let final_confidence = ensure_finite(confidence * validation.confidence, "validation")?;

        let registry = self.registry();
        let alternatives = context
            .suggested_handlers
            .iter()
            .filter(|(h, _)| *h != handler && registry.contains(h))
            .take(self.config.max_alternatives)
            .cloned()
            .collect();

        Ok(Selection {
            handler,
            confidence: clamp_confidence(final_confidence),
            coordination: explicit.coordination.unwrap_or(context.coordination),
            trace: RoutingTrace {
                context: Some(ContextSummary::from(&context)),
                explicit: Some(explicit),
                source,
                escalated,
                fallback,
                validation: Some(validation),
                alternatives,
                elapsed_us: 0,
                error: None,
            },
        })
    }

    /// Tracker key for the tier the combine step would take
    fn pattern_key<'a>(&self, explicit: &'a MatchResult) -> &'a str {
        if explicit.confidence >= self.config.explicit_threshold
            && !explicit.suggested_handlers.is_empty()
        {
            &explicit.pattern_type
        } else {
            CONTEXT_PATTERN
        }
    }

    fn combine(
        &self,
        explicit: &MatchResult,
        context: &EnrichedContext,
    ) -> Result<(String, f64, SelectionSource), RoutingError> {
        let tracker = self.tracker.read();
        let pattern = self.pattern_key(explicit);

        if pattern != CONTEXT_PATTERN {
            if let Some(first) = explicit.suggested_handlers.first() {
                let weighted = explicit.confidence * tracker.get_weight(pattern);
                return Ok((
                    first.clone(),
                    clamp_confidence(ensure_finite(weighted, "explicit tier")?),
                    SelectionSource::Explicit {
                        pattern: pattern.to_string(),
                    },
                ));
            }
        }

        if let Some((handler, score)) = context.top_suggestion() {
            let weighted = score * tracker.get_weight(CONTEXT_PATTERN);
            return Ok((
                handler.clone(),
                clamp_confidence(ensure_finite(weighted, "semantic tier")?),
                SelectionSource::Context,
            ));
        }

        Ok((
            handlers::GENERALIST.to_string(),
            clamp_confidence(self.config.default_confidence),
            SelectionSource::Default,
        ))
    }

    fn degraded_selection(&self, error: &RoutingError, elapsed_us: u64) -> Selection {
        Selection {
            handler: handlers::GENERALIST.to_string(),
            confidence: clamp_confidence(self.config.default_confidence),
            coordination: CoordinationType::Hybrid,
            trace: RoutingTrace {
                explicit: None,
                context: None,
                source: SelectionSource::Degraded,
                escalated: false,
                fallback: None,
                validation: None,
                alternatives: Vec::new(),
                elapsed_us,
                error: Some(error.to_string()),
            },
        }
    }
}

fn ensure_finite(value: f64, stage: &'static str) -> Result<f64, RoutingError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(RoutingError::NonFiniteConfidence { stage })
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::builtin_domains;
    use crate::fallback::FallbackRule;

    fn engine() -> RoutingEngine {
        RoutingEngine::with_defaults().unwrap()
    }

    #[test]
    fn test_explicit_tier_wins_when_confident() {
        let outcome = engine().select("run the security scan and the test suite in parallel", &[]);
        assert!(!outcome.is_degraded());
        assert_eq!(outcome.handler(), handlers::MULTI_DOMAIN_GATEWAY);
        assert_eq!(
            outcome.trace().source,
            SelectionSource::Explicit {
                pattern: "parallel_coordination".to_string()
            }
        );
        assert!(!outcome.trace().escalated);
    }

    #[test]
    fn test_empty_request_uses_default_rule() {
        let outcome = engine().select("", &[]);
        assert_eq!(outcome.handler(), handlers::GENERALIST);
        assert!((outcome.confidence() - 0.6).abs() < 1e-9);
        assert!(outcome.trace().escalated);
        assert_eq!(
            outcome.trace().source,
            SelectionSource::Fallback {
                rule: "default".to_string()
            }
        );
    }

    #[test]
    fn test_alternatives_exclude_selection() {
        let outcome = engine().select("profile the slow database api and optimize the cache", &[]);
        let trace = outcome.trace();
        assert!(trace.alternatives.len() <= 3);
        assert!(trace.alternatives.iter().all(|(h, _)| h != outcome.handler()));
    }

    #[test]
    fn test_panicking_tier_degrades() {
        let analyzer = SemanticContextAnalyzer::builtin();
        let mut fallback = FallbackDecisionTree::new(handlers::GENERALIST, 0.6);
        fallback.push(FallbackRule::new("explodes", "nobody", 0.9, |_| {
            panic!("predicate blew up")
        }));
        let engine = RoutingEngine::from_parts(
            RoutingConfig::default(),
            ExplicitMatcher::builtin().unwrap(),
            analyzer,
            fallback,
            CapabilityValidator::new(CapabilityRegistry::builtin()),
        );

        let outcome = engine.select("", &[]);
        assert!(outcome.is_degraded());
        assert_eq!(outcome.handler(), handlers::GENERALIST);
        assert_eq!(outcome.confidence(), 0.5);
        assert_eq!(outcome.trace().source, SelectionSource::Degraded);
        assert!(matches!(
            outcome.error(),
            Some(RoutingError::Panicked(msg)) if msg.contains("predicate blew up")
        ));
        assert!(outcome.trace().error.is_some());
    }

    #[test]
    fn test_non_finite_fallback_confidence_degrades() {
        let mut fallback = FallbackDecisionTree::new(handlers::GENERALIST, 0.6);
        fallback.push(FallbackRule::new("unbounded", handlers::GENERALIST, f64::NAN, |_| true));
        let engine = RoutingEngine::from_parts(
            RoutingConfig::default(),
            ExplicitMatcher::builtin().unwrap(),
            SemanticContextAnalyzer::builtin(),
            fallback,
            CapabilityValidator::new(CapabilityRegistry::builtin()),
        );

        let outcome = engine.select("", &[]);
        assert!(outcome.is_degraded());
        assert_eq!(outcome.handler(), handlers::GENERALIST);
        assert_eq!(outcome.confidence(), 0.5);
        assert_eq!(
            outcome.error(),
            Some(&RoutingError::NonFiniteConfidence {
                stage: "fallback tier"
            })
        );
        assert!(outcome
            .trace()
            .error
            .as_deref()
            .is_some_and(|e| e.contains("non-finite")));
    }

    #[test]
    fn test_unregistered_handler_replaced_by_generalist() {
        let registry = CapabilityRegistry::from_json(
            r#"[{"name": "generalist", "domains": ["security"], "coordination": ["hybrid", "parallel"], "performance": "medium"}]"#,
        )
        .unwrap();
        let engine = RoutingEngine::new(RoutingConfig::default(), registry).unwrap();

        let outcome = engine.select(
            "coordinating comprehensive analysis using 3 tasks in parallel: security, performance, testing",
            &[],
        );
        assert!(!outcome.is_degraded());
        assert_eq!(outcome.handler(), handlers::GENERALIST);
        assert_eq!(outcome.trace().source, SelectionSource::Default);
        assert!(outcome.trace().alternatives.is_empty());
        let validation = outcome.trace().validation.as_ref().unwrap();
        assert!(validation.is_valid);
        assert!((outcome.confidence() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_seeded_tracker_weight_is_bounded() {
        let mut tracker = SuccessTracker::new();
        for _ in 0..5 {
            tracker.record(
                "parallel_coordination",
                handlers::MULTI_DOMAIN_GATEWAY,
                OutcomeMetrics::with_accuracy(1.0),
            );
        }
        let mut state = serde_json::to_value(&tracker).unwrap();
        state["weights"]["parallel_coordination"] = serde_json::json!(50.0);
        let seeded: SuccessTracker = serde_json::from_value(state).unwrap();

        let engine = engine().with_tracker(seeded);
        assert_eq!(engine.pattern_weight("parallel_coordination"), triage_learn::MAX_WEIGHT);
        assert_eq!(
            engine.tracker_snapshot().sample_count("parallel_coordination", handlers::MULTI_DOMAIN_GATEWAY),
            5
        );
        let outcome = engine.select("run the security scan and the test suite in parallel", &[]);
        assert!(outcome.confidence() <= 1.0);
    }

    #[test]
    fn test_record_success_uses_selection_pattern() {
        let engine = engine();
        let parallel = "fan out the security audit in parallel";
        for _ in 0..5 {
            engine.record_success(
                parallel,
                handlers::MULTI_DOMAIN_GATEWAY,
                OutcomeMetrics::with_accuracy(0.97),
            );
        }
        assert!((engine.pattern_weight("parallel_coordination") - 1.1).abs() < 1e-9);
        assert_eq!(engine.pattern_weight(CONTEXT_PATTERN), 1.0);

        for _ in 0..5 {
            engine.record_success(
                "docker container orchestration with kubernetes scaling",
                handlers::INFRASTRUCTURE_SPECIALIST,
                OutcomeMetrics::with_accuracy(0.2),
            );
        }
        assert!((engine.pattern_weight(CONTEXT_PATTERN) - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_system_stats() {
        let engine = engine();
        engine.record_success("anything", handlers::GENERALIST, OutcomeMetrics::with_accuracy(0.9));

        let stats = engine.get_system_stats();
        assert_eq!(stats.rule_counts.coordination_rules, 3);
        assert_eq!(stats.rule_counts.domain_rules, 8);
        assert_eq!(stats.rule_counts.semantic_domains, builtin_domains().len());
        assert_eq!(stats.rule_counts.fallback_rules, 2 + builtin_domains().len() + 1);
        assert_eq!(stats.rule_counts.capability_profiles, 15);
        assert_eq!(stats.handler_stats[handlers::GENERALIST].samples, 1);
        assert!(stats.pattern_weights.is_empty());
    }

    #[test]
    fn test_engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RoutingEngine>();
    }
}
