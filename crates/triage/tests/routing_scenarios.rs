mod common;

use common::engine;
use triage_core::{
    handlers, normalize, CapabilityRegistry, CapabilityValidator, CoordinationType,
    ExplicitMatcher, SelectionSource, SemanticContextAnalyzer, DEFAULT_RULE,
};
use triage_learn::{OutcomeMetrics, SuccessTracker};

#[test]
fn test_parallel_multi_domain_request_goes_to_gateway() {
    let request =
        "coordinating comprehensive analysis using 3 tasks in parallel: security, performance, testing";

    let explicit = ExplicitMatcher::builtin().unwrap().analyze(&normalize(request));
    assert_eq!(explicit.confidence, 0.9);
    assert_eq!(explicit.domain_hints, vec!["security", "performance", "testing"]);

    let outcome = engine().select(request, &[]);
    assert!(!outcome.is_degraded());
    assert_eq!(outcome.handler(), handlers::MULTI_DOMAIN_GATEWAY);
    assert_eq!(outcome.selection().coordination, CoordinationType::Parallel);
    assert!((outcome.confidence() - 0.9).abs() < 1e-9);

    let context = outcome.trace().context.as_ref().unwrap();
    assert_eq!(context.coordination, CoordinationType::Parallel);
    assert_eq!(context.domains.len(), 3);
}

#[test]
fn test_empty_request_falls_back_to_generalist() {
    let outcome = engine().select("", &[]);

    assert_eq!(outcome.handler(), handlers::GENERALIST);
    let trace = outcome.trace();
    assert_eq!(trace.fallback.as_ref().unwrap().rule, DEFAULT_RULE);
    let factor = trace.validation.as_ref().unwrap().confidence;
    assert!((outcome.confidence() - 0.6 * factor).abs() < 1e-9);
    assert!(trace.explicit.as_ref().unwrap().is_unknown());
}

#[test]
fn test_infrastructure_request_goes_to_specialist() {
    let request = "docker container orchestration with kubernetes scaling";
    let context = SemanticContextAnalyzer::builtin().analyze(&normalize(request), &[]);
    assert!(context.domain_score("infrastructure") > 0.0);
    assert_eq!(context.coordination, CoordinationType::Hybrid);

    let outcome = engine().select(request, &[]);
    assert_eq!(outcome.handler(), handlers::INFRASTRUCTURE_SPECIALIST);
    assert_eq!(
        outcome.trace().source,
        SelectionSource::Fallback {
            rule: "infrastructure_specialist".to_string()
        }
    );
    assert!((outcome.confidence() - 0.8).abs() < 1e-9);
}

#[test]
fn test_five_accurate_outcomes_raise_weight() {
    let mut tracker = SuccessTracker::new();
    for _ in 0..5 {
        tracker.record(
            "parallel_coordination",
            "handler-x",
            OutcomeMetrics::with_accuracy(0.97),
        );
    }
    assert!((tracker.get_weight("parallel_coordination") - 1.1).abs() < 1e-9);
}

#[test]
fn test_coordination_mismatch_is_one_issue() {
    let context =
        SemanticContextAnalyzer::builtin().analyze(&normalize("security review in parallel"), &[]);
    assert_eq!(context.coordination, CoordinationType::Parallel);

    let validator = CapabilityValidator::new(CapabilityRegistry::builtin());
    let outcome = validator.validate(handlers::SECURITY_AUDITOR, &context);

    assert!(!outcome.is_valid);
    assert_eq!(outcome.issues.len(), 1);
    assert!((outcome.confidence - 0.8).abs() < 1e-9);
}

#[test]
fn test_history_feeds_trace() {
    let outcome = engine().select("review the endpoint", &common::sample_history());
    let context = outcome.trace().context.as_ref().unwrap();
    assert!(context
        .historical_domains
        .contains(&"historical_security".to_string()));
    assert!(context
        .historical_domains
        .contains(&"historical_testing".to_string()));
}

#[test]
fn test_learned_weight_changes_selection_confidence() {
    let engine = engine();
    let request = "run the security scan and the test suite in parallel";
    let before = engine.select(request, &[]).confidence();

    for _ in 0..5 {
        engine.record_success(
            request,
            handlers::MULTI_DOMAIN_GATEWAY,
            OutcomeMetrics::with_accuracy(0.3),
        );
    }
    let after = engine.select(request, &[]);

    assert!((before - 0.9).abs() < 1e-9);
    assert!((after.confidence() - 0.81).abs() < 1e-9);
    assert_eq!(after.handler(), handlers::MULTI_DOMAIN_GATEWAY);
}
