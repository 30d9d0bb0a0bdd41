//! Tier 1: explicit regex rules for coordination and domain hints

use crate::error::RuleError;
use crate::rules::{
    builtin_coordination_rules, builtin_domain_rules, compile_domain_rules,
    compile_pattern_rules, Compiled, DomainRule, PatternRule,
};
use crate::types::{clamp_confidence, ConfidenceTier, MatchResult};

/// pattern_type reported when only domain rules matched
pub const DOMAIN_SPECIFIC: &str = "domain_specific";

#[derive(Debug)]
pub struct ExplicitMatcher {
    coordination_rules: Vec<Compiled<PatternRule>>,
    domain_rules: Vec<Compiled<DomainRule>>,
}

impl ExplicitMatcher {
    pub fn new(
        coordination_rules: Vec<PatternRule>,
        domain_rules: Vec<DomainRule>,
    ) -> Result<Self, RuleError> {
        Ok(Self {
            coordination_rules: compile_pattern_rules(coordination_rules)?,
            domain_rules: compile_domain_rules(domain_rules)?,
        })
    }

    pub fn builtin() -> Result<Self, RuleError> {
        Self::new(builtin_coordination_rules(), builtin_domain_rules())
    }

    pub fn coordination_rule_count(&self) -> usize {
        self.coordination_rules.len()
    }

    pub fn domain_rule_count(&self) -> usize {
        self.domain_rules.len()
    }

    /// Match normalized request text against the rule registries
    pub fn analyze(&self, text: &str) -> MatchResult {
        let mut result = MatchResult::unknown();
        if text.is_empty() {
            return result;
        }

        // Coordination: strongest rule wins, earlier rule on ties
        let mut best: Option<(&Compiled<PatternRule>, &str)> = None;
        for compiled in &self.coordination_rules {
            if let Some(span) = compiled.find(text) {
                let beats = best.map_or(true, |(current, _)| {
                    compiled.rule.confidence > current.rule.confidence
                });
                if beats {
                    best = Some((compiled, span));
                }
            }
        }

        if let Some((compiled, span)) = best {
            result.pattern_type = compiled.rule.id.clone();
            result.confidence = compiled.rule.confidence;
            result.matched_text = span.to_string();
            result.coordination = compiled.rule.coordination;
            if let Some(handler) = &compiled.rule.handler {
                result.suggested_handlers.push(handler.clone());
            }
        }

        // Domains: accumulate hints and union their handlers
        let mut strongest_domain: Option<f64> = None;
        for compiled in &self.domain_rules {
            let Some(span) = compiled.find(text) else {
                continue;
            };
            result.domain_hints.push(compiled.rule.id.clone());
            for handler in &compiled.rule.handlers {
                if !result.suggested_handlers.contains(handler) {
                    result.suggested_handlers.push(handler.clone());
                }
            }
            if result.matched_text.is_empty() {
                result.matched_text = span.to_string();
            }
            strongest_domain = Some(strongest_domain.map_or(compiled.rule.confidence, |s| {
                s.max(compiled.rule.confidence)
            }));
        }

        if let Some(strongest) = strongest_domain {
            if result.is_unknown() {
                result.pattern_type = DOMAIN_SPECIFIC.to_string();
            }
            if ConfidenceTier::from_score(strongest) == ConfidenceTier::High {
                result.confidence = result.confidence.max(ConfidenceTier::Medium.value());
            }
        }

        result.confidence = clamp_confidence(result.confidence);
        tracing::debug!(
            pattern_type = %result.pattern_type,
            confidence = result.confidence,
            domains = ?result.domain_hints,
            "explicit tier matched"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers;
    use crate::text::normalize;
    use crate::types::CoordinationType;

    fn matcher() -> ExplicitMatcher {
        ExplicitMatcher::builtin().unwrap()
    }

    #[test]
    fn test_empty_input_is_unknown() {
        let result = matcher().analyze("");
        assert!(result.is_unknown());
        assert_eq!(result.confidence, ConfidenceTier::Low.value());
        assert!(result.suggested_handlers.is_empty());
    }

    #[test]
    fn test_parallel_request_with_domains() {
        let text = normalize(
            "coordinating comprehensive analysis using 3 tasks in parallel: security, performance, testing",
        );
        let result = matcher().analyze(&text);

        assert_eq!(result.pattern_type, "parallel_coordination");
        assert_eq!(result.confidence, 0.9);
        assert_eq!(result.coordination, Some(CoordinationType::Parallel));
        assert_eq!(result.domain_hints, vec!["security", "performance", "testing"]);
        assert_eq!(result.suggested_handlers[0], handlers::MULTI_DOMAIN_GATEWAY);
        assert!(result
            .suggested_handlers
            .contains(&handlers::TEST_ENGINEER.to_string()));
    }

    #[test]
    fn test_high_domain_raises_to_medium() {
        let result = matcher().analyze("docker container orchestration with kubernetes scaling");
        assert_eq!(result.pattern_type, DOMAIN_SPECIFIC);
        assert_eq!(result.confidence, ConfidenceTier::Medium.value());
        assert_eq!(result.domain_hints, vec!["infrastructure"]);
        assert_eq!(
            result.suggested_handlers,
            vec![handlers::INFRASTRUCTURE_SPECIALIST.to_string()]
        );
    }

    #[test]
    fn test_medium_domain_does_not_raise() {
        let result = matcher().analyze("update the readme");
        assert_eq!(result.pattern_type, DOMAIN_SPECIFIC);
        assert_eq!(result.confidence, ConfidenceTier::Low.value());
    }

    #[test]
    fn test_domain_never_lowers_coordination_confidence() {
        let result = matcher().analyze("delegate the react work to sub-agents");
        assert_eq!(result.pattern_type, "hierarchical_coordination");
        assert_eq!(result.confidence, 0.9);
    }

    #[test]
    fn test_tie_broken_by_registration_order() {
        let result = matcher().analyze("run these step by step, but in parallel where possible");
        assert_eq!(result.pattern_type, "parallel_coordination");
    }

    #[test]
    fn test_stronger_later_rule_wins() {
        let rules = vec![
            PatternRule {
                id: "weak".to_string(),
                patterns: vec![r"\bbatch\b".to_string()],
                confidence: 0.5,
                coordination: Some(CoordinationType::Parallel),
                handler: None,
            },
            PatternRule {
                id: "strong".to_string(),
                patterns: vec![r"\bjobs\b".to_string()],
                confidence: 0.8,
                coordination: Some(CoordinationType::Sequential),
                handler: None,
            },
        ];
        let matcher = ExplicitMatcher::new(rules, Vec::new()).unwrap();
        let result = matcher.analyze("batch these jobs");
        assert_eq!(result.pattern_type, "strong");
        assert_eq!(result.confidence, 0.8);
        assert_eq!(result.matched_text, "jobs");
    }

    #[test]
    fn test_handler_union_is_deduplicated() {
        let domains = vec![
            DomainRule {
                id: "a".to_string(),
                patterns: vec!["alpha".to_string()],
                handlers: vec!["shared".to_string(), "only-a".to_string()],
                confidence: 0.7,
            },
            DomainRule {
                id: "b".to_string(),
                patterns: vec!["beta".to_string()],
                handlers: vec!["shared".to_string()],
                confidence: 0.7,
            },
        ];
        let matcher = ExplicitMatcher::new(Vec::new(), domains).unwrap();
        let result = matcher.analyze("alpha and beta");
        assert_eq!(result.suggested_handlers, vec!["shared", "only-a"]);
    }
}
