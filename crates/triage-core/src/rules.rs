//! Explicit rule definitions and the builtin rule registries

use crate::error::RuleError;
use crate::handlers;
use crate::types::{ConfidenceTier, CoordinationType};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Coordination rule: any pattern hit marks the request with `coordination`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternRule {
    pub id: String,
    pub patterns: Vec<String>,
    pub confidence: f64,
    #[serde(default)]
    pub coordination: Option<CoordinationType>,
    /// Handler that owns this kind of coordination, suggested ahead of domain handlers
    #[serde(default)]
    pub handler: Option<String>,
}

/// Domain rule: any pattern hit adds the domain as a hint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainRule {
    pub id: String,
    pub patterns: Vec<String>,
    pub handlers: Vec<String>,
    pub confidence: f64,
}

#[derive(Debug)]
pub(crate) struct Compiled<R> {
    pub rule: R,
    pub regexes: Vec<Regex>,
}

impl<R> Compiled<R> {
    /// First matched span across the rule's patterns, in pattern order
    pub fn find<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.regexes
            .iter()
            .find_map(|re| re.find(text))
            .map(|m| m.as_str())
    }
}

fn compile(id: &str, patterns: &[String], confidence: f64) -> Result<Vec<Regex>, RuleError> {
    if id.trim().is_empty() {
        return Err(RuleError::EmptyId);
    }
    if patterns.is_empty() {
        return Err(RuleError::NoPatterns(id.to_string()));
    }
    if !(0.0..=1.0).contains(&confidence) {
        return Err(RuleError::ConfidenceOutOfRange {
            id: id.to_string(),
            confidence,
        });
    }
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(pattern).map_err(|source| RuleError::InvalidPattern {
                id: id.to_string(),
                pattern: pattern.clone(),
                source,
            })
        })
        .collect()
}

fn check_unique<'a>(ids: impl Iterator<Item = &'a str>) -> Result<(), RuleError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(RuleError::Duplicate(id.to_string()));
        }
    }
    Ok(())
}

pub(crate) fn compile_pattern_rules(
    rules: Vec<PatternRule>,
) -> Result<Vec<Compiled<PatternRule>>, RuleError> {
    check_unique(rules.iter().map(|r| r.id.as_str()))?;
    rules
        .into_iter()
        .map(|rule| {
            let regexes = compile(&rule.id, &rule.patterns, rule.confidence)?;
            Ok(Compiled { rule, regexes })
        })
        .collect()
}

pub(crate) fn compile_domain_rules(
    rules: Vec<DomainRule>,
) -> Result<Vec<Compiled<DomainRule>>, RuleError> {
    check_unique(rules.iter().map(|r| r.id.as_str()))?;
    rules
        .into_iter()
        .map(|rule| {
            let regexes = compile(&rule.id, &rule.patterns, rule.confidence)?;
            Ok(Compiled { rule, regexes })
        })
        .collect()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn coordination_rule(
    id: &str,
    coordination: CoordinationType,
    handler: &str,
    patterns: &[&str],
) -> PatternRule {
    PatternRule {
        id: id.to_string(),
        patterns: strings(patterns),
        confidence: ConfidenceTier::High.value(),
        coordination: Some(coordination),
        handler: Some(handler.to_string()),
    }
}

fn domain_rule(id: &str, tier: ConfidenceTier, handlers: &[&str], patterns: &[&str]) -> DomainRule {
    DomainRule {
        id: id.to_string(),
        patterns: strings(patterns),
        handlers: strings(handlers),
        confidence: tier.value(),
    }
}

/// Coordination rules in evaluation order
pub fn builtin_coordination_rules() -> Vec<PatternRule> {
    vec![
        coordination_rule(
            "parallel_coordination",
            CoordinationType::Parallel,
            handlers::MULTI_DOMAIN_GATEWAY,
            &[
                r"\bin parallel\b",
                r"\bparallel(ly)?\b",
                r"\bconcurrent(ly)?\b",
                r"\bsimultaneous(ly)?\b",
                r"\b\d+\s+(tasks|agents|workers)\b",
            ],
        ),
        coordination_rule(
            "sequential_coordination",
            CoordinationType::Sequential,
            handlers::WORKFLOW_ORCHESTRATOR,
            &[
                r"\bstep[- ]by[- ]step\b",
                r"\bsequential(ly)?\b",
                r"\bfirst\b.*\bthen\b",
                r"\bfollowed by\b",
            ],
        ),
        coordination_rule(
            "hierarchical_coordination",
            CoordinationType::Hierarchical,
            handlers::META_COORDINATOR,
            &[
                r"\bhierarch\w*",
                r"\bdelegat\w*",
                r"\bsub-?agents?\b",
                r"\bsupervis\w*",
                r"\bmeta[- ]coordinat\w*",
            ],
        ),
    ]
}

/// Domain rules in evaluation order
pub fn builtin_domain_rules() -> Vec<DomainRule> {
    use ConfidenceTier::{High, Medium};

    vec![
        domain_rule(
            "security",
            High,
            &[handlers::SECURITY_AUDITOR],
            &[
                r"\bsecurity\b",
                r"\bvulnerab\w*",
                r"\bauth(entication|orization)?\b",
                r"\bencrypt\w*",
                r"\bcve-\d+",
                r"\b(xss|csrf|sql injection)\b",
            ],
        ),
        domain_rule(
            "performance",
            High,
            &[handlers::PERFORMANCE_ENGINEER],
            &[
                r"\bperformance\b",
                r"\boptimi[sz]\w*",
                r"\blatency\b",
                r"\bthroughput\b",
                r"\bbottlenecks?\b",
                r"\bprofil(e|ing|er)\b",
            ],
        ),
        domain_rule(
            "testing",
            High,
            &[handlers::TEST_ENGINEER],
            &[
                r"\btest(s|ing)?\b",
                r"\bcoverage\b",
                r"\bregression\b",
                r"\b(e2e|qa)\b",
            ],
        ),
        domain_rule(
            "infrastructure",
            High,
            &[handlers::INFRASTRUCTURE_SPECIALIST],
            &[
                r"\bdocker\w*",
                r"\bkubernetes\b",
                r"\bk8s\b",
                r"\bcontainers?\b",
                r"\bterraform\b",
                r"\bhelm\b",
                r"\bdeploy\w*",
            ],
        ),
        domain_rule(
            "frontend",
            Medium,
            &[handlers::FRONTEND_DEVELOPER],
            &[r"\breact\b", r"\bfrontend\b", r"\bcss\b", r"\bui\b"],
        ),
        domain_rule(
            "backend",
            Medium,
            &[handlers::BACKEND_DEVELOPER],
            &[
                r"\bapis?\b",
                r"\bendpoints?\b",
                r"\bbackend\b",
                r"\bmicroservices?\b",
                r"\bgraphql\b",
            ],
        ),
        domain_rule(
            "data",
            Medium,
            &[handlers::DATA_ENGINEER],
            &[r"\betl\b", r"\bdata ?warehouse\b", r"\bdatasets?\b", r"\bsql\b"],
        ),
        domain_rule(
            "documentation",
            Medium,
            &[handlers::DOCUMENTATION_WRITER],
            &[r"\bdocumentation\b", r"\bdocs\b", r"\breadme\b"],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_rules_compile() {
        assert_eq!(compile_pattern_rules(builtin_coordination_rules()).unwrap().len(), 3);
        assert_eq!(compile_domain_rules(builtin_domain_rules()).unwrap().len(), 8);
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let rule = PatternRule {
            id: "broken".to_string(),
            patterns: vec!["(unclosed".to_string()],
            confidence: 0.9,
            coordination: None,
            handler: None,
        };
        let err = compile_pattern_rules(vec![rule]).unwrap_err();
        assert!(matches!(err, RuleError::InvalidPattern { ref id, .. } if id == "broken"));
    }

    #[test]
    fn test_confidence_out_of_range_rejected() {
        let rule = DomainRule {
            id: "security".to_string(),
            patterns: vec!["x".to_string()],
            handlers: vec![],
            confidence: 1.5,
        };
        assert!(matches!(
            compile_domain_rules(vec![rule]),
            Err(RuleError::ConfidenceOutOfRange { .. })
        ));
    }

    #[test]
    fn test_duplicate_and_empty_rules_rejected() {
        let mut rules = builtin_domain_rules();
        rules.push(rules[0].clone());
        assert!(matches!(
            compile_domain_rules(rules),
            Err(RuleError::Duplicate(ref id)) if id == "security"
        ));

        let empty = PatternRule {
            id: "empty".to_string(),
            patterns: vec![],
            confidence: 0.5,
            coordination: None,
            handler: None,
        };
        assert!(matches!(
            compile_pattern_rules(vec![empty]),
            Err(RuleError::NoPatterns(_))
        ));
    }

    #[test]
    fn test_rule_from_json() {
        let json = r#"{"id":"batch","patterns":["\\bbatch\\b"],"confidence":0.7,"coordination":"parallel"}"#;
        let rule: PatternRule = serde_json::from_str(json).unwrap();
        assert_eq!(rule.coordination, Some(CoordinationType::Parallel));
        assert!(rule.handler.is_none());
    }
}
