//! Tier 3: ordered fallback rules with a guaranteed default

use crate::analyzer::DomainProfile;
use crate::handlers;
use crate::types::{CoordinationType, EnrichedContext};
use serde::Serialize;

const MULTI_DOMAIN_CONFIDENCE: f64 = 0.7;
const HIERARCHICAL_CONFIDENCE: f64 = 0.75;
const SPECIALIST_CONFIDENCE: f64 = 0.8;
const SPECIALIST_MIN_SCORE: f64 = 0.5;
const DEFAULT_CONFIDENCE: f64 = 0.6;

/// Name reported when no rule fired
pub const DEFAULT_RULE: &str = "default";

type Predicate = Box<dyn Fn(&EnrichedContext) -> bool + Send + Sync>;

pub struct FallbackRule {
    pub name: String,
    predicate: Predicate,
    pub handler: String,
    pub confidence: f64,
}

impl FallbackRule {
    pub fn new<F>(name: impl Into<String>, handler: impl Into<String>, confidence: f64, predicate: F) -> Self
    where
        F: Fn(&EnrichedContext) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            predicate: Box::new(predicate),
            handler: handler.into(),
            confidence,
        }
    }

    pub fn matches(&self, context: &EnrichedContext) -> bool {
        (self.predicate)(context)
    }
}

impl std::fmt::Debug for FallbackRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackRule")
            .field("name", &self.name)
            .field("handler", &self.handler)
            .field("confidence", &self.confidence)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FallbackDecision {
    pub rule: String,
    pub handler: String,
    pub confidence: f64,
}

/// First matching rule wins; the default always matches.
#[derive(Debug)]
pub struct FallbackDecisionTree {
    rules: Vec<FallbackRule>,
    default_handler: String,
    default_confidence: f64,
}

impl FallbackDecisionTree {
    pub fn new(default_handler: impl Into<String>, default_confidence: f64) -> Self {
        Self {
            rules: Vec::new(),
            default_handler: default_handler.into(),
            default_confidence,
        }
    }

    /// Append a rule ahead of the default
    pub fn push(&mut self, rule: FallbackRule) {
        self.rules.push(rule);
    }

    /// Broad multi-domain and hierarchical signals first, then one
    /// specialist rule per domain in registration order.
    pub fn builtin(domains: &[DomainProfile]) -> Self {
        let mut tree = Self::new(handlers::GENERALIST, DEFAULT_CONFIDENCE);

        tree.push(FallbackRule::new(
            "multi_domain",
            handlers::TASK_COORDINATOR,
            MULTI_DOMAIN_CONFIDENCE,
            |ctx| ctx.domain_scores.len() > 2,
        ));
        tree.push(FallbackRule::new(
            "hierarchical",
            handlers::META_COORDINATOR,
            HIERARCHICAL_CONFIDENCE,
            |ctx| ctx.coordination == CoordinationType::Hierarchical,
        ));

        for domain in domains {
            let Some(specialist) = domain.specialist() else {
                continue;
            };
            let name = domain.name.clone();
            tree.push(FallbackRule::new(
                format!("{}_specialist", domain.name),
                specialist,
                SPECIALIST_CONFIDENCE,
                move |ctx| ctx.domain_score(&name) > SPECIALIST_MIN_SCORE,
            ));
        }

        tree
    }

    /// Rule count including the default
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.rules.len() + 1
    }

    pub fn decide(&self, context: &EnrichedContext) -> FallbackDecision {
        let decision = match self.rules.iter().find(|rule| rule.matches(context)) {
            Some(rule) => FallbackDecision {
                rule: rule.name.clone(),
                handler: rule.handler.clone(),
                confidence: rule.confidence,
            },
            None => FallbackDecision {
                rule: DEFAULT_RULE.to_string(),
                handler: self.default_handler.clone(),
                confidence: self.default_confidence,
            },
        };
        tracing::debug!(rule = %decision.rule, handler = %decision.handler, "fallback tier decided");
        decision
    }
}
