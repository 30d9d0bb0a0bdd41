//! Tier 2: keyword-weighted semantic context

use crate::handlers;
use crate::text::{contains_term, count_term, normalize};
use crate::types::{clamp_confidence, CoordinationType, EnrichedContext, Requirements};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

/// Only the most recent history entries are read
pub const HISTORY_WINDOW: usize = 5;

const GATEWAY_CONFIDENCE: f64 = 0.85;
const META_COORDINATOR_CONFIDENCE: f64 = 0.9;
const FAST_PATH_CONFIDENCE: f64 = 0.8;
const COORDINATED_CONFIDENCE: f64 = 0.8;
const HYBRID_CONFIDENCE: f64 = 0.5;
const REQUIREMENT_STEP: f64 = 0.2;

static TIME_BOUND_RE: OnceLock<Regex> = OnceLock::new();

const PARALLEL_INDICATORS: &[&str] = &[
    "parallel",
    "concurrent",
    "simultaneous",
    "at the same time",
    "independent",
    "batch",
];
const SEQUENTIAL_INDICATORS: &[&str] = &[
    "sequential",
    "step by step",
    "then",
    "after",
    "before",
    "followed by",
    "pipeline",
    "in order",
];
const HIERARCHICAL_INDICATORS: &[&str] = &[
    "hierarch",
    "delegate",
    "supervis",
    "oversee",
    "sub-agent",
    "subagent",
    "multi-level",
];

const FAST_INDICATORS: &[&str] = &[
    "fast",
    "quick",
    "urgent",
    "asap",
    "immediately",
    "hotfix",
    "real-time",
];
const THOROUGH_INDICATORS: &[&str] = &[
    "thorough",
    "comprehensive",
    "detailed",
    "in-depth",
    "exhaustive",
    "deep dive",
];
const PARALLEL_REQUIREMENTS: &[&str] = &["parallel", "concurrent", "simultaneous", "at the same time"];
const SEQUENTIAL_REQUIREMENTS: &[&str] = &[
    "sequential",
    "step by step",
    "then",
    "followed by",
    "in order",
];

/// Keyword vocabulary and handler affinities for one domain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainProfile {
    pub name: String,
    pub keywords: Vec<String>,
    /// Base weight of each handler for this domain, best fit first
    pub handler_weights: Vec<(String, f64)>,
}

impl DomainProfile {
    fn new(name: &str, keywords: &[&str], handler_weights: &[(&str, f64)]) -> Self {
        Self {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            handler_weights: handler_weights
                .iter()
                .map(|(h, w)| (h.to_string(), *w))
                .collect(),
        }
    }

    /// The domain's primary specialist
    pub fn specialist(&self) -> Option<&str> {
        self.handler_weights.first().map(|(h, _)| h.as_str())
    }

    fn score(&self, text: &str) -> f64 {
        if self.keywords.is_empty() {
            return 0.0;
        }
        let size = self.keywords.len() as f64;
        let raw: f64 = self
            .keywords
            .iter()
            .map(|kw| count_term(text, kw) as f64 / size)
            .sum();
        raw.min(1.0)
    }

    fn mentioned_in(&self, text: &str) -> bool {
        self.keywords.iter().any(|kw| contains_term(text, kw))
    }
}

/// Builtin domain vocabularies, in registration order
pub fn builtin_domains() -> Vec<DomainProfile> {
    use handlers::*;

    vec![
        DomainProfile::new(
            "security",
            &[
                "security", "vulnerab", "auth", "encrypt", "threat", "exploit", "xss", "csrf",
                "injection", "compliance",
            ],
            &[(SECURITY_AUDITOR, 0.95), (BACKEND_DEVELOPER, 0.5)],
        ),
        DomainProfile::new(
            "performance",
            &[
                "performance",
                "optimi",
                "latency",
                "throughput",
                "bottleneck",
                "profil",
                "slow",
                "memory leak",
                "cache",
                "benchmark",
            ],
            &[(PERFORMANCE_ENGINEER, 0.95), (BACKEND_DEVELOPER, 0.6)],
        ),
        DomainProfile::new(
            "testing",
            &[
                "test",
                "coverage",
                "unit test",
                "integration test",
                "e2e",
                "regression",
                "assert",
                "mock",
                "qa",
            ],
            &[(TEST_ENGINEER, 0.9)],
        ),
        DomainProfile::new(
            "infrastructure",
            &[
                "docker",
                "kubernetes",
                "container",
                "terraform",
                "helm",
                "deploy",
                "scaling",
                "orchestration",
            ],
            &[(INFRASTRUCTURE_SPECIALIST, 0.9), (BACKEND_DEVELOPER, 0.4)],
        ),
        DomainProfile::new(
            "frontend",
            &[
                "react", "frontend", "css", "component", "browser", "layout", "accessibility", "ui",
            ],
            &[(FRONTEND_DEVELOPER, 0.9), (RAPID_PROTOTYPER, 0.4)],
        ),
        DomainProfile::new(
            "backend",
            &[
                "api",
                "endpoint",
                "database",
                "server",
                "backend",
                "microservice",
                "graphql",
                "rest",
            ],
            &[(BACKEND_DEVELOPER, 0.9), (DATA_ENGINEER, 0.4)],
        ),
        DomainProfile::new(
            "data",
            &[
                "dataset",
                "etl",
                "analytics",
                "warehouse",
                "sql",
                "dataframe",
                "ingestion",
                "schema",
            ],
            &[(DATA_ENGINEER, 0.9), (BACKEND_DEVELOPER, 0.5)],
        ),
        DomainProfile::new(
            "documentation",
            &["documentation", "docs", "readme", "tutorial", "guide", "docstring"],
            &[(DOCUMENTATION_WRITER, 0.9)],
        ),
    ]
}

#[derive(Debug, Clone)]
pub struct SemanticContextAnalyzer {
    domains: Vec<DomainProfile>,
}

impl SemanticContextAnalyzer {
    pub fn new(domains: Vec<DomainProfile>) -> Self {
        Self { domains }
    }

    pub fn builtin() -> Self {
        Self::new(builtin_domains())
    }

    pub fn domains(&self) -> &[DomainProfile] {
        &self.domains
    }

    /// Build the enriched context for normalized request text
    pub fn analyze(&self, text: &str, history: &[Value]) -> EnrichedContext {
        let domain_scores = self.score_domains(text);
        let coordination = detect_coordination(text);
        let requirements = extract_requirements(text);
        let history_window = history_window(history);
        let historical_domains = self.historical_domains(&history_window);

        let mean_domain = if domain_scores.is_empty() {
            0.0
        } else {
            domain_scores.values().sum::<f64>() / domain_scores.len() as f64
        };
        let coordination_signal = if coordination == CoordinationType::Hybrid {
            HYBRID_CONFIDENCE
        } else {
            COORDINATED_CONFIDENCE
        };
        let requirement_signal =
            (requirements.category_count() as f64 * REQUIREMENT_STEP).min(1.0);
        let confidence = clamp_confidence((mean_domain + coordination_signal + requirement_signal) / 3.0);

        let suggested_handlers = self.rank_handlers(&domain_scores, coordination, &requirements);

        tracing::debug!(
            domains = ?domain_scores.keys().collect::<Vec<_>>(),
            coordination = coordination.as_str(),
            confidence,
            "semantic tier analyzed"
        );

        EnrichedContext {
            text: text.to_string(),
            domain_scores,
            coordination,
            requirements,
            history_window,
            historical_domains,
            confidence,
            suggested_handlers,
        }
    }

    fn score_domains(&self, text: &str) -> BTreeMap<String, f64> {
        self.domains
            .iter()
            .map(|d| (d.name.clone(), d.score(text)))
            .filter(|(_, score)| *score > 0.0)
            .collect()
    }

    fn historical_domains(&self, window: &[String]) -> Vec<String> {
        let mut tags: Vec<String> = Vec::new();
        for entry in window {
            for domain in &self.domains {
                let tag = format!("historical_{}", domain.name);
                if !tags.contains(&tag) && domain.mentioned_in(entry) {
                    tags.push(tag);
                }
            }
        }
        tags
    }

    fn rank_handlers(
        &self,
        domain_scores: &BTreeMap<String, f64>,
        coordination: CoordinationType,
        requirements: &Requirements,
    ) -> Vec<(String, f64)> {
        let mut best: HashMap<String, f64> = HashMap::new();
        let mut offer = |handler: &str, score: f64| {
            best.entry(handler.to_string())
                .and_modify(|s| *s = s.max(score))
                .or_insert(score);
        };

        for domain in &self.domains {
            let Some(&score) = domain_scores.get(&domain.name) else {
                continue;
            };
            for (handler, weight) in &domain.handler_weights {
                offer(handler, clamp_confidence(weight * score));
            }
        }

        if coordination == CoordinationType::Parallel && domain_scores.len() > 1 {
            offer(handlers::MULTI_DOMAIN_GATEWAY, GATEWAY_CONFIDENCE);
        }
        if coordination == CoordinationType::Hierarchical {
            offer(handlers::META_COORDINATOR, META_COORDINATOR_CONFIDENCE);
        }
        if requirements.needs_fast() {
            for handler in handlers::FAST_PATH {
                offer(handler, FAST_PATH_CONFIDENCE);
            }
        }

        let mut ranked: Vec<(String, f64)> = best.into_iter().collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        ranked
    }
}

impl Default for SemanticContextAnalyzer {
    fn default() -> Self {
        Self::builtin()
    }
}

fn presence(text: &str, words: &[&str]) -> usize {
    words.iter().filter(|w| contains_term(text, w)).count()
}

fn detect_coordination(text: &str) -> CoordinationType {
    let votes = [
        (CoordinationType::Parallel, presence(text, PARALLEL_INDICATORS)),
        (CoordinationType::Sequential, presence(text, SEQUENTIAL_INDICATORS)),
        (CoordinationType::Hierarchical, presence(text, HIERARCHICAL_INDICATORS)),
    ];

    let mut winner = (CoordinationType::Hybrid, 0);
    for (kind, total) in votes {
        if total > winner.1 {
            winner = (kind, total);
        }
    }
    winner.0
}

fn extract_requirements(text: &str) -> Requirements {
    let re = TIME_BOUND_RE.get_or_init(|| Regex::new(r"<\s*(\d+)\s*s\b").unwrap());
    let max_seconds = re
        .captures_iter(text)
        .filter_map(|c| c.get(1)?.as_str().parse::<u64>().ok())
        .min();

    Requirements {
        fast: presence(text, FAST_INDICATORS),
        thorough: presence(text, THOROUGH_INDICATORS),
        parallel: presence(text, PARALLEL_REQUIREMENTS),
        sequential: presence(text, SEQUENTIAL_REQUIREMENTS),
        max_seconds,
    }
}

/// Text of a history entry: a bare string, or an object with `content` or `text`
fn entry_text(entry: &Value) -> Option<&str> {
    match entry {
        Value::String(s) => Some(s),
        Value::Object(map) => map
            .get("content")
            .or_else(|| map.get("text"))
            .and_then(Value::as_str),
        _ => None,
    }
}

fn history_window(history: &[Value]) -> Vec<String> {
    let start = history.len().saturating_sub(HISTORY_WINDOW);
    history[start..]
        .iter()
        .filter_map(|entry| {
            let text = entry_text(entry);
            if text.is_none() {
                tracing::debug!("skipping malformed history entry");
            }
            text.map(normalize)
        })
        .collect()
}
