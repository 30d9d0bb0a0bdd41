//! Handler capability profiles and request validation

use crate::error::RegistryError;
use crate::handlers;
use crate::types::{CoordinationType, EnrichedContext, PerformanceTier, ValidationOutcome};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const ISSUE_PENALTY: f64 = 0.2;
const MIN_VALID_CONFIDENCE: f64 = 0.1;

/// Static declaration of what a handler can take on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandlerCapabilityProfile {
    pub name: String,
    pub domains: Vec<String>,
    pub coordination: Vec<CoordinationType>,
    pub performance: PerformanceTier,
    #[serde(default)]
    pub specializations: Vec<String>,
}

impl HandlerCapabilityProfile {
    fn new(
        name: &str,
        domains: &[&str],
        coordination: &[CoordinationType],
        performance: PerformanceTier,
        specializations: &[&str],
    ) -> Self {
        Self {
            name: name.to_string(),
            domains: domains.iter().map(|d| d.to_string()).collect(),
            coordination: coordination.to_vec(),
            performance,
            specializations: specializations.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn covers_any<'a>(&self, domains: impl IntoIterator<Item = &'a String>) -> bool {
        domains.into_iter().any(|d| self.domains.contains(d))
    }

    pub fn supports(&self, coordination: CoordinationType) -> bool {
        self.coordination.contains(&coordination)
    }
}

/// Immutable, ordered set of capability profiles
#[derive(Debug, Clone)]
pub struct CapabilityRegistry {
    profiles: Vec<HandlerCapabilityProfile>,
    index: HashMap<String, usize>,
}

impl CapabilityRegistry {
    /// Validate and index profiles; the generalist must be present
    pub fn new(profiles: Vec<HandlerCapabilityProfile>) -> Result<Self, RegistryError> {
        let mut index = HashMap::with_capacity(profiles.len());
        for (i, profile) in profiles.iter().enumerate() {
            if profile.name.trim().is_empty() {
                return Err(RegistryError::EmptyName);
            }
            if index.insert(profile.name.clone(), i).is_some() {
                return Err(RegistryError::DuplicateHandler(profile.name.clone()));
            }
        }
        if !index.contains_key(handlers::GENERALIST) {
            return Err(RegistryError::MissingFallback(handlers::GENERALIST.to_string()));
        }
        Ok(Self { profiles, index })
    }

    /// Parse a JSON array of profiles
    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        let profiles: Vec<HandlerCapabilityProfile> = serde_json::from_str(json)?;
        Self::new(profiles)
    }

    pub fn builtin() -> Self {
        let profiles = builtin_profiles();
        let index = profiles
            .iter()
            .enumerate()
            .map(|(i, p)| (p.name.clone(), i))
            .collect();
        Self { profiles, index }
    }

    pub fn get(&self, handler: &str) -> Option<&HandlerCapabilityProfile> {
        self.index.get(handler).map(|&i| &self.profiles[i])
    }

    pub fn contains(&self, handler: &str) -> bool {
        self.index.contains_key(handler)
    }

    pub fn profiles(&self) -> &[HandlerCapabilityProfile] {
        &self.profiles
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl Default for CapabilityRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn builtin_profiles() -> Vec<HandlerCapabilityProfile> {
    use handlers::*;
    use CoordinationType::{Hierarchical, Hybrid, Parallel, Sequential, Single};
    use PerformanceTier::{High, Medium, Strategic, Ultra};

    const ALL_DOMAINS: &[&str] = &[
        "security",
        "performance",
        "testing",
        "infrastructure",
        "frontend",
        "backend",
        "data",
        "documentation",
    ];

    vec![
        HandlerCapabilityProfile::new(
            GENERALIST,
            ALL_DOMAINS,
            &CoordinationType::ALL,
            Medium,
            &["deep-analysis", "triage"],
        ),
        HandlerCapabilityProfile::new(
            MULTI_DOMAIN_GATEWAY,
            ALL_DOMAINS,
            &[Parallel, Hybrid],
            High,
            &["fan-out", "result-merging"],
        ),
        HandlerCapabilityProfile::new(
            META_COORDINATOR,
            ALL_DOMAINS,
            &[Hierarchical, Sequential, Hybrid],
            Strategic,
            &["delegation", "planning"],
        ),
        HandlerCapabilityProfile::new(
            TASK_COORDINATOR,
            ALL_DOMAINS,
            &[Parallel, Sequential, Hybrid],
            High,
            &["work-breakdown"],
        ),
        HandlerCapabilityProfile::new(
            WORKFLOW_ORCHESTRATOR,
            ALL_DOMAINS,
            &[Sequential, Hybrid],
            Medium,
            &["pipelines", "handoffs"],
        ),
        HandlerCapabilityProfile::new(
            SECURITY_AUDITOR,
            &["security"],
            &[Single, Sequential, Hybrid],
            Medium,
            &["threat-modeling", "code-audit"],
        ),
        HandlerCapabilityProfile::new(
            PERFORMANCE_ENGINEER,
            &["performance", "infrastructure", "backend"],
            &[Single, Parallel, Hybrid],
            High,
            &["profiling", "caching"],
        ),
        HandlerCapabilityProfile::new(
            TEST_ENGINEER,
            &["testing"],
            &[Single, Parallel, Sequential, Hybrid],
            High,
            &["unit-tests", "regression-suites"],
        ),
        HandlerCapabilityProfile::new(
            INFRASTRUCTURE_SPECIALIST,
            &["infrastructure", "performance"],
            &[Single, Sequential, Hybrid],
            High,
            &["containers", "provisioning"],
        ),
        HandlerCapabilityProfile::new(
            FRONTEND_DEVELOPER,
            &["frontend"],
            &[Single, Hybrid],
            High,
            &["components", "accessibility"],
        ),
        HandlerCapabilityProfile::new(
            BACKEND_DEVELOPER,
            &["backend", "data", "security"],
            &[Single, Sequential, Hybrid],
            High,
            &["apis", "persistence"],
        ),
        HandlerCapabilityProfile::new(
            DATA_ENGINEER,
            &["data", "backend"],
            &[Single, Parallel, Sequential, Hybrid],
            Medium,
            &["etl", "schemas"],
        ),
        HandlerCapabilityProfile::new(
            DOCUMENTATION_WRITER,
            &["documentation"],
            &[Single, Sequential, Hybrid],
            Medium,
            &["guides", "reference-docs"],
        ),
        HandlerCapabilityProfile::new(
            HOTFIX_SPECIALIST,
            &["security", "performance", "backend", "frontend", "testing"],
            &[Single, Hybrid],
            Ultra,
            &["incident-response"],
        ),
        HandlerCapabilityProfile::new(
            RAPID_PROTOTYPER,
            &["frontend", "backend"],
            &[Single, Hybrid],
            Ultra,
            &["scaffolding"],
        ),
    ]
}

/// Checks a candidate handler's profile against a request's derived needs
#[derive(Debug, Clone)]
pub struct CapabilityValidator {
    registry: CapabilityRegistry,
}

impl CapabilityValidator {
    pub fn new(registry: CapabilityRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    /// Run every check and report all failures together
    pub fn validate(&self, handler: &str, context: &EnrichedContext) -> ValidationOutcome {
        let Some(profile) = self.registry.get(handler) else {
            return ValidationOutcome {
                is_valid: false,
                confidence: 0.0,
                issues: vec![format!("unknown handler: {}", handler)],
                recommendations: vec![format!("use {}", handlers::GENERALIST)],
            };
        };

        let mut issues = Vec::new();
        let mut recommendations = Vec::new();

        // Domain alignment
        if !context.domain_scores.is_empty() && !profile.covers_any(context.domain_scores.keys()) {
            let wanted: Vec<&str> = context.domain_scores.keys().map(String::as_str).collect();
            issues.push(format!(
                "{} does not cover domains: {}",
                handler,
                wanted.join(", ")
            ));
            let alternative = self
                .registry
                .profiles()
                .iter()
                .find(|p| p.name != handler && p.covers_any(context.domain_scores.keys()));
            if let Some(alt) = alternative {
                recommendations.push(format!("consider {}", alt.name));
            }
        }

        // Coordination alignment
        if !profile.supports(context.coordination) {
            issues.push(format!(
                "{} does not support {} coordination",
                handler,
                context.coordination.as_str()
            ));
        }

        // Performance alignment
        if context.requirements.needs_fast() && !profile.performance.is_fast() {
            issues.push(format!(
                "{} is not tuned for fast responses ({:?} tier)",
                handler, profile.performance
            ));
        }

        let confidence = (1.0 - ISSUE_PENALTY * issues.len() as f64).max(MIN_VALID_CONFIDENCE);
        ValidationOutcome {
            is_valid: issues.is_empty(),
            confidence,
            issues,
            recommendations,
        }
    }
}
