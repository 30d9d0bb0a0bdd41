//! Builtin handler names

/// Deep-analysis handler of last resort
pub const GENERALIST: &str = "generalist";
/// Fans independent work out across several domains at once
pub const MULTI_DOMAIN_GATEWAY: &str = "multi-domain-gateway";
/// Delegates to and supervises other handlers
pub const META_COORDINATOR: &str = "meta-coordinator";
/// Generalist that coordinates broad multi-domain requests
pub const TASK_COORDINATOR: &str = "task-coordinator";
pub const WORKFLOW_ORCHESTRATOR: &str = "workflow-orchestrator";

pub const SECURITY_AUDITOR: &str = "security-auditor";
pub const PERFORMANCE_ENGINEER: &str = "performance-engineer";
pub const TEST_ENGINEER: &str = "test-engineer";
pub const INFRASTRUCTURE_SPECIALIST: &str = "infrastructure-specialist";
pub const FRONTEND_DEVELOPER: &str = "frontend-developer";
pub const BACKEND_DEVELOPER: &str = "backend-developer";
pub const DATA_ENGINEER: &str = "data-engineer";
pub const DOCUMENTATION_WRITER: &str = "documentation-writer";

// Fast-path handlers
pub const HOTFIX_SPECIALIST: &str = "hotfix-specialist";
pub const RAPID_PROTOTYPER: &str = "rapid-prototyper";

pub const FAST_PATH: &[&str] = &[HOTFIX_SPECIALIST, RAPID_PROTOTYPER];
