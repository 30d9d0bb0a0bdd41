pub mod feedback;
pub mod profiles;
pub mod route;
pub mod version;

use crate::cli::EngineArgs;
use anyhow::Context;
use std::path::Path;
use triage_core::{CapabilityRegistry, RoutingConfig, RoutingEngine, SuccessTracker};

pub(crate) fn load_registry(path: Option<&Path>) -> anyhow::Result<CapabilityRegistry> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading profiles from {}", path.display()))?;
            Ok(CapabilityRegistry::from_json(&json)?)
        }
        None => Ok(CapabilityRegistry::builtin()),
    }
}

pub(crate) fn load_config(path: Option<&Path>) -> anyhow::Result<RoutingConfig> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading config from {}", path.display()))?;
            Ok(serde_json::from_str(&json)?)
        }
        None => Ok(RoutingConfig::default()),
    }
}

/// Previously learned tracker state; a missing file starts fresh
pub(crate) fn load_state(path: &Path) -> anyhow::Result<Option<SuccessTracker>> {
    if !path.exists() {
        return Ok(None);
    }
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading tracker state from {}", path.display()))?;
    let tracker = serde_json::from_str(&json)
        .with_context(|| format!("parsing tracker state in {}", path.display()))?;
    Ok(Some(tracker))
}

pub(crate) fn save_state(engine: &RoutingEngine, path: &Path) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&engine.tracker_snapshot())?;
    std::fs::write(path, json)
        .with_context(|| format!("writing tracker state to {}", path.display()))?;
    Ok(())
}

pub(crate) fn build_engine(args: &EngineArgs) -> anyhow::Result<RoutingEngine> {
    let config = load_config(args.config.as_deref())?;
    let registry = load_registry(args.profiles.as_deref())?;
    let engine = RoutingEngine::new(config, registry)?;

    match args.state.as_deref().map(load_state).transpose()?.flatten() {
        Some(tracker) => Ok(engine.with_tracker(tracker)),
        None => Ok(engine),
    }
}
