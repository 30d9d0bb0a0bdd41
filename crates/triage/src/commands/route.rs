use crate::cli::EngineArgs;
use anyhow::Context;
use serde_json::Value;
use std::path::Path;
use triage_core::RouteOutcome;

fn load_history(path: Option<&Path>) -> anyhow::Result<Vec<Value>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading history from {}", path.display()))?;
    match serde_json::from_str::<Value>(&contents)? {
        Value::Array(entries) => Ok(entries),
        _ => anyhow::bail!("history in {} must be a JSON array", path.display()),
    }
}

fn render(outcome: &RouteOutcome) -> anyhow::Result<Value> {
    let selection = outcome.selection();
    Ok(serde_json::json!({
        "handler": selection.handler,
        "confidence": selection.confidence,
        "coordination": selection.coordination,
        "degraded": outcome.is_degraded(),
        "trace": serde_json::to_value(&selection.trace)?,
    }))
}

pub fn run(request: &str, history: Option<&Path>, args: &EngineArgs) -> anyhow::Result<()> {
    let engine = super::build_engine(args)?;
    let history = load_history(history)?;

    let outcome = engine.select(request, &history);
    println!("{}", serde_json::to_string_pretty(&render(&outcome)?)?);
    Ok(())
}
