use crate::cli::EngineArgs;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use triage_core::RoutingEngine;
use triage_learn::OutcomeMetrics;

/// One executed routing decision and how it went
#[derive(Debug, Deserialize)]
struct FeedbackRecord {
    request: String,
    handler: String,
    metrics: OutcomeMetrics,
}

/// Feed every well-formed record to the engine; returns how many were applied
fn replay(engine: &RoutingEngine, path: &Path) -> anyhow::Result<usize> {
    let reader = BufReader::new(File::open(path)?);
    let mut applied = 0;

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: FeedbackRecord = match serde_json::from_str(&line) {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!(%err, "skipping malformed feedback line");
                continue;
            }
        };
        engine.record_success(&record.request, &record.handler, record.metrics);
        applied += 1;
    }

    Ok(applied)
}

pub fn run(file: &Path, args: &EngineArgs) -> anyhow::Result<()> {
    let engine = super::build_engine(args)?;
    let applied = replay(&engine, file)?;
    tracing::info!(applied, "feedback replayed");

    if let Some(state) = args.state.as_deref() {
        super::save_state(&engine, state)?;
    }

    println!(
        "{}",
        serde_json::to_string_pretty(&engine.get_system_stats())?
    );
    Ok(())
}
