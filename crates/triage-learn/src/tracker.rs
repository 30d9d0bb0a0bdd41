//! Success tracker for pattern trust weights

use crate::outcome::{HandlerStats, OutcomeMetrics, OutcomeRecord};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

/// Outcomes required for a pattern:handler key before its weight moves
pub const MIN_SAMPLES: usize = 5;
pub const MIN_WEIGHT: f64 = 0.5;
pub const MAX_WEIGHT: f64 = 2.0;

const DEFAULT_WEIGHT: f64 = 1.0;
const EVALUATION_WINDOW: usize = 5;
const STATS_WINDOW: usize = 10;
// Per-key ring buffer capacity
const RETENTION: usize = 100;

const PROMOTE_ACCURACY: f64 = 0.95;
const DEMOTE_ACCURACY: f64 = 0.8;
const PROMOTE_GAIN: f64 = 1.1;
const DEMOTE_GAIN: f64 = 0.9;

/// Tracks execution outcomes and adapts how much each routing pattern is trusted.
///
/// Weights follow a bang-bang rule: once a `pattern:handler` key holds
/// [`MIN_SAMPLES`] outcomes, every new outcome re-evaluates the mean accuracy
/// of the last five. Above 0.95 the pattern weight grows by 10%, below 0.8 it
/// shrinks by 10%, and in between it is left alone.
///
/// Deserialized state is brought back within bounds: weights are clamped to
/// [`MIN_WEIGHT`, `MAX_WEIGHT`] and each history keeps its newest records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "TrackerState")]
pub struct SuccessTracker {
    pattern_outcomes: HashMap<String, VecDeque<OutcomeRecord>>,
    handler_outcomes: HashMap<String, VecDeque<OutcomeRecord>>,
    weights: HashMap<String, f64>,
}

/// Persisted tracker state as read from disk, before bounds are enforced
#[derive(Deserialize)]
struct TrackerState {
    #[serde(default)]
    pattern_outcomes: HashMap<String, VecDeque<OutcomeRecord>>,
    #[serde(default)]
    handler_outcomes: HashMap<String, VecDeque<OutcomeRecord>>,
    #[serde(default)]
    weights: HashMap<String, f64>,
}

impl From<TrackerState> for SuccessTracker {
    fn from(state: TrackerState) -> Self {
        let mut pattern_outcomes = state.pattern_outcomes;
        let mut handler_outcomes = state.handler_outcomes;
        for history in pattern_outcomes
            .values_mut()
            .chain(handler_outcomes.values_mut())
        {
            trim(history, RETENTION);
        }

        let weights = state
            .weights
            .into_iter()
            .map(|(pattern, weight)| {
                let bounded = if weight.is_nan() {
                    DEFAULT_WEIGHT
                } else {
                    weight.clamp(MIN_WEIGHT, MAX_WEIGHT)
                };
                if bounded != weight {
                    tracing::warn!(pattern = %pattern, weight, bounded, "stored weight out of range");
                }
                (pattern, bounded)
            })
            .collect();

        Self {
            pattern_outcomes,
            handler_outcomes,
            weights,
        }
    }
}

impl SuccessTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(pattern: &str, handler: &str) -> String {
        format!("{}:{}", pattern, handler)
    }

    /// Record an outcome for a pattern routed to a handler.
    ///
    /// Returns the pattern's weight after the update.
    pub fn record(&mut self, pattern: &str, handler: &str, metrics: OutcomeMetrics) -> f64 {
        let record = OutcomeRecord::now(metrics);

        push_bounded(
            self.handler_outcomes.entry(handler.to_string()).or_default(),
            record.clone(),
        );
        let history = self
            .pattern_outcomes
            .entry(Self::key(pattern, handler))
            .or_default();
        push_bounded(history, record);

        if history.len() < MIN_SAMPLES {
            return self.get_weight(pattern);
        }

        let recent_accuracy = history
            .iter()
            .rev()
            .take(EVALUATION_WINDOW)
            .map(|r| r.metrics.selection_accuracy)
            .sum::<f64>()
            / EVALUATION_WINDOW as f64;

        let weight = self
            .weights
            .entry(pattern.to_string())
            .or_insert(DEFAULT_WEIGHT);
        let previous = *weight;

        if recent_accuracy > PROMOTE_ACCURACY {
            *weight = (*weight * PROMOTE_GAIN).min(MAX_WEIGHT);
        } else if recent_accuracy < DEMOTE_ACCURACY {
            *weight = (*weight * DEMOTE_GAIN).max(MIN_WEIGHT);
        }

        if (*weight - previous).abs() > f64::EPSILON {
            tracing::info!(
                pattern,
                handler,
                recent_accuracy,
                from = previous,
                to = *weight,
                "pattern weight adjusted"
            );
        }

        *weight
    }

    /// Current trust weight for a pattern (1.0 if never adjusted)
    pub fn get_weight(&self, pattern: &str) -> f64 {
        self.weights.get(pattern).copied().unwrap_or(DEFAULT_WEIGHT)
    }

    /// Averages over the handler's last ten outcomes, `None` if it has none
    pub fn get_handler_stats(&self, handler: &str) -> Option<HandlerStats> {
        let history = self.handler_outcomes.get(handler)?;
        let skip = history.len().saturating_sub(STATS_WINDOW);
        HandlerStats::from_records(history.iter().skip(skip))
    }

    /// Number of retained outcomes for a pattern:handler key
    pub fn sample_count(&self, pattern: &str, handler: &str) -> usize {
        self.pattern_outcomes
            .get(&Self::key(pattern, handler))
            .map_or(0, VecDeque::len)
    }

    pub fn pattern_weights(&self) -> HashMap<String, f64> {
        self.weights.clone()
    }

    pub fn handlers(&self) -> impl Iterator<Item = &str> {
        self.handler_outcomes.keys().map(String::as_str)
    }
}

fn trim(history: &mut VecDeque<OutcomeRecord>, capacity: usize) {
    while history.len() > capacity {
        history.pop_front();
    }
}

fn push_bounded(history: &mut VecDeque<OutcomeRecord>, record: OutcomeRecord) {
    trim(history, RETENTION - 1);
    history.push_back(record);
}
