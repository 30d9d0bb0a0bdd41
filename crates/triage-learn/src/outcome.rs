//! Execution outcome records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metrics reported by the executor after a handler finishes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutcomeMetrics {
    /// How well the chosen handler fit the request (0.0-1.0)
    pub selection_accuracy: f64,
    /// Wall-clock execution time in seconds
    pub response_time: f64,
    #[serde(default)]
    pub context_preservation: f64,
    #[serde(default)]
    pub coordination_success: f64,
}

impl OutcomeMetrics {
    pub fn with_accuracy(selection_accuracy: f64) -> Self {
        Self {
            selection_accuracy,
            response_time: 0.0,
            context_preservation: 1.0,
            coordination_success: 1.0,
        }
    }
}

/// A single timestamped outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeRecord {
    pub timestamp: DateTime<Utc>,
    pub metrics: OutcomeMetrics,
}

impl OutcomeRecord {
    pub fn now(metrics: OutcomeMetrics) -> Self {
        Self {
            timestamp: Utc::now(),
            metrics,
        }
    }
}

/// Rolling averages over a handler's most recent outcomes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandlerStats {
    pub avg_accuracy: f64,
    pub avg_response_time: f64,
    pub avg_context_preservation: f64,
    pub avg_coordination_success: f64,
    /// Number of outcomes the averages were taken over
    pub samples: usize,
}

impl HandlerStats {
    /// Average the given records; `None` when there is nothing to average
    pub fn from_records<'a, I>(records: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a OutcomeRecord>,
    {
        let mut stats = Self {
            avg_accuracy: 0.0,
            avg_response_time: 0.0,
            avg_context_preservation: 0.0,
            avg_coordination_success: 0.0,
            samples: 0,
        };

        for record in records {
            let m = &record.metrics;
            stats.avg_accuracy += m.selection_accuracy;
            stats.avg_response_time += m.response_time;
            stats.avg_context_preservation += m.context_preservation;
            stats.avg_coordination_success += m.coordination_success;
            stats.samples += 1;
        }

        if stats.samples == 0 {
            return None;
        }

        let n = stats.samples as f64;
        stats.avg_accuracy /= n;
        stats.avg_response_time /= n;
        stats.avg_context_preservation /= n;
        stats.avg_coordination_success /= n;
        Some(stats)
    }
}
