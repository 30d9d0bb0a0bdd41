//! Online feedback learning for routing pattern trust

mod outcome;
mod tracker;

pub use outcome::{HandlerStats, OutcomeMetrics, OutcomeRecord};
pub use tracker::{SuccessTracker, MAX_WEIGHT, MIN_SAMPLES, MIN_WEIGHT};
