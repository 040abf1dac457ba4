//! Simple linear regression
//!
//! Streaming weighted least-squares fit and the model it produces.

mod accumulator;
mod kahan;
mod model;

pub use accumulator::Accumulator;
pub use kahan::KahanAdder;
pub use model::{Model, ModelValue, TrainingResults};

use crate::instances::Instance;

/// Fit a model over a validated training set
pub fn train(instances: &[Instance]) -> TrainingResults {
    let mut accumulator = Accumulator::new();
    accumulator.extend(instances);

    TrainingResults {
        model: accumulator.solve(),
        sum_squared_errors: accumulator.sum_squared_errors(),
        name: None,
        creation_time: None,
        error: None,
    }
}
