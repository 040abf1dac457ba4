//! Single-pass weighted least-squares accumulator
//!
//! Maintains weighted running means, sums of squared deviations and the
//! cross-deviation term (a weighted Welford update), so the fit and its sum
//! of squared errors are available in O(1) space after one pass over the
//! training data. The total weight is a compensated sum.
//!
//! See <https://en.wikipedia.org/wiki/Simple_linear_regression>.

use super::kahan::KahanAdder;
use super::model::Model;
use crate::instances::Instance;

/// Running sufficient statistics for `y = a * x + b`
#[derive(Debug, Clone, Default)]
pub struct Accumulator {
    sum_weights: KahanAdder,
    instances: usize,

    feature_mean: f64,
    feature_dev: f64,

    target_mean: f64,
    target_dev: f64,

    covariance: f64,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one training example with unit weight
    pub fn add_instance(&mut self, feature: f64, target: f64) {
        self.add_weighted_instance(feature, target, 1.0);
    }

    /// Add one weighted training example
    ///
    /// A call that leaves the running weight sum non-positive updates only
    /// the weight sum.
    pub fn add_weighted_instance(&mut self, feature: f64, target: f64, weight: f64) {
        self.sum_weights.add(weight);
        let sum_weights = self.sum_weights.get();
        if sum_weights <= 0.0 {
            return;
        }
        self.instances += 1;

        // Feature side first: the covariance term pairs the feature delta
        // taken against the old mean with the target residual against the
        // updated target mean.
        let wfd = weight * (feature - self.feature_mean);
        self.feature_mean += wfd / sum_weights;
        self.feature_dev += wfd * (feature - self.feature_mean);

        let wtd = weight * (target - self.target_mean);
        self.target_mean += wtd / sum_weights;
        self.target_dev += wtd * (target - self.target_mean);

        self.covariance += wfd * (target - self.target_mean);
    }

    /// Best-fit model for the data seen so far
    ///
    /// Degenerate data (no spread in the feature) yields a constant model at
    /// the weighted target mean.
    pub fn solve(&self) -> Model {
        if self.feature_dev == 0.0 {
            return Model::new(0.0, self.target_mean);
        }

        let coefficient = self.covariance / self.feature_dev;
        Model::new(coefficient, self.target_mean - coefficient * self.feature_mean)
    }

    /// Sum of squared errors of the solved model over the training data
    ///
    /// Exact fits can cancel to a tiny negative value; that is clamped to 0.
    pub fn sum_squared_errors(&self) -> f64 {
        let coefficient = self.solve().coefficient;
        let sse = coefficient * coefficient * self.feature_dev
            - 2.0 * coefficient * self.covariance
            + self.target_dev;
        sse.max(0.0)
    }

    /// Number of instances that contributed to the statistics
    pub fn instances(&self) -> usize {
        self.instances
    }

    pub fn weight_sum(&self) -> f64 {
        self.sum_weights.get()
    }

    pub fn feature_mean(&self) -> f64 {
        self.feature_mean
    }

    pub fn target_mean(&self) -> f64 {
        self.target_mean
    }
}

impl Extend<Instance> for Accumulator {
    fn extend<I: IntoIterator<Item = Instance>>(&mut self, iter: I) {
        for instance in iter {
            self.add_weighted_instance(instance.argument, instance.target, instance.weight);
        }
    }
}

impl<'a> Extend<&'a Instance> for Accumulator {
    fn extend<I: IntoIterator<Item = &'a Instance>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl FromIterator<Instance> for Accumulator {
    fn from_iter<I: IntoIterator<Item = Instance>>(iter: I) -> Self {
        let mut accumulator = Accumulator::new();
        accumulator.extend(iter);
        accumulator
    }
}
