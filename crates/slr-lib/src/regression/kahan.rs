//! Compensated summation
//!
//! See <https://en.wikipedia.org/wiki/Kahan_summation_algorithm>.

/// Running sum that carries the rounding error of each addition forward
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KahanAdder {
    sum: f64,
    residual: f64,
}

impl KahanAdder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a single value to the sum
    pub fn add(&mut self, value: f64) -> &mut Self {
        let y = value - self.residual;
        let t = self.sum + y;
        self.residual = (t - self.sum) - y;
        self.sum = t;
        self
    }

    /// Corrected value of the sum
    pub fn get(&self) -> f64 {
        self.sum + self.residual
    }
}

impl Extend<f64> for KahanAdder {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}
