//! Regression model value objects

use crate::error::{Result, SlrError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Simple regression model `f(x) = coefficient * x + intercept`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub coefficient: f64,
    pub intercept: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Model {
    pub fn new(coefficient: f64, intercept: f64) -> Self {
        Self {
            coefficient,
            intercept,
            name: None,
        }
    }

    /// Rebuild a stored model from its `[coefficient, intercept]` parameters
    pub fn from_params(params: &[f64], name: impl Into<String>) -> Result<Self> {
        match params {
            [coefficient, intercept] => Ok(Self {
                coefficient: *coefficient,
                intercept: *intercept,
                name: Some(name.into()),
            }),
            _ => Err(SlrError::Storage(format!(
                "model parameters must contain exactly two values, got {}",
                params.len()
            ))),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn to_params(&self) -> [f64; 2] {
        [self.coefficient, self.intercept]
    }

    /// Result of applying the model to an argument
    pub fn apply(&self, arg: f64) -> f64 {
        self.coefficient * arg + self.intercept
    }

    /// Apply the model and wrap the value for reporting
    pub fn evaluate(&self, arg: f64, from_cache: bool) -> ModelValue {
        ModelValue {
            value: self.apply(arg),
            argument: arg,
            model: self.clone(),
            from_cache,
            calculation_time: Utc::now(),
        }
    }
}

/// A single model application, as reported to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelValue {
    pub value: f64,
    pub argument: f64,
    pub model: Model,
    pub from_cache: bool,
    pub calculation_time: DateTime<Utc>,
}

/// Outcome of a training request
///
/// `name` and `creation_time` are set only when the model was stored;
/// `error` carries a storage failure that did not prevent the fit itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingResults {
    pub model: Model,
    pub sum_squared_errors: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
