//! Training input validation
//!
//! Observations arrive either as numeric rows (`[x, y]` or `[x, y, weight]`)
//! from JSON / protobuf payloads or as whitespace-separated TSV text. Both
//! paths produce the same validated `Instance` list or a positional error.

use crate::error::{Result, SlrError};
use serde::{Deserialize, Serialize};
use std::io::BufRead;

/// One weighted observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub argument: f64,
    pub target: f64,
    pub weight: f64,
}

impl Instance {
    pub fn new(argument: f64, target: f64) -> Self {
        Self::weighted(argument, target, 1.0)
    }

    pub fn weighted(argument: f64, target: f64, weight: f64) -> Self {
        Self {
            argument,
            target,
            weight,
        }
    }

    /// Build an instance from a row of 2 or 3 values
    pub fn from_row(index: usize, row: &[f64]) -> Result<Self> {
        let instance = match *row {
            [argument, target] => Self::new(argument, target),
            [argument, target, weight] => Self::weighted(argument, target, weight),
            _ => {
                return Err(SlrError::BadInstance {
                    index,
                    tokens: row.len(),
                })
            }
        };
        instance.validate(index)?;
        Ok(instance)
    }

    /// Reject non-finite values and non-positive weights
    pub fn validate(&self, index: usize) -> Result<()> {
        if !self.argument.is_finite() || !self.target.is_finite() {
            return Err(SlrError::InvalidValue {
                index,
                reason: "argument and target must be finite".to_string(),
            });
        }
        if !self.weight.is_finite() || self.weight <= 0.0 {
            return Err(SlrError::InvalidValue {
                index,
                reason: format!("weight must be positive, got {}", self.weight),
            });
        }
        Ok(())
    }

    pub fn to_row(&self) -> Vec<f64> {
        if self.weight == 1.0 {
            vec![self.argument, self.target]
        } else {
            vec![self.argument, self.target, self.weight]
        }
    }
}

/// Validate a batch of numeric rows
pub fn instances_from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Vec<Instance>> {
    if rows.is_empty() {
        return Err(SlrError::NoInstances);
    }

    rows.iter()
        .enumerate()
        .map(|(index, row)| Instance::from_row(index, row.as_ref()))
        .collect()
}

/// Validate already-structured instances (e.g. from protobuf)
pub fn validate_instances(instances: &[Instance]) -> Result<()> {
    if instances.is_empty() {
        return Err(SlrError::NoInstances);
    }
    for (index, instance) in instances.iter().enumerate() {
        instance.validate(index)?;
    }
    Ok(())
}

/// Load instances from whitespace-separated text, one observation per line
///
/// Blank lines are skipped and do not count towards the record index.
pub fn load_instances_from_tsv<R: BufRead>(reader: R) -> Result<Vec<Instance>> {
    let mut instances = Vec::new();

    for line in reader.lines() {
        let line = line.map_err(|e| SlrError::InvalidValue {
            index: instances.len(),
            reason: format!("cannot read input: {}", e),
        })?;

        let row = line
            .split_whitespace()
            .map(|token| {
                token.parse::<f64>().map_err(|_| SlrError::InvalidValue {
                    index: instances.len(),
                    reason: format!("invalid float: {}", token),
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        if row.is_empty() {
            continue;
        }
        instances.push(Instance::from_row(instances.len(), &row)?);
    }

    if instances.is_empty() {
        return Err(SlrError::NoInstances);
    }
    Ok(instances)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_rows_with_and_without_weights() {
        let rows = vec![vec![1.0, 2.0], vec![2.0, 4.0, 0.5]];
        let instances = instances_from_rows(&rows).unwrap();

        assert_eq!(instances[0], Instance::new(1.0, 2.0));
        assert_eq!(instances[1], Instance::weighted(2.0, 4.0, 0.5));
    }

    #[test]
    fn test_empty_rows_rejected() {
        let rows: Vec<Vec<f64>> = Vec::new();
        assert!(matches!(
            instances_from_rows(&rows),
            Err(SlrError::NoInstances)
        ));
    }

    #[test]
    fn test_bad_token_count_reports_index() {
        let rows = vec![vec![1.0, 2.0], vec![1.0, 2.0], vec![1.0, 2.0, 3.0, 4.0]];
        match instances_from_rows(&rows) {
            Err(SlrError::BadInstance { index, tokens }) => {
                assert_eq!(index, 2);
                assert_eq!(tokens, 4);
            }
            other => panic!("unexpected result: {:?}", other),
        }

        let rows = vec![vec![1.0]];
        assert!(matches!(
            instances_from_rows(&rows),
            Err(SlrError::BadInstance { index: 0, tokens: 1 })
        ));
    }

    #[test]
    fn test_non_positive_weight_rejected() {
        let rows = vec![vec![1.0, 2.0], vec![3.0, 4.0, 0.0]];
        assert!(matches!(
            instances_from_rows(&rows),
            Err(SlrError::InvalidValue { index: 1, .. })
        ));

        let rows = vec![vec![1.0, 2.0, -2.0]];
        assert!(instances_from_rows(&rows).is_err());
    }

    #[test]
    fn test_non_finite_rejected() {
        let rows = vec![vec![f64::NAN, 2.0]];
        assert!(matches!(
            instances_from_rows(&rows),
            Err(SlrError::InvalidValue { index: 0, .. })
        ));
    }

    #[test]
    fn test_tsv_loading() {
        let input = "1\t2\n\n2 4\n3   6  2\n";
        let instances = load_instances_from_tsv(Cursor::new(input)).unwrap();

        assert_eq!(instances.len(), 3);
        assert_eq!(instances[2], Instance::weighted(3.0, 6.0, 2.0));
    }

    #[test]
    fn test_tsv_invalid_float() {
        let input = "1 2\n1 abc\n";
        match load_instances_from_tsv(Cursor::new(input)) {
            Err(SlrError::InvalidValue { index, reason }) => {
                assert_eq!(index, 1);
                assert!(reason.contains("abc"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_tsv_empty_input() {
        assert!(matches!(
            load_instances_from_tsv(Cursor::new("\n  \n")),
            Err(SlrError::NoInstances)
        ));
    }

    #[test]
    fn test_validate_structured_instances() {
        assert!(validate_instances(&[Instance::new(1.0, 1.0)]).is_ok());
        assert!(matches!(
            validate_instances(&[Instance::weighted(1.0, 1.0, 0.0)]),
            Err(SlrError::InvalidValue { index: 0, .. })
        ));
        assert!(matches!(validate_instances(&[]), Err(SlrError::NoInstances)));
    }

    #[test]
    fn test_to_row_omits_unit_weight() {
        assert_eq!(Instance::new(1.0, 2.0).to_row(), vec![1.0, 2.0]);
        assert_eq!(
            Instance::weighted(1.0, 2.0, 3.0).to_row(),
            vec![1.0, 2.0, 3.0]
        );
    }
}
