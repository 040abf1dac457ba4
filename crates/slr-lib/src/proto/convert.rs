//! Conversions between wire messages and core types

use super::slr::v1 as pb;
use crate::instances::Instance;
use crate::regression::{Model, ModelValue, TrainingResults};
use crate::stats::UsageStats;

impl From<&pb::Instance> for Instance {
    /// A zero weight is the proto3 default and reads as an unweighted instance.
    fn from(instance: &pb::Instance) -> Self {
        let weight = if instance.weight == 0.0 {
            1.0
        } else {
            instance.weight
        };
        Instance::weighted(instance.argument, instance.target, weight)
    }
}

impl From<&Instance> for pb::Instance {
    fn from(instance: &Instance) -> Self {
        Self {
            argument: instance.argument,
            target: instance.target,
            weight: instance.weight,
        }
    }
}

impl pb::Pool {
    pub fn to_instances(&self) -> Vec<Instance> {
        self.instances.iter().map(Instance::from).collect()
    }
}

impl From<Model> for pb::SimpleRegressionModel {
    fn from(model: Model) -> Self {
        Self {
            coefficient: model.coefficient,
            intercept: model.intercept,
            name: model.name.unwrap_or_default(),
        }
    }
}

impl From<pb::SimpleRegressionModel> for Model {
    fn from(model: pb::SimpleRegressionModel) -> Self {
        Self {
            coefficient: model.coefficient,
            intercept: model.intercept,
            name: (!model.name.is_empty()).then_some(model.name),
        }
    }
}

impl From<TrainingResults> for pb::TrainingResults {
    fn from(results: TrainingResults) -> Self {
        Self {
            model: Some(results.model.into()),
            sum_squared_errors: results.sum_squared_errors,
            name: results.name.unwrap_or_default(),
            creation_time: results
                .creation_time
                .map(|t| t.to_rfc3339())
                .unwrap_or_default(),
            error: results.error.unwrap_or_default(),
        }
    }
}

impl From<ModelValue> for pb::ModelValue {
    fn from(value: ModelValue) -> Self {
        Self {
            value: value.value,
            argument: value.argument,
            model: Some(value.model.into()),
            from_cache: value.from_cache,
            calculation_time: value.calculation_time.to_rfc3339(),
        }
    }
}

impl From<UsageStats> for pb::ServerStats {
    fn from(stats: UsageStats) -> Self {
        Self {
            total_requests: stats.total_requests,
            succeeded_requests: stats.succeeded_requests,
            total_instances: stats.total_instances,
        }
    }
}

impl From<pb::ServerStats> for UsageStats {
    fn from(stats: pb::ServerStats) -> Self {
        Self {
            total_requests: stats.total_requests,
            succeeded_requests: stats.succeeded_requests,
            total_instances: stats.total_instances,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_zero_weight_reads_as_default() {
        let instance = Instance::from(&pb::Instance {
            argument: 1.0,
            target: 2.0,
            weight: 0.0,
        });
        assert_eq!(instance, Instance::new(1.0, 2.0));

        let instance = Instance::from(&pb::Instance {
            argument: 1.0,
            target: 2.0,
            weight: -3.0,
        });
        assert!(instance.validate(0).is_err());
    }

    #[test]
    fn test_unstored_results_leave_fields_empty() {
        let results = pb::TrainingResults::from(TrainingResults {
            model: Model::new(2.0, 1.0),
            sum_squared_errors: 0.5,
            name: None,
            creation_time: None,
            error: None,
        });

        assert_eq!(results.name, "");
        assert_eq!(results.creation_time, "");
        assert_eq!(results.model.unwrap().coefficient, 2.0);
    }

    #[test]
    fn test_stored_results_carry_rfc3339_time() {
        let creation_time = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let results = pb::TrainingResults::from(TrainingResults {
            model: Model::new(2.0, 1.0).with_name("abc"),
            sum_squared_errors: 0.0,
            name: Some("abc".to_string()),
            creation_time: Some(creation_time),
            error: None,
        });

        assert_eq!(results.creation_time, "2024-03-01T12:00:00+00:00");
        assert_eq!(results.model.unwrap().name, "abc");
    }

    #[test]
    fn test_model_name_empty_string_is_none() {
        let model = Model::from(pb::SimpleRegressionModel {
            coefficient: 1.0,
            intercept: 0.0,
            name: String::new(),
        });
        assert!(model.name.is_none());
    }
}
