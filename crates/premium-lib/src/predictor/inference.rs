//! Inference invocation
//!
//! Feeds a single-row input to one model (API path, full precision) or to
//! every registered model (interactive path, rounded for display). A failed
//! call fails the whole invocation; there are no partial results.

use super::ModelHandle;
use crate::error::InferenceError;
use crate::registry::ModelRegistry;
use crate::schema::{FeatureRecord, FeatureRow};
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Inference latency above which a warning is logged
pub const MAX_INFERENCE_MS: u128 = 50;

/// Round a raw model output to cents for display, ties to even
pub fn round_premium(raw: f64) -> f64 {
    (raw * 100.0).round_ties_even() / 100.0
}

/// One model's premium estimate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub model: String,
    /// Raw model output rounded to 2 decimal places
    #[serde(rename = "predicted_premium")]
    pub premium: f64,
    #[serde(rename = "raw_prediction")]
    pub raw: f64,
    #[serde(skip)]
    pub elapsed: Duration,
}

/// Runs prediction calls against loaded models
#[derive(Debug, Clone, Default)]
pub struct InferenceInvoker;

impl InferenceInvoker {
    pub fn new() -> Self {
        Self
    }

    /// Predict with one model, returning the value at full precision
    pub fn predict_one(&self, model: &ModelHandle, row: &FeatureRow) -> Result<f64, InferenceError> {
        self.timed(model, row).map(|(value, _)| value)
    }

    /// Predict with every model in the registry, in registry order
    pub fn predict_all(
        &self,
        registry: &ModelRegistry,
        record: &FeatureRecord,
    ) -> Result<Vec<PredictionResult>, InferenceError> {
        let row = record.to_row();
        registry
            .iter()
            .map(|model| {
                let (raw, elapsed) = self.timed(model, &row)?;
                Ok(PredictionResult {
                    model: model.name().to_string(),
                    premium: round_premium(raw),
                    raw,
                    elapsed,
                })
            })
            .collect()
    }

    fn timed(&self, model: &ModelHandle, row: &FeatureRow) -> Result<(f64, Duration), InferenceError> {
        let start = Instant::now();

        let value = model
            .predictor()
            .predict(row)
            .map_err(|e| InferenceError::Backend {
                model: model.name().to_string(),
                reason: format!("{e:#}"),
            })?;

        if !value.is_finite() {
            return Err(InferenceError::NonFinite {
                model: model.name().to_string(),
            });
        }

        let elapsed = start.elapsed();
        if elapsed.as_millis() > MAX_INFERENCE_MS {
            warn!(
                model = %model.name(),
                elapsed_ms = elapsed.as_millis() as u64,
                "Inference exceeded {}ms target",
                MAX_INFERENCE_MS
            );
        } else {
            debug!(model = %model.name(), elapsed_us = elapsed.as_micros() as u64, "Inference completed");
        }

        Ok((value, elapsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictor::Predictor;
    use std::sync::Arc;

    struct Fixed(f64);

    impl Predictor for Fixed {
        fn predict(&self, _row: &FeatureRow) -> anyhow::Result<f64> {
            Ok(self.0)
        }

        fn format(&self) -> &'static str {
            "fixed"
        }
    }

    struct AgeTimes(f64);

    impl Predictor for AgeTimes {
        fn predict(&self, row: &FeatureRow) -> anyhow::Result<f64> {
            Ok(row.value(0).unwrap_or_default() * self.0)
        }

        fn format(&self) -> &'static str {
            "age"
        }
    }

    struct Failing;

    impl Predictor for Failing {
        fn predict(&self, _row: &FeatureRow) -> anyhow::Result<f64> {
            anyhow::bail!("feature names mismatch")
        }

        fn format(&self) -> &'static str {
            "failing"
        }
    }

    fn handle(name: &str, predictor: impl Predictor + 'static) -> ModelHandle {
        ModelHandle::new(name, Arc::new(predictor))
    }

    fn registry(handles: Vec<ModelHandle>) -> ModelRegistry {
        let default = handles[0].name().to_string();
        ModelRegistry::from_handles(handles, &default).unwrap()
    }

    #[test]
    fn test_round_premium() {
        assert_eq!(round_premium(12345.678), 12345.68);
        assert_eq!(round_premium(12345.674), 12345.67);
        assert_eq!(round_premium(-3.456), -3.46);
        assert_eq!(round_premium(100.0), 100.0);
    }

    #[test]
    fn test_round_premium_ties_to_even() {
        assert_eq!(round_premium(28123.125), 28123.12);
        assert_eq!(round_premium(0.125), 0.12);
        assert_eq!(round_premium(2.625), 2.62);
        assert_eq!(round_premium(0.375), 0.38);
    }

    #[test]
    fn test_predict_all_in_registry_order() {
        let registry = registry(vec![
            handle("Random Forest", Fixed(28123.456)),
            handle("Linear Regression", AgeTimes(700.0)),
        ]);

        let results = InferenceInvoker::new()
            .predict_all(&registry, &FeatureRecord::default())
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].model, "Random Forest");
        assert_eq!(results[0].premium, 28123.46);
        assert_eq!(results[0].raw, 28123.456);
        assert_eq!(results[1].model, "Linear Regression");
        assert_eq!(results[1].premium, 24500.0);
    }

    #[test]
    fn test_displayed_premium_is_raw_rounded() {
        let registry = registry(vec![handle("XGBoost", Fixed(31999.995001))]);
        let results = InferenceInvoker::new()
            .predict_all(&registry, &FeatureRecord::default())
            .unwrap();
        assert_eq!(results[0].premium, round_premium(results[0].raw));
        assert_eq!(results[0].premium, 32000.0);
    }

    #[test]
    fn test_predict_one_keeps_full_precision() {
        let model = handle("XGBoost", Fixed(28123.456789));
        let row = FeatureRecord::default().to_row();
        assert_eq!(InferenceInvoker::new().predict_one(&model, &row).unwrap(), 28123.456789);
    }

    #[test]
    fn test_predict_is_idempotent() {
        let model = handle("Linear Regression", AgeTimes(812.37));
        let row = FeatureRecord::default().to_row();
        let invoker = InferenceInvoker::new();
        assert_eq!(
            invoker.predict_one(&model, &row).unwrap(),
            invoker.predict_one(&model, &row).unwrap()
        );
    }

    #[test]
    fn test_one_failure_fails_everything() {
        let registry = registry(vec![
            handle("Random Forest", Fixed(1.0)),
            handle("Broken", Failing),
            handle("XGBoost", Fixed(2.0)),
        ]);

        let err = InferenceInvoker::new()
            .predict_all(&registry, &FeatureRecord::default())
            .unwrap_err();
        match err {
            InferenceError::Backend { model, reason } => {
                assert_eq!(model, "Broken");
                assert!(reason.contains("feature names mismatch"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_non_finite_output_is_error() {
        let model = handle("Broken", Fixed(f64::NAN));
        let row = FeatureRecord::default().to_row();
        assert_eq!(
            InferenceInvoker::new().predict_one(&model, &row),
            Err(InferenceError::NonFinite { model: "Broken".into() })
        );
    }
}
