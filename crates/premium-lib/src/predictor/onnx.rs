//! ONNX inference using tract
//!
//! Runs regression graphs that take one `f32 [1, 24]` input in canonical
//! feature order and produce the premium as their first output value.

use super::Predictor;
use crate::schema::{FeatureRow, FEATURE_COUNT};
use anyhow::{Context, Result};
use tract_onnx::prelude::*;

type TractModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// ONNX-based predictor, optimized once at load
pub struct OnnxPredictor {
    model: TractModel,
}

impl OnnxPredictor {
    /// Parse, type and optimize an ONNX model from bytes
    pub fn from_bytes(model_bytes: &[u8]) -> Result<Self> {
        let model = tract_onnx::onnx()
            .model_for_read(&mut std::io::Cursor::new(model_bytes))
            .context("Failed to parse ONNX model")?
            .with_input_fact(0, f32::fact([1, FEATURE_COUNT]).into())
            .context("Failed to set input shape")?
            .into_optimized()
            .context("Failed to optimize model")?
            .into_runnable()
            .context("Failed to create runnable model")?;
        Ok(Self { model })
    }

    fn row_to_tensor(row: &FeatureRow) -> Result<Tensor> {
        let data: Vec<f32> = row.as_slice().iter().map(|v| *v as f32).collect();
        let array = tract_ndarray::Array2::from_shape_vec((1, FEATURE_COUNT), data)
            .context("Feature row has wrong width")?;
        Ok(array.into())
    }
}

impl Predictor for OnnxPredictor {
    fn predict(&self, row: &FeatureRow) -> Result<f64> {
        let input = Self::row_to_tensor(row)?;
        let result = self.model.run(tvec!(input.into()))?;
        let output = result.first().context("No output from model")?;

        let view = output.to_array_view::<f32>()?;
        let value = view.iter().next().copied().context("Model output is empty")?;
        Ok(value as f64)
    }

    fn format(&self) -> &'static str {
        "onnx"
    }
}
