use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use ndarray::Array4;
use tract_onnx::prelude::*;

use super::InferenceError;
use crate::config::{IMG_HEIGHT, IMG_WIDTH};

pub const INPUT_SHAPE: [usize; 4] = [1, IMG_HEIGHT as usize, IMG_WIDTH as usize, 3];

/// A loaded classifier. Implementations are shared read-only between workers.
pub trait Classifier: Send + Sync {
    /// Runs a forward pass and returns one probability per class.
    fn predict(&self, input: &Array4<f32>) -> Result<Vec<f32>, InferenceError>;
}

pub struct OnnxClassifier {
    plan: TypedRunnableModel<TypedModel>,
}

impl OnnxClassifier {
    /// Loads and optimizes the graph. Malformed graphs that make tract panic are reported as
    /// `InferenceError::Load` instead of unwinding into the caller.
    pub fn load(model_path: impl AsRef<Path>) -> Result<Self, InferenceError> {
        let path = model_path.as_ref();
        panic::catch_unwind(AssertUnwindSafe(|| Self::build_plan(path))).unwrap_or_else(|_| {
            Err(InferenceError::Load {
                path: path.display().to_string(),
                reason: "model loader panicked".to_string(),
            })
        })
    }

    fn build_plan(path: &Path) -> Result<Self, InferenceError> {
        let load_error = |e: TractError| InferenceError::Load {
            path: path.display().to_string(),
            reason: format!("{e:#}"),
        };

        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|model| model.with_input_fact(0, f32::fact(INPUT_SHAPE).into()))
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(load_error)?;

        Ok(Self { plan })
    }
}

impl Classifier for OnnxClassifier {
    fn predict(&self, input: &Array4<f32>) -> Result<Vec<f32>, InferenceError> {
        if input.shape() != INPUT_SHAPE {
            return Err(InferenceError::ShapeMismatch {
                expected: INPUT_SHAPE.to_vec(),
                actual: input.shape().to_vec(),
            });
        }

        let data = input.as_standard_layout();
        let slice = data
            .as_slice()
            .ok_or_else(|| InferenceError::Runtime("input tensor is not contiguous".into()))?;
        let tensor = Tensor::from_shape(&INPUT_SHAPE, slice)
            .map_err(|e| InferenceError::Runtime(e.to_string()))?;

        let outputs = self
            .plan
            .run(tvec!(tensor.into()))
            .map_err(|e| InferenceError::Runtime(e.to_string()))?;
        let output = outputs
            .first()
            .ok_or(InferenceError::EmptyOutput)?
            .to_array_view::<f32>()
            .map_err(|e| InferenceError::Runtime(e.to_string()))?;

        Ok(output.iter().copied().collect())
    }
}
