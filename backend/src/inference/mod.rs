pub mod model;
pub mod policy;
pub mod preprocess;

use shared::PredictionResponse;

use model::Classifier;

#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("failed to load model from {path}: {reason}")]
    Load { path: String, reason: String },
    #[error("unsupported content type: {0}")]
    UnsupportedContentType(String),
    #[error("cannot decode image: {0}")]
    ImageDecode(#[from] image::ImageError),
    #[error("input shape {actual:?} does not match model input {expected:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },
    #[error("model inference failed: {0}")]
    Runtime(String),
    #[error("model returned no usable probabilities")]
    EmptyOutput,
    #[error("model returned {actual} probabilities, expected {expected}")]
    ClassCountMismatch { expected: usize, actual: usize },
}

/// Preprocesses `image`, runs it through `classifier` and applies the decision policy.
pub fn classify(
    classifier: &dyn Classifier,
    image: &[u8],
) -> Result<PredictionResponse, InferenceError> {
    let tensor = preprocess::preprocess(image)?;
    let probabilities = classifier.predict(&tensor)?;
    policy::decide(probabilities)
}
