use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter, IntoEnumIterator, IntoStaticStr};

/// Label reported when the top probability falls below the confidence threshold.
pub const UNKNOWN_LABEL: &str = "unknown";

/// Classes the model was trained on. Declaration order is the model's output order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumCount, EnumIter, IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum AnimalClass {
    Cats,
    Dogs,
    Snakes,
}

impl AnimalClass {
    pub fn from_index(index: usize) -> Option<Self> {
        Self::iter().nth(index)
    }

    pub fn labels() -> Vec<&'static str> {
        Self::iter().map(|class| class.into()).collect()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PredictionResponse {
    pub predicted_class: String,
    pub confidence: f32,
    pub probabilities: Vec<f32>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}
