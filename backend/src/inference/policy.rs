use shared::{AnimalClass, PredictionResponse, UNKNOWN_LABEL};
use strum::EnumCount;

use super::InferenceError;

pub const CONFIDENCE_THRESHOLD: f32 = 0.70;

/// Index and value of the largest probability. Ties go to the lowest index and NaN never wins.
fn arg_max(probabilities: &[f32]) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (index, &p) in probabilities.iter().enumerate() {
        if p.is_nan() {
            continue;
        }
        match best {
            Some((_, top)) if p <= top => {}
            _ => best = Some((index, p)),
        }
    }
    best
}

pub fn decide(probabilities: Vec<f32>) -> Result<PredictionResponse, InferenceError> {
    if probabilities.len() != AnimalClass::COUNT {
        return Err(InferenceError::ClassCountMismatch {
            expected: AnimalClass::COUNT,
            actual: probabilities.len(),
        });
    }

    let (index, confidence) = arg_max(&probabilities).ok_or(InferenceError::EmptyOutput)?;
    let class = AnimalClass::from_index(index).ok_or(InferenceError::EmptyOutput)?;

    let predicted_class = if confidence < CONFIDENCE_THRESHOLD {
        UNKNOWN_LABEL.to_string()
    } else {
        class.to_string()
    };

    Ok(PredictionResponse {
        predicted_class,
        confidence,
        probabilities,
    })
}
