/// Equality-ratio accuracy metrics
use crate::error::{MinerError, Result};

fn equality_ratio<T: PartialEq>(metric: &'static str, truth: &[T], predicted: &[T]) -> Result<f64> {
    if truth.len() != predicted.len() {
        return Err(MinerError::MismatchedLengths {
            metric,
            expected: truth.len(),
            actual: predicted.len(),
        });
    }
    if truth.is_empty() {
        return Ok(0.0);
    }
    let correct = truth.iter().zip(predicted).filter(|(a, b)| a == b).count();
    Ok(correct as f64 / truth.len() as f64)
}

/// Share of lines whose predicted group id equals the reference id
pub fn grouping_accuracy<T: PartialEq>(true_group_ids: &[T], predicted_group_ids: &[T]) -> Result<f64> {
    equality_ratio("GA", true_group_ids, predicted_group_ids)
}

/// Share of lines whose predicted template equals the reference template
pub fn parsing_accuracy<T: PartialEq>(true_templates: &[T], predicted_templates: &[T]) -> Result<f64> {
    equality_ratio("PA", true_templates, predicted_templates)
}
