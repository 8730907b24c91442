//! Net score and accuracy calculation.
//!
//! Net = correct − wrong / 4, the standard Turkish multiple-choice scoring
//! that penalizes guessing. Nets are never rounded here; rounding is a
//! presentation concern.

use crate::error::{AnalysisError, Result};
use crate::model::SubjectResult;

/// Wrong answers that cancel one correct answer.
pub const WRONG_ANSWER_PENALTY_DIVISOR: f64 = 4.0;

pub(crate) fn ensure_non_negative(field: &str, value: i64) -> Result<()> {
    if value < 0 {
        return Err(AnalysisError::invalid(
            field,
            format!("must be non-negative, got {value}"),
        ));
    }
    Ok(())
}

/// Sum of signed counts, or `InvalidInput` for `field` when it overflows.
pub(crate) fn checked_total(field: &str, counts: &[i64]) -> Result<i64> {
    counts
        .iter()
        .try_fold(0i64, |acc, &c| acc.checked_add(c))
        .ok_or_else(|| AnalysisError::invalid(field, "sum of counts overflows"))
}

/// Sum of unsigned counts, or `InvalidInput` for `field` when it overflows.
pub(crate) fn checked_sum(field: &str, counts: impl IntoIterator<Item = u64>) -> Result<u64> {
    counts
        .into_iter()
        .try_fold(0u64, |acc, c| acc.checked_add(c))
        .ok_or_else(|| AnalysisError::invalid(field, "sum of counts overflows"))
}

/// Percentage of `correct` over `total`, 0 when `total` is 0.
pub(crate) fn rate(correct: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    correct as f64 / total as f64 * 100.0
}

/// Compute the net score: `correct - wrong / 4`.
pub fn compute_net(correct: i64, wrong: i64) -> Result<f64> {
    ensure_non_negative("correct", correct)?;
    ensure_non_negative("wrong", wrong)?;
    Ok(correct as f64 - wrong as f64 / WRONG_ANSWER_PENALTY_DIVISOR)
}

/// Compute accuracy as a percentage of attempted questions.
///
/// Returns 0 when nothing was attempted, so an empty period never produces
/// NaN.
pub fn compute_accuracy(correct: i64, total_attempted: i64) -> Result<f64> {
    ensure_non_negative("correct", correct)?;
    ensure_non_negative("total_attempted", total_attempted)?;
    if correct > total_attempted {
        return Err(AnalysisError::invalid(
            "correct",
            format!("{correct} exceeds attempted total {total_attempted}"),
        ));
    }
    Ok(rate(correct as u64, total_attempted as u64))
}

/// Net and accuracy of one validated subject.
pub fn score_subject(subject: &SubjectResult) -> Result<(f64, f64)> {
    subject.validate()?;
    let net = compute_net(subject.correct, subject.wrong)?;
    let accuracy = compute_accuracy(subject.correct, subject.attempted()?)?;
    Ok((net, accuracy))
}
