//! Running preference vector built from food swipes.
//!
//! The vector is an online average over every food swipe of the session, where
//! each sample is weighted by its direction:
//!
//! ```text
//! new[i] = (old[i] * (n - 1) + weight * embedding[i]) / n
//! ```
//!
//! `n` is the number of food swipes including the current one. The very first
//! sample seeds the vector with the raw embedding, whatever its direction.

use crate::{
    error::{AppError, AppResult},
    models::SwipeDirection,
};

/// Components at or below this magnitude count as zero
pub const MEANINGFUL_EPSILON: f32 = 1e-6;

/// Pull of one swipe on the running average
pub fn direction_weight(direction: SwipeDirection) -> f32 {
    match direction {
        SwipeDirection::Left => -1.0,
        SwipeDirection::Right => 1.0,
        // A superlike counts as three ordinary likes
        SwipeDirection::Super => 3.0,
    }
}

/// Folds one food embedding into the intent vector
///
/// `n` is the post-increment food swipe count and is clamped to at least 1.
pub fn fold(
    current: Option<&[f32]>,
    embedding: &[f32],
    direction: SwipeDirection,
    n: i64,
) -> AppResult<Vec<f32>> {
    let Some(current) = current else {
        return Ok(embedding.to_vec());
    };

    if current.len() != embedding.len() {
        return Err(AppError::DimensionMismatch {
            expected: current.len(),
            got: embedding.len(),
        });
    }

    let n = n.max(1) as f32;
    let weight = direction_weight(direction);

    Ok(current
        .iter()
        .zip(embedding)
        .map(|(old, sample)| (old * (n - 1.0) + weight * sample) / n)
        .collect())
}

/// Whether the vector carries any preference signal
///
/// An all-near-zero vector (likes and dislikes cancelling out) is treated the
/// same as having no vector at all.
pub fn is_meaningful(vector: &[f32]) -> bool {
    vector.iter().any(|v| v.abs() > MEANINGFUL_EPSILON)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: &[f32], expected: &[f32]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-5, "{:?} != {:?}", actual, expected);
        }
    }

    #[test]
    fn test_first_swipe_seeds_vector() {
        let seeded = fold(None, &[0.5, -0.25], SwipeDirection::Left, 1).unwrap();
        assert_eq!(seeded, vec![0.5, -0.25]);
    }

    #[test]
    fn test_three_swipes_match_hand_computed_average() {
        // e1 = [1, 0], right  -> v1 = [1, 0]
        // e2 = [0, 1], left   -> v2 = ([1, 0] * 1 - [0, 1]) / 2 = [0.5, -0.5]
        // e3 = [1, 1], super  -> v3 = ([0.5, -0.5] * 2 + 3 * [1, 1]) / 3 = [4/3, 2/3]
        let v1 = fold(None, &[1.0, 0.0], SwipeDirection::Right, 1).unwrap();
        let v2 = fold(Some(&v1), &[0.0, 1.0], SwipeDirection::Left, 2).unwrap();
        assert_close(&v2, &[0.5, -0.5]);
        let v3 = fold(Some(&v2), &[1.0, 1.0], SwipeDirection::Super, 3).unwrap();
        assert_close(&v3, &[4.0 / 3.0, 2.0 / 3.0]);
    }

    #[test]
    fn test_zero_count_is_clamped() {
        let folded = fold(Some(&[2.0]), &[4.0], SwipeDirection::Right, 0).unwrap();
        assert_close(&folded, &[4.0]);
    }

    #[test]
    fn test_dimension_mismatch() {
        let err = fold(Some(&[1.0, 2.0]), &[1.0], SwipeDirection::Right, 2).unwrap_err();
        assert!(matches!(
            err,
            AppError::DimensionMismatch {
                expected: 2,
                got: 1
            }
        ));
    }

    #[test]
    fn test_cancelled_vector_is_not_meaningful() {
        let v1 = fold(None, &[0.3, 0.3], SwipeDirection::Right, 1).unwrap();
        let v2 = fold(Some(&v1), &[0.3, 0.3], SwipeDirection::Left, 2).unwrap();
        assert!(!is_meaningful(&v2));
        assert!(is_meaningful(&v1));
        assert!(!is_meaningful(&[]));
    }
}
