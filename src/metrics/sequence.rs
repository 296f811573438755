//! Edit distance between truth and predicted label vectors.

use crate::core::types::LabelValue;
use crate::metrics::{is_observed, mean_of_defined};
use ndarray::{ArrayView2, Axis};

/// Levenshtein distance with unit insertion, deletion and substitution
/// costs. Uses two rolling rows sized by the shorter sequence.
///
/// ```rust
/// use multilabel_eval::metrics::sequence::levenshtein;
///
/// assert_eq!(levenshtein(b"kitten", b"sitting"), 3);
/// assert_eq!(levenshtein::<u8>(&[], b"abc"), 3);
/// ```
pub fn levenshtein<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    let mut previous: Vec<usize> = (0..=short.len()).collect();
    let mut current = vec![0usize; short.len() + 1];

    for (i, x) in long.iter().enumerate() {
        current[0] = i + 1;
        for (j, y) in short.iter().enumerate() {
            let substitution = previous[j] + usize::from(x != y);
            let deletion = previous[j + 1] + 1;
            let insertion = current[j] + 1;
            current[j + 1] = substitution.min(deletion).min(insertion);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[short.len()]
}

/// Calculate the normalized Levenshtein distance averaged over instances.
///
/// Unsupervised positions are removed from both vectors and each distance is
/// divided by the number of remaining positions.
pub fn levenshtein_distance(truth: ArrayView2<'_, LabelValue>, predicted: ArrayView2<'_, LabelValue>) -> f64 {
    mean_of_defined(truth.axis_iter(Axis(0)).zip(predicted.axis_iter(Axis(0))).map(|(y, p)| {
        let (y, p): (Vec<LabelValue>, Vec<LabelValue>) = y
            .iter()
            .zip(p.iter())
            .filter(|&(&t, _)| is_observed(t))
            .map(|(&t, &q)| (t, q))
            .unzip();
        if y.is_empty() {
            f64::NAN
        } else {
            levenshtein(&y, &p) as f64 / y.len() as f64
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein(&[1, 2, 3], &[1, 2, 3]), 0);
        assert_eq!(levenshtein(&[1, 2, 3], &[1, 3]), 1);
        assert_eq!(levenshtein(&[0, 1, 0, 1], &[1, 0, 1, 0]), 2);
        assert_eq!(levenshtein(&[5, 5], &[6, 7, 8]), 3);
        assert_eq!(levenshtein::<i32>(&[], &[]), 0);
    }

    #[test]
    fn test_symmetric() {
        let a = [3, 1, 4, 1, 5, 9, 2, 6];
        let b = [2, 7, 1, 8, 2, 8];
        assert_eq!(levenshtein(&a, &b), levenshtein(&b, &a));
    }

    #[test]
    fn test_normalized_distance() {
        let truth = array![[0, 1, 0, 1], [2, 2, 1, 0]];
        let predicted = array![[1, 0, 1, 0], [2, 2, 1, 0]];
        assert_abs_diff_eq!(levenshtein_distance(truth.view(), predicted.view()), 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_missing_positions() {
        let truth = array![[1, -1, 0], [-1, -1, -1]];
        let predicted = array![[1, 1, 0], [0, 0, 0]];
        assert_eq!(levenshtein_distance(truth.view(), predicted.view()), 0.0);

        let all_missing = array![[-1, -1]];
        let any = array![[0, 1]];
        assert!(levenshtein_distance(all_missing.view(), any.view()).is_nan());
    }
}
