//! Ranking metrics over each instance's confidence vector.
//!
//! Ranks follow a pessimistic tie rule: the rank of label `i` is the number
//! of labels whose confidence is at least `confidence[i]`, itself included.
//! Tied labels therefore share the worst rank of their group. Unsupervised
//! positions are removed before ranking.

use crate::core::types::{Confidence, LabelValue};
use crate::metrics::{is_observed, mean_of_defined};
use ndarray::{ArrayView2, Axis};

/// Rank of every entry: `rank(i) = |{j : c[j] >= c[i]}|`.
///
/// ```rust
/// use multilabel_eval::metrics::ranking::rank;
///
/// assert_eq!(rank(&[0.1, 0.6, 0.3, 0.4, 0.2, 0.5]), vec![6, 1, 4, 3, 5, 2]);
/// assert_eq!(rank(&[0.9, 0.9, 0.1]), vec![2, 2, 3]);
/// ```
pub fn rank(confidences: &[Confidence]) -> Vec<usize> {
    let mut descending = confidences.to_vec();
    descending.sort_by(|a, b| b.total_cmp(a));
    confidences
        .iter()
        .map(|&c| descending.partition_point(|&v| v.total_cmp(&c).is_ge()))
        .collect()
}

/// Supervised entries of one instance, as parallel truth/confidence vectors.
fn observed(truth: &[LabelValue], confidences: &[Confidence]) -> (Vec<bool>, Vec<Confidence>) {
    truth
        .iter()
        .zip(confidences)
        .filter(|&(&y, _)| is_observed(y))
        .map(|(&y, &c)| (y == 1, c))
        .unzip()
}

/// One-error of one instance: 1 when the top-ranked label is irrelevant.
/// Among tied maxima the first label wins.
pub fn one_error_instance(truth: &[LabelValue], confidences: &[Confidence]) -> f64 {
    let (relevant, scores) = observed(truth, confidences);
    let mut best: Option<usize> = None;
    for (i, &score) in scores.iter().enumerate() {
        match best {
            Some(b) if scores[b].total_cmp(&score).is_ge() => {}
            _ => best = Some(i),
        }
    }
    match best {
        None => f64::NAN,
        Some(top) if relevant[top] => 0.0,
        Some(_) => 1.0,
    }
}

/// Average precision of one instance. An instance without relevant labels
/// scores 1.
///
/// ```rust
/// use multilabel_eval::metrics::ranking::average_precision_instance;
///
/// let ap = average_precision_instance(&[0, 1, 0, 1, 0, 1], &[0.1, 0.6, 0.3, 0.4, 0.2, 0.5]);
/// assert_eq!(ap, 1.0);
/// ```
pub fn average_precision_instance(truth: &[LabelValue], confidences: &[Confidence]) -> f64 {
    let (relevant, scores) = observed(truth, confidences);
    if scores.is_empty() {
        return f64::NAN;
    }
    let ranks = rank(&scores);
    let relevant_ranks: Vec<usize> = ranks
        .iter()
        .zip(&relevant)
        .filter(|&(_, &r)| r)
        .map(|(&rank, _)| rank)
        .collect();
    if relevant_ranks.is_empty() {
        return 1.0;
    }

    let total: f64 = relevant_ranks
        .iter()
        .map(|&rank_j| {
            let better = relevant_ranks.iter().filter(|&&rank_k| rank_k <= rank_j).count();
            better as f64 / rank_j as f64
        })
        .sum();
    total / relevant_ranks.len() as f64
}

/// Rank loss of one instance: the fraction of (relevant, irrelevant) pairs
/// where the relevant label has strictly lower confidence. 0 when either set
/// is empty.
pub fn rank_loss_instance(truth: &[LabelValue], confidences: &[Confidence]) -> f64 {
    let (relevant, scores) = observed(truth, confidences);
    if scores.is_empty() {
        return f64::NAN;
    }
    let (positives, negatives): (Vec<_>, Vec<_>) = relevant
        .iter()
        .zip(&scores)
        .partition(|&(&r, _)| r);
    if positives.is_empty() || negatives.is_empty() {
        return 0.0;
    }

    let misordered = positives
        .iter()
        .map(|&(_, &k)| negatives.iter().filter(|&&(_, &l)| k < l).count())
        .sum::<usize>();
    misordered as f64 / (positives.len() * negatives.len()) as f64
}

fn per_instance<F>(truth: ArrayView2<'_, LabelValue>, confidences: ArrayView2<'_, Confidence>, f: F) -> f64
where
    F: Fn(&[LabelValue], &[Confidence]) -> f64,
{
    mean_of_defined(
        truth
            .axis_iter(Axis(0))
            .zip(confidences.axis_iter(Axis(0)))
            .map(|(y, c)| f(&y.to_vec(), &c.to_vec())),
    )
}

/// Calculate one-error.
pub fn one_error(truth: ArrayView2<'_, LabelValue>, confidences: ArrayView2<'_, Confidence>) -> f64 {
    per_instance(truth, confidences, one_error_instance)
}

/// Calculate average precision.
pub fn average_precision(truth: ArrayView2<'_, LabelValue>, confidences: ArrayView2<'_, Confidence>) -> f64 {
    per_instance(truth, confidences, average_precision_instance)
}

/// Calculate rank loss.
pub fn rank_loss(truth: ArrayView2<'_, LabelValue>, confidences: ArrayView2<'_, Confidence>) -> f64 {
    per_instance(truth, confidences, rank_loss_instance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_rank_with_ties() {
        assert_eq!(rank(&[0.5, 0.5, 0.5, 0.1]), vec![3, 3, 3, 4]);
        assert_eq!(rank(&[0.1, 0.1]), vec![2, 2]);
        assert_eq!(rank(&[0.7]), vec![1]);
        assert!(rank(&[]).is_empty());
    }

    #[test]
    fn test_average_precision_perfect_ranking() {
        let y = [0, 1, 0, 1, 0, 1];
        let c = [0.1, 0.6, 0.3, 0.4, 0.2, 0.5];
        assert_eq!(average_precision_instance(&y, &c), 1.0);
        assert_eq!(rank_loss_instance(&y, &c), 0.0);
        assert_eq!(one_error_instance(&y, &c), 0.0);
    }

    #[test]
    fn test_average_precision_mixed_ranking() {
        let c = [0.945, 0.014, 0.394, 0.854, 0.786, 0.993, 0.883, 0.170];
        let y = [1, 1, 1, 1, 0, 0, 1, 0];
        assert_abs_diff_eq!(average_precision_instance(&y, &c), 0.641_666_666_666_666_7, epsilon = 1e-12);

        let y = [1, 1, 0, 1, 1, 0, 1, 0];
        assert_abs_diff_eq!(average_precision_instance(&y, &c), 0.668_333_333_333_333_3, epsilon = 1e-12);
    }

    #[test]
    fn test_average_precision_with_ties() {
        // both labels tied at rank 2; the relevant one gets 1/2
        assert_eq!(average_precision_instance(&[1, 0], &[0.5, 0.5]), 0.5);
    }

    #[test]
    fn test_empty_label_sets() {
        assert_eq!(average_precision_instance(&[0, 0, 0], &[0.2, 0.5, 0.1]), 1.0);
        assert_eq!(rank_loss_instance(&[0, 0, 0], &[0.2, 0.5, 0.1]), 0.0);
        assert_eq!(rank_loss_instance(&[1, 1], &[0.2, 0.5]), 0.0);
    }

    #[test]
    fn test_rank_loss_counts_strict_inversions() {
        // pairs: (0.3 vs 0.6) inverted, (0.3 vs 0.3) tie, (0.9 vs either) fine
        let loss = rank_loss_instance(&[1, 1, 0, 0], &[0.3, 0.9, 0.6, 0.3]);
        assert_abs_diff_eq!(loss, 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_missing_positions_are_removed() {
        let y = [1, -1, 0];
        let c = [0.4, 0.99, 0.1];
        assert_eq!(one_error_instance(&y, &c), 0.0);
        assert_eq!(average_precision_instance(&y, &c), 1.0);
        assert!(average_precision_instance(&[-1, -1], &[0.1, 0.2]).is_nan());
    }

    #[test]
    fn test_dataset_means() {
        let truth = array![[1, 0], [0, 1], [-1, -1]];
        let confidences = array![[0.9, 0.1], [0.8, 0.2], [0.5, 0.5]];
        assert_abs_diff_eq!(one_error(truth.view(), confidences.view()), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(rank_loss(truth.view(), confidences.view()), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(average_precision(truth.view(), confidences.view()), 0.75, epsilon = 1e-12);
    }
}
