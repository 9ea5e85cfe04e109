//! Order statistics: descending sort and median selection.
//!
//! Both operations work on private copies; the input slice is never reordered. Comparisons use
//! [`f64::total_cmp`], so NaN values sort deterministically instead of panicking.

use std::cmp::Ordering;

/// Descending comparator used for sorting.
pub fn descending(a: &f64, b: &f64) -> Ordering {
    b.total_cmp(a)
}

/// Copy of `values` sorted from largest to smallest.
///
/// The sort is unstable: callers must not rely on the relative order of equal values.
pub fn descending_sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_unstable_by(descending);
    out
}

/// Median by selection on a private copy.
///
/// Returns the element at index `len / 2` of the ascending order, or `None` for empty input.
/// For odd lengths that is the middle element. For even lengths it is the upper of the two middle
/// elements rather than their mean (`[1, 2, 3, 4]` yields `3`); existing report consumers depend
/// on this definition, so it is kept as is.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut work = values.to_vec();
    let mid = work.len() / 2;
    let (_, m, _) = work.select_nth_unstable_by(mid, f64::total_cmp);
    Some(*m)
}
