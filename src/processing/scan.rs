//! Inclusive prefix sums.

/// `out[i] == values[0] + ... + values[i]`, in input order. Empty input yields an empty vector.
pub fn inclusive_running_sum(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .scan(0.0, |acc, &v| {
            *acc += v;
            Some(*acc)
        })
        .collect()
}

/// Add `offset` to every element of a chunk-local prefix sum.
///
/// Second pass of the two-pass parallel scan: each chunk is scanned independently, then shifted
/// by the sum of all preceding chunks.
pub fn offset_in_place(chunk: &mut [f64], offset: f64) {
    if offset != 0.0 {
        for v in chunk {
            *v += offset;
        }
    }
}

/// Exclusive prefix sums of per-chunk totals: the offset each chunk starts from.
pub fn chunk_offsets(chunk_totals: &[f64]) -> Vec<f64> {
    let mut acc = 0.0;
    chunk_totals
        .iter()
        .map(|&t| {
            let start = acc;
            acc += t;
            start
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{chunk_offsets, inclusive_running_sum, offset_in_place};

    #[test]
    fn running_sum_accumulates_in_order() {
        assert_eq!(
            inclusive_running_sum(&[5.0, 1.0, 4.0, 2.0, 3.0]),
            vec![5.0, 6.0, 10.0, 12.0, 15.0]
        );
    }

    #[test]
    fn running_sum_of_empty_is_empty() {
        assert!(inclusive_running_sum(&[]).is_empty());
    }

    #[test]
    fn two_pass_scan_matches_sequential() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let chunks: Vec<&[f64]> = values.chunks(3).collect();

        let mut locals: Vec<Vec<f64>> = chunks.iter().map(|c| inclusive_running_sum(c)).collect();
        let totals: Vec<f64> = locals.iter().map(|l| l.last().copied().unwrap_or(0.0)).collect();
        let offsets = chunk_offsets(&totals);
        assert_eq!(offsets, vec![0.0, 6.0, 21.0]);

        for (local, offset) in locals.iter_mut().zip(offsets) {
            offset_in_place(local, offset);
        }
        let merged: Vec<f64> = locals.into_iter().flatten().collect();
        assert_eq!(merged, inclusive_running_sum(&values));
    }
}
