//! Sequential report assembly.

use crate::config::ReportConfig;
use crate::types::Report;

use super::materialize::Materialized;
use super::order::{descending_sorted_copy, median};
use super::reduce::{band_counts, count_above, quantifiers, Summary};
use super::scan::inclusive_running_sum;

/// Run every engine over `values` on the calling thread and assemble a [`Report`].
///
/// `cfg` is assumed valid; callers building it by hand should run [`ReportConfig::validate`].
pub fn aggregate(values: &Materialized, cfg: &ReportConfig) -> Report {
    if values.is_empty() {
        return Report::empty();
    }
    let summary = Summary::of(values);
    Report {
        count: summary.count,
        total: summary.total,
        average: summary.average(),
        max: summary.max,
        min: summary.min,
        median: median(values),
        high_value: count_above(values, cfg.high_threshold),
        bands: band_counts(values, &cfg.bands),
        quantifiers: quantifiers(values, cfg),
        running_sum: inclusive_running_sum(values),
        sorted_desc: descending_sorted_copy(values),
    }
}

#[cfg(test)]
mod tests {
    use super::aggregate;
    use crate::config::ReportConfig;
    use crate::processing::Materialized;
    use crate::types::{BandCounts, Report};

    #[test]
    fn aggregate_small_sequence() {
        let seq = Materialized::from(vec![5.0, 1.0, 4.0, 2.0, 3.0]);
        let r = aggregate(&seq, &ReportConfig::default());

        assert_eq!(r.count, 5);
        assert_eq!(r.total, 15.0);
        assert_eq!(r.average, 3.0);
        assert_eq!(r.max, 5.0);
        assert_eq!(r.min, 1.0);
        assert_eq!(r.median, Some(3.0));
        assert_eq!(r.running_sum, vec![5.0, 6.0, 10.0, 12.0, 15.0]);
        assert_eq!(r.sorted_desc, vec![5.0, 4.0, 3.0, 2.0, 1.0]);
        assert_eq!(
            r.bands,
            BandCounts {
                small: 5,
                medium: 0,
                large: 0
            }
        );
        assert!(r.quantifiers.all_positive);
        assert!(!r.quantifiers.any_very_large);
        assert!(r.quantifiers.none_negative);
    }

    #[test]
    fn aggregate_empty_sequence_is_empty_report() {
        let r = aggregate(&Materialized::from(Vec::new()), &ReportConfig::default());
        assert_eq!(r, Report::empty());
        assert!(r.is_empty());
    }

    #[test]
    fn aggregate_counts_high_values() {
        let seq = Materialized::from(vec![1_176.0, 78.4, 2_450.0, 14.7, 1_764.0]);
        let r = aggregate(&seq, &ReportConfig::default());
        assert_eq!(r.high_value, 3);
        assert!(r.quantifiers.any_very_large);
        assert_eq!(
            r.bands,
            BandCounts {
                small: 2,
                medium: 0,
                large: 3
            }
        );
    }
}
