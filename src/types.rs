//! Report data model.
//!
//! A [`Report`] is created fresh per invocation by [`crate::processing::aggregate`] (sequential)
//! or [`crate::execution::ExecutionEngine::aggregate`] (parallel) and is never mutated after it
//! is returned.

use serde::Serialize;

/// Per-band value counts. Bands are mutually exclusive and collectively exhaustive, so
/// `small + medium + large` always equals the number of classified values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BandCounts {
    pub small: usize,
    pub medium: usize,
    pub large: usize,
}

impl BandCounts {
    /// Sum of all bands.
    pub fn total(&self) -> usize {
        self.small + self.medium + self.large
    }

    /// Merge two partial counts. Associative and commutative with `BandCounts::default()` as
    /// identity.
    pub fn combine(self, other: Self) -> Self {
        Self {
            small: self.small + other.small,
            medium: self.medium + other.medium,
            large: self.large + other.large,
        }
    }
}

/// Boolean quantifier checks over the materialized values.
///
/// On an empty sequence these hold their vacuous defaults: `all_positive` and `none_negative`
/// are `true`, `any_very_large` is `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quantifiers {
    /// Every value is `> 0`.
    pub all_positive: bool,
    /// At least one value exceeds the configured huge threshold.
    pub any_very_large: bool,
    /// No value is `< 0`.
    pub none_negative: bool,
}

impl Default for Quantifiers {
    fn default() -> Self {
        Self {
            all_positive: true,
            any_very_large: false,
            none_negative: true,
        }
    }
}

impl Quantifiers {
    /// Merge partial results computed over disjoint partitions.
    pub fn combine(self, other: Self) -> Self {
        Self {
            all_positive: self.all_positive && other.all_positive,
            any_very_large: self.any_very_large || other.any_very_large,
            none_negative: self.none_negative && other.none_negative,
        }
    }
}

/// All statistics computed over one materialized sequence.
///
/// Empty input yields `count == 0`, `total == average == 0.0`, `max == f64::NEG_INFINITY`,
/// `min == f64::INFINITY`, `median == None`, zero band counts, default [`Quantifiers`] and empty
/// sequences.
///
/// `min`/`max` sentinels are infinite and serialize as `null` through `serde_json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub count: usize,
    pub total: f64,
    pub average: f64,
    pub max: f64,
    pub min: f64,
    /// Element at index `count / 2` of the ascending order. For even counts this is the upper of
    /// the two middle elements, not their mean; consumers rely on that definition.
    pub median: Option<f64>,
    /// Values strictly above `ReportConfig::high_threshold`.
    pub high_value: usize,
    pub bands: BandCounts,
    pub quantifiers: Quantifiers,
    /// Inclusive running sum, in materialization order.
    pub running_sum: Vec<f64>,
    /// Copy of the values sorted in descending order. Relative order of equal values is
    /// unspecified.
    pub sorted_desc: Vec<f64>,
}

impl Report {
    /// The report produced by an empty batch.
    pub fn empty() -> Self {
        Self {
            count: 0,
            total: 0.0,
            average: 0.0,
            max: f64::NEG_INFINITY,
            min: f64::INFINITY,
            median: None,
            high_value: 0,
            bands: BandCounts::default(),
            quantifiers: Quantifiers::default(),
            running_sum: Vec::new(),
            sorted_desc: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}
