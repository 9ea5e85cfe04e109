//! Reduction operations over a materialized sequence.
//!
//! Every reduction here is either an associative fold with an identity element ([`Summary`],
//! [`BandCounts`], [`Quantifiers`]) or a per-element count, so partial results computed over
//! disjoint chunks can be merged in any grouping. [`crate::execution::ExecutionEngine`] relies on
//! that to run them in parallel.

use crate::config::{BandBoundaries, ReportConfig};
use crate::types::{BandCounts, Quantifiers};

/// Built-in scalar reductions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReduceOp {
    /// Number of values.
    Count,
    /// Sum of values (`0.0` when empty).
    Total,
    /// `total / count` (`0.0` when empty).
    Average,
    /// Smallest value (`f64::INFINITY` when empty).
    Min,
    /// Largest value (`f64::NEG_INFINITY` when empty).
    Max,
}

/// Count / sum / min / max accumulator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub total: f64,
    pub min: f64,
    pub max: f64,
}

impl Summary {
    /// Identity element of [`Summary::combine`].
    pub const EMPTY: Self = Self {
        count: 0,
        total: 0.0,
        min: f64::INFINITY,
        max: f64::NEG_INFINITY,
    };

    pub fn of(values: &[f64]) -> Self {
        values.iter().fold(Self::EMPTY, |acc, &v| acc.push(v))
    }

    pub fn push(self, v: f64) -> Self {
        Self {
            count: self.count + 1,
            total: self.total + v,
            min: self.min.min(v),
            max: self.max.max(v),
        }
    }

    pub fn combine(self, other: Self) -> Self {
        Self {
            count: self.count + other.count,
            total: self.total + other.total,
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Mean value, guarded to `0.0` for an empty summary.
    pub fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total / self.count as f64
        }
    }

    pub fn get(&self, op: ReduceOp) -> f64 {
        match op {
            ReduceOp::Count => self.count as f64,
            ReduceOp::Total => self.total,
            ReduceOp::Average => self.average(),
            ReduceOp::Min => self.min,
            ReduceOp::Max => self.max,
        }
    }
}

impl Default for Summary {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Reduce `values` with a built-in [`ReduceOp`].
///
/// Total over empty input: see [`ReduceOp`] for each operation's empty result.
pub fn reduce(values: &[f64], op: ReduceOp) -> f64 {
    Summary::of(values).get(op)
}

/// `true` iff every item satisfies `pred` (vacuously `true` when empty).
pub fn all_of<T, P>(items: &[T], pred: P) -> bool
where
    P: Fn(&T) -> bool,
{
    items.iter().all(pred)
}

/// `true` iff at least one item satisfies `pred` (`false` when empty).
pub fn any_of<T, P>(items: &[T], pred: P) -> bool
where
    P: Fn(&T) -> bool,
{
    items.iter().any(pred)
}

/// `true` iff no item satisfies `pred` (`true` when empty).
pub fn none_of<T, P>(items: &[T], pred: P) -> bool
where
    P: Fn(&T) -> bool,
{
    !items.iter().any(pred)
}

/// Value band used for categorical counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Small,
    Medium,
    Large,
}

impl BandBoundaries {
    /// Classify one value. NaN falls through to [`Band::Large`] so every value lands in exactly
    /// one band.
    pub fn classify(&self, v: f64) -> Band {
        if v < self.small_below {
            Band::Small
        } else if v < self.large_from {
            Band::Medium
        } else {
            Band::Large
        }
    }
}

impl BandCounts {
    /// Count one value into its band.
    pub fn push(mut self, band: Band) -> Self {
        match band {
            Band::Small => self.small += 1,
            Band::Medium => self.medium += 1,
            Band::Large => self.large += 1,
        }
        self
    }
}

pub fn band_counts(values: &[f64], bands: &BandBoundaries) -> BandCounts {
    values
        .iter()
        .fold(BandCounts::default(), |acc, &v| acc.push(bands.classify(v)))
}

/// Number of values strictly above `threshold`.
pub fn count_above(values: &[f64], threshold: f64) -> usize {
    values.iter().filter(|&&v| v > threshold).count()
}

/// Report quantifier flags for `values`.
pub fn quantifiers(values: &[f64], cfg: &ReportConfig) -> Quantifiers {
    Quantifiers {
        all_positive: all_of(values, |&v| v > 0.0),
        any_very_large: any_of(values, |&v| v > cfg.huge_threshold),
        none_negative: none_of(values, |&v| v < 0.0),
    }
}
