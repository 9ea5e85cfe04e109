//! One-pass collection of a lazy pipeline into a shared, read-only sequence.

use std::ops::Deref;
use std::sync::Arc;

/// The ordered values produced by one full pipeline pass.
///
/// Cloning shares the same storage. Engines that need to reorder values (sorting, selection)
/// copy them first; the shared sequence itself is never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct Materialized {
    values: Arc<[f64]>,
}

impl Materialized {
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values: values.into(),
        }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Private mutable working copy for engines that reorder values.
    pub fn to_vec(&self) -> Vec<f64> {
        self.values.to_vec()
    }
}

impl Deref for Materialized {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.values
    }
}

impl From<Vec<f64>> for Materialized {
    fn from(values: Vec<f64>) -> Self {
        Self::new(values)
    }
}

impl FromIterator<f64> for Materialized {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Drain a lazy pipeline exactly once, preserving order.
pub fn materialize<I>(lazy: I) -> Materialized
where
    I: IntoIterator<Item = f64>,
{
    lazy.into_iter().collect()
}
