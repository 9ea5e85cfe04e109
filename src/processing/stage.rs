//! Lazy filter/transform stage pipelines.
//!
//! A [`Pipeline`] turns each record of a batch into at most one `f64`. Stages run in order:
//!
//! 1. zero or more record filters ([`Filter::Record`])
//! 2. exactly one record → value transform ([`Transform::Extract`])
//! 3. zero or more value stages ([`Filter::Value`], [`Transform::Value`])
//!
//! A record is dropped as soon as one filter rejects it. Stage functions must be pure: the
//! engines assume re-running a pipeline over the same batch yields the same values.

use std::fmt;
use std::iter::FusedIterator;
use std::sync::Arc;

use crate::error::{PipelineError, PipelineResult};

pub type RecordPredicate<R> = Arc<dyn Fn(&R) -> bool + Send + Sync>;
pub type ValuePredicate = Arc<dyn Fn(f64) -> bool + Send + Sync>;
pub type Extractor<R> = Arc<dyn Fn(&R) -> f64 + Send + Sync>;
pub type ValueMap = Arc<dyn Fn(f64) -> f64 + Send + Sync>;

/// A filter stage. Returning `false` drops the record.
pub enum Filter<R> {
    /// Predicate over the input record (runs before the extract transform).
    Record(RecordPredicate<R>),
    /// Predicate over the current value (runs after the extract transform).
    Value(ValuePredicate),
}

/// A transform stage. Replaces the current value.
pub enum Transform<R> {
    /// Turns a record into its numeric value.
    Extract(Extractor<R>),
    /// Maps the current value to a new one.
    Value(ValueMap),
}

/// One step of a [`Pipeline`].
pub enum Stage<R> {
    Filter(Filter<R>),
    Transform(Transform<R>),
}

impl<R> Stage<R> {
    pub fn filter<F>(predicate: F) -> Self
    where
        F: Fn(&R) -> bool + Send + Sync + 'static,
    {
        Self::Filter(Filter::Record(Arc::new(predicate)))
    }

    pub fn extract<F>(extractor: F) -> Self
    where
        F: Fn(&R) -> f64 + Send + Sync + 'static,
    {
        Self::Transform(Transform::Extract(Arc::new(extractor)))
    }

    pub fn filter_value<F>(predicate: F) -> Self
    where
        F: Fn(f64) -> bool + Send + Sync + 'static,
    {
        Self::Filter(Filter::Value(Arc::new(predicate)))
    }

    pub fn map_value<F>(map: F) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        Self::Transform(Transform::Value(Arc::new(map)))
    }

    /// Short human-readable stage kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Filter(Filter::Record(_)) => "filter(record)",
            Self::Filter(Filter::Value(_)) => "filter(value)",
            Self::Transform(Transform::Extract(_)) => "transform(extract)",
            Self::Transform(Transform::Value(_)) => "transform(value)",
        }
    }
}

impl<R> Clone for Stage<R> {
    fn clone(&self) -> Self {
        match self {
            Self::Filter(Filter::Record(f)) => Self::Filter(Filter::Record(Arc::clone(f))),
            Self::Filter(Filter::Value(f)) => Self::Filter(Filter::Value(Arc::clone(f))),
            Self::Transform(Transform::Extract(f)) => {
                Self::Transform(Transform::Extract(Arc::clone(f)))
            }
            Self::Transform(Transform::Value(f)) => {
                Self::Transform(Transform::Value(Arc::clone(f)))
            }
        }
    }
}

impl<R> fmt::Debug for Stage<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}

#[derive(Clone)]
enum ValueStage {
    Filter(ValuePredicate),
    Map(ValueMap),
}

/// A validated, immutable stage list. Cloning is cheap (shared stage functions).
pub struct Pipeline<R> {
    record_filters: Arc<[RecordPredicate<R>]>,
    extract: Extractor<R>,
    value_stages: Arc<[ValueStage]>,
}

impl<R> Pipeline<R> {
    /// Validate `stages` and build a pipeline.
    ///
    /// Fails with [`PipelineError::InvalidStage`] unless there is exactly one
    /// [`Transform::Extract`], preceded only by record filters and followed only by value stages.
    pub fn new(stages: Vec<Stage<R>>) -> PipelineResult<Self> {
        let mut record_filters = Vec::new();
        let mut extract: Option<(usize, Extractor<R>)> = None;
        let mut value_stages = Vec::new();

        for (position, stage) in stages.into_iter().enumerate() {
            let extract_at = extract.as_ref().map(|(at, _)| *at);
            match (stage, extract_at) {
                (Stage::Filter(Filter::Record(p)), None) => record_filters.push(p),
                (Stage::Filter(Filter::Record(_)), Some(at)) => {
                    return Err(invalid_stage(
                        position,
                        format!("record filter after the extract transform at position {at}"),
                    ));
                }
                (Stage::Transform(Transform::Extract(f)), None) => extract = Some((position, f)),
                (Stage::Transform(Transform::Extract(_)), Some(at)) => {
                    return Err(invalid_stage(
                        position,
                        format!("duplicate extract transform (first at position {at})"),
                    ));
                }
                (Stage::Filter(Filter::Value(p)), Some(_)) => {
                    value_stages.push(ValueStage::Filter(p))
                }
                (Stage::Transform(Transform::Value(f)), Some(_)) => {
                    value_stages.push(ValueStage::Map(f))
                }
                (
                    stage @ (Stage::Filter(Filter::Value(_))
                    | Stage::Transform(Transform::Value(_))),
                    None,
                ) => {
                    return Err(invalid_stage(
                        position,
                        format!("{} before the extract transform", stage.kind()),
                    ));
                }
            }
        }

        let position = record_filters.len() + value_stages.len();
        match extract {
            Some((_, extract)) => Ok(Self {
                record_filters: record_filters.into(),
                extract,
                value_stages: value_stages.into(),
            }),
            None => Err(invalid_stage(position, "pipeline has no extract transform")),
        }
    }

    /// Start a fluent builder.
    pub fn builder() -> PipelineBuilder<R> {
        PipelineBuilder::new()
    }

    /// Number of stages, including the extract transform.
    pub fn stage_count(&self) -> usize {
        self.record_filters.len() + 1 + self.value_stages.len()
    }

    /// Run one record through every stage. `None` means a filter dropped it.
    pub fn evaluate(&self, record: &R) -> Option<f64> {
        if !self.record_filters.iter().all(|p| p(record)) {
            return None;
        }
        let mut value = (self.extract)(record);
        for stage in self.value_stages.iter() {
            match stage {
                ValueStage::Filter(p) => {
                    if !p(value) {
                        return None;
                    }
                }
                ValueStage::Map(f) => value = f(value),
            }
        }
        Some(value)
    }

    /// Lazily apply the pipeline to `records`.
    ///
    /// Nothing is evaluated until the returned iterator is pulled. Each call starts a fresh pass.
    pub fn apply<'a>(&'a self, records: &'a [R]) -> StageIter<'a, R> {
        StageIter {
            records: records.iter(),
            pipeline: self,
        }
    }
}

impl<R> Clone for Pipeline<R> {
    fn clone(&self) -> Self {
        Self {
            record_filters: Arc::clone(&self.record_filters),
            extract: Arc::clone(&self.extract),
            value_stages: Arc::clone(&self.value_stages),
        }
    }
}

impl<R> fmt::Debug for Pipeline<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("record_filters", &self.record_filters.len())
            .field("value_stages", &self.value_stages.len())
            .finish()
    }
}

fn invalid_stage(position: usize, message: impl Into<String>) -> PipelineError {
    PipelineError::InvalidStage {
        position,
        message: message.into(),
    }
}

/// Pull-based, single-pass iterator produced by [`Pipeline::apply`].
pub struct StageIter<'a, R> {
    records: std::slice::Iter<'a, R>,
    pipeline: &'a Pipeline<R>,
}

impl<R> Iterator for StageIter<'_, R> {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        for record in self.records.by_ref() {
            if let Some(v) = self.pipeline.evaluate(record) {
                return Some(v);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.records.len()))
    }
}

impl<R> FusedIterator for StageIter<'_, R> {}

/// Fluent construction of a [`Pipeline`].
///
/// ```rust
/// use batch_aggregation::processing::Pipeline;
///
/// let pipeline = Pipeline::<(bool, f64)>::builder()
///     .filter(|r| r.0)
///     .extract(|r| r.1)
///     .map_value(|v| v * 2.0)
///     .filter_value(|v| v > 5.0)
///     .build()
///     .unwrap();
///
/// let records = [(true, 1.0), (false, 9.0), (true, 4.0)];
/// let values: Vec<f64> = pipeline.apply(&records).collect();
/// assert_eq!(values, vec![8.0]);
/// ```
pub struct PipelineBuilder<R> {
    stages: Vec<Stage<R>>,
}

impl<R> PipelineBuilder<R> {
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Append an already-constructed stage.
    pub fn stage(mut self, stage: Stage<R>) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn filter<F>(self, predicate: F) -> Self
    where
        F: Fn(&R) -> bool + Send + Sync + 'static,
    {
        self.stage(Stage::filter(predicate))
    }

    pub fn extract<F>(self, extractor: F) -> Self
    where
        F: Fn(&R) -> f64 + Send + Sync + 'static,
    {
        self.stage(Stage::extract(extractor))
    }

    pub fn filter_value<F>(self, predicate: F) -> Self
    where
        F: Fn(f64) -> bool + Send + Sync + 'static,
    {
        self.stage(Stage::filter_value(predicate))
    }

    pub fn map_value<F>(self, map: F) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        self.stage(Stage::map_value(map))
    }

    pub fn build(self) -> PipelineResult<Pipeline<R>> {
        Pipeline::new(self.stages)
    }
}

impl<R> Default for PipelineBuilder<R> {
    fn default() -> Self {
        Self::new()
    }
}
