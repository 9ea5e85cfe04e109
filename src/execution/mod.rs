//! Parallel execution of the aggregation core.
//!
//! This module sits "above" [`crate::processing`] and provides:
//!
//! - Chunked, order-preserving parallel materialization of a [`Pipeline`]
//! - Fan-out/fan-in reductions: each chunk is reduced on a worker, partial results are combined
//!   in chunk order with the reduction's associative `combine`
//! - A two-pass parallel prefix sum and a parallel descending sort
//! - Resource limits / throttling (in-flight chunks)
//! - Real-time metrics + observer hooks for monitoring
//! - [`ExecutionEngine::execute`] for composing several operations into one observed run
//!
//! Partial results are always combined in chunk order, so for a fixed `chunk_size` every run
//! over the same input yields bit-for-bit identical output regardless of thread scheduling.

mod observer;
mod semaphore;

use std::ops::Range;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use rayon::ThreadPool;
use rayon::ThreadPoolBuilder;
use serde::{Deserialize, Serialize};

use crate::config::{BandBoundaries, ReportConfig};
use crate::error::{PipelineError, PipelineResult};
use crate::processing::order::{descending, median};
use crate::processing::reduce::{band_counts, count_above, quantifiers, ReduceOp, Summary};
use crate::processing::scan::{chunk_offsets, inclusive_running_sum, offset_in_place};
use crate::processing::{Materialized, Pipeline};
use crate::types::{BandCounts, Quantifiers, Report};

pub use observer::{
    ExecutionEvent, ExecutionMetrics, ExecutionMetricsSnapshot, ExecutionObserver,
    LogExecutionObserver, Phase, StdErrExecutionObserver,
};

use semaphore::Semaphore;

/// Configuration for the [`ExecutionEngine`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionOptions {
    /// Number of worker threads used by the engine.
    ///
    /// If `None`, uses the platform's available parallelism.
    pub num_threads: Option<usize>,
    /// Number of values (or records) per chunk.
    ///
    /// Chunk boundaries also fix the grouping of floating-point partial sums.
    pub chunk_size: usize,
    /// Upper bound on concurrently executing chunks.
    ///
    /// This is an additional throttle on top of `num_threads`.
    pub max_in_flight_chunks: usize,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        let n = available_parallelism();
        Self {
            num_threads: Some(n),
            chunk_size: 4_096,
            max_in_flight_chunks: n,
        }
    }
}

impl ExecutionOptions {
    pub fn validate(&self) -> PipelineResult<()> {
        if self.chunk_size == 0 {
            return Err(invalid_options("chunk_size must be > 0"));
        }
        if self.max_in_flight_chunks == 0 {
            return Err(invalid_options("max_in_flight_chunks must be > 0"));
        }
        if self.num_threads == Some(0) {
            return Err(invalid_options("num_threads must be > 0 when set"));
        }
        Ok(())
    }
}

fn invalid_options(message: &str) -> PipelineError {
    PipelineError::InvalidExecutionOptions {
        message: message.to_string(),
    }
}

fn available_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Per-chunk partial result of every scalar reduction in a [`Report`].
#[derive(Debug, Clone, Copy)]
struct Reductions {
    summary: Summary,
    high_value: usize,
    bands: BandCounts,
    quantifiers: Quantifiers,
}

impl Reductions {
    const EMPTY: Self = Self {
        summary: Summary::EMPTY,
        high_value: 0,
        bands: BandCounts {
            small: 0,
            medium: 0,
            large: 0,
        },
        quantifiers: Quantifiers {
            all_positive: true,
            any_very_large: false,
            none_negative: true,
        },
    };

    fn of(values: &[f64], cfg: &ReportConfig) -> Self {
        Self {
            summary: Summary::of(values),
            high_value: count_above(values, cfg.high_threshold),
            bands: band_counts(values, &cfg.bands),
            quantifiers: quantifiers(values, cfg),
        }
    }

    fn combine(self, other: Self) -> Self {
        Self {
            summary: self.summary.combine(other.summary),
            high_value: self.high_value + other.high_value,
            bands: self.bands.combine(other.bands),
            quantifiers: self.quantifiers.combine(other.quantifiers),
        }
    }
}

/// A configurable parallel engine for batch aggregation.
pub struct ExecutionEngine {
    pool: ThreadPool,
    opts: ExecutionOptions,
    observer: Option<Arc<dyn ExecutionObserver>>,
    metrics: Arc<ExecutionMetrics>,
}

impl ExecutionEngine {
    /// Create a new engine with the given options.
    ///
    /// Fails with [`PipelineError::InvalidExecutionOptions`] if `chunk_size == 0`,
    /// `max_in_flight_chunks == 0`, or `num_threads == Some(0)`.
    pub fn new(opts: ExecutionOptions) -> PipelineResult<Self> {
        opts.validate()?;

        let n_threads = opts.num_threads.unwrap_or_else(available_parallelism).max(1);
        let pool = ThreadPoolBuilder::new().num_threads(n_threads).build()?;

        Ok(Self {
            pool,
            opts,
            observer: None,
            metrics: Arc::new(ExecutionMetrics::new()),
        })
    }

    /// Attach an observer for execution events (metrics/logging).
    pub fn with_observer(mut self, observer: Arc<dyn ExecutionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Get a handle to real-time execution metrics.
    pub fn metrics(&self) -> Arc<ExecutionMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn options(&self) -> &ExecutionOptions {
        &self.opts
    }

    /// Execute `f` as a single run on the engine's pool.
    ///
    /// Everything `f` does through the [`Run`] handle shares one metrics run, one
    /// `RunStarted`/`RunFinished` pair and one in-flight chunk budget. Use `rayon::join` inside
    /// `f` to overlap independent steps.
    ///
    /// ```rust
    /// use batch_aggregation::execution::{ExecutionEngine, ExecutionOptions};
    ///
    /// # fn main() -> Result<(), batch_aggregation::PipelineError> {
    /// let engine = ExecutionEngine::new(ExecutionOptions::default())?;
    /// let values = [3.0, 1.0, 2.0];
    /// let (total, sorted) = engine.execute(|run| {
    ///     rayon::join(|| run.summary(&values).total, || run.sorted_desc(&values))
    /// });
    /// assert_eq!(total, 6.0);
    /// assert_eq!(sorted, vec![3.0, 2.0, 1.0]);
    /// assert_eq!(engine.metrics().snapshot().run_id, 1);
    /// # Ok(())
    /// # }
    /// ```
    pub fn execute<T, F>(&self, f: F) -> T
    where
        T: Send,
        F: FnOnce(&Run<'_>) -> T + Send,
    {
        let start = Instant::now();
        self.metrics.begin_run();
        self.emit(ExecutionEvent::RunStarted);

        let run = Run {
            engine: self,
            sem: Semaphore::new(self.opts.max_in_flight_chunks),
        };
        let out = self.pool.install(|| f(&run));

        self.metrics.end_run(start.elapsed());
        self.emit(ExecutionEvent::RunFinished {
            elapsed: start.elapsed(),
            metrics: self.metrics.snapshot(),
        });
        out
    }

    /// Run `pipeline` over `records` in parallel chunks and collect the surviving values.
    ///
    /// Chunk outputs are concatenated in chunk order, so the result equals a sequential
    /// [`crate::processing::materialize`] of the same pipeline.
    pub fn materialize<R: Sync>(&self, pipeline: &Pipeline<R>, records: &[R]) -> Materialized {
        self.execute(|run| run.materialize(pipeline, records))
    }

    /// Materialize `records` and aggregate the result into a [`Report`].
    pub fn run_pipeline<R: Sync>(
        &self,
        pipeline: &Pipeline<R>,
        records: &[R],
        cfg: &ReportConfig,
    ) -> Report {
        self.execute(|run| {
            let values = run.materialize(pipeline, records);
            run.aggregate(&values, cfg)
        })
    }

    /// Compute every report statistic over `values`.
    ///
    /// Reductions, the running sum, the descending sort and the median run concurrently. Each
    /// works on the shared read-only sequence or its own private copy.
    pub fn aggregate(&self, values: &Materialized, cfg: &ReportConfig) -> Report {
        self.execute(|run| run.aggregate(values, cfg))
    }

    /// Count, total, min and max of `values`.
    pub fn summary(&self, values: &[f64]) -> Summary {
        self.execute(|run| run.summary(values))
    }

    /// Reduce `values` with a built-in [`ReduceOp`].
    pub fn reduce(&self, values: &[f64], op: ReduceOp) -> f64 {
        self.summary(values).get(op)
    }

    /// Parallel [`crate::processing::all_of`].
    pub fn all_of<T, P>(&self, items: &[T], pred: P) -> bool
    where
        T: Sync,
        P: Fn(&T) -> bool + Send + Sync,
    {
        self.execute(|run| run.all_of(items, pred))
    }

    /// Parallel [`crate::processing::any_of`].
    pub fn any_of<T, P>(&self, items: &[T], pred: P) -> bool
    where
        T: Sync,
        P: Fn(&T) -> bool + Send + Sync,
    {
        self.execute(|run| run.any_of(items, pred))
    }

    /// Parallel [`crate::processing::none_of`].
    pub fn none_of<T, P>(&self, items: &[T], pred: P) -> bool
    where
        T: Sync,
        P: Fn(&T) -> bool + Send + Sync,
    {
        !self.any_of(items, pred)
    }

    /// Parallel categorical band counts.
    pub fn band_counts(&self, values: &[f64], bands: &BandBoundaries) -> BandCounts {
        self.execute(|run| run.band_counts(values, bands))
    }

    /// Parallel two-pass inclusive prefix sum.
    pub fn running_sum(&self, values: &[f64]) -> Vec<f64> {
        self.execute(|run| run.running_sum(values))
    }

    /// Descending sort of a private copy of `values`.
    pub fn sorted_desc(&self, values: &[f64]) -> Vec<f64> {
        self.execute(|run| run.sorted_desc(values))
    }

    /// Median by selection; see [`crate::processing::median`] for the exact definition.
    pub fn median(&self, values: &[f64]) -> Option<f64> {
        self.execute(|run| run.median(values))
    }

    fn phase<T>(&self, phase: Phase, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        self.emit(ExecutionEvent::PhaseStarted { phase });
        let out = f();
        self.emit(ExecutionEvent::PhaseFinished {
            phase,
            elapsed: start.elapsed(),
        });
        out
    }

    fn emit(&self, event: ExecutionEvent) {
        if let Some(obs) = &self.observer {
            obs.on_event(&event);
        }
    }
}

/// Handle to one in-progress [`ExecutionEngine::execute`] run.
///
/// Operations mirror the engine's own methods but do not start a new run. The handle is `Sync`,
/// so independent operations can be overlapped with `rayon::join`.
pub struct Run<'a> {
    engine: &'a ExecutionEngine,
    sem: Semaphore,
}

impl Run<'_> {
    pub fn materialize<R: Sync>(&self, pipeline: &Pipeline<R>, records: &[R]) -> Materialized {
        self.engine.phase(Phase::Materialize, || {
            let per_chunk: Vec<Vec<f64>> =
                self.map_chunks(Phase::Materialize, records.len(), |range| {
                    pipeline.apply(&records[range]).collect()
                });
            per_chunk.into_iter().flatten().collect()
        })
    }

    pub fn aggregate(&self, values: &Materialized, cfg: &ReportConfig) -> Report {
        let ((reductions, running_sum), (sorted_desc, median)) = rayon::join(
            || rayon::join(|| self.reductions(values, cfg), || self.running_sum(values)),
            || rayon::join(|| self.sorted_desc(values), || self.median(values)),
        );

        let summary = reductions.summary;
        Report {
            count: summary.count,
            total: summary.total,
            average: summary.average(),
            max: summary.max,
            min: summary.min,
            median,
            high_value: reductions.high_value,
            bands: reductions.bands,
            quantifiers: reductions.quantifiers,
            running_sum,
            sorted_desc,
        }
    }

    pub fn summary(&self, values: &[f64]) -> Summary {
        self.engine.phase(Phase::Reduce, || {
            self.map_chunks(Phase::Reduce, values.len(), |range| {
                Summary::of(&values[range])
            })
            .into_iter()
            .fold(Summary::EMPTY, Summary::combine)
        })
    }

    pub fn all_of<T, P>(&self, items: &[T], pred: P) -> bool
    where
        T: Sync,
        P: Fn(&T) -> bool + Send + Sync,
    {
        self.engine.phase(Phase::Reduce, || {
            self.map_chunks(Phase::Reduce, items.len(), |range| {
                items[range].iter().all(&pred)
            })
            .into_iter()
            .all(|ok| ok)
        })
    }

    pub fn any_of<T, P>(&self, items: &[T], pred: P) -> bool
    where
        T: Sync,
        P: Fn(&T) -> bool + Send + Sync,
    {
        self.engine.phase(Phase::Reduce, || {
            self.map_chunks(Phase::Reduce, items.len(), |range| {
                items[range].iter().any(&pred)
            })
            .into_iter()
            .any(|hit| hit)
        })
    }

    pub fn band_counts(&self, values: &[f64], bands: &BandBoundaries) -> BandCounts {
        self.engine.phase(Phase::Reduce, || {
            self.map_chunks(Phase::Reduce, values.len(), |range| {
                band_counts(&values[range], bands)
            })
            .into_iter()
            .fold(BandCounts::default(), BandCounts::combine)
        })
    }

    pub fn running_sum(&self, values: &[f64]) -> Vec<f64> {
        self.engine.phase(Phase::Scan, || {
            let mut locals: Vec<Vec<f64>> = self.map_chunks(Phase::Scan, values.len(), |range| {
                inclusive_running_sum(&values[range])
            });
            let totals: Vec<f64> = locals
                .iter()
                .map(|local| local.last().copied().unwrap_or(0.0))
                .collect();
            let offsets = chunk_offsets(&totals);
            locals
                .par_iter_mut()
                .zip(offsets.par_iter())
                .for_each(|(local, &offset)| offset_in_place(local, offset));
            locals.into_iter().flatten().collect()
        })
    }

    pub fn sorted_desc(&self, values: &[f64]) -> Vec<f64> {
        self.engine.phase(Phase::Sort, || {
            let mut out = values.to_vec();
            out.par_sort_unstable_by(descending);
            out
        })
    }

    pub fn median(&self, values: &[f64]) -> Option<f64> {
        self.engine.phase(Phase::Median, || median(values))
    }

    fn reductions(&self, values: &[f64], cfg: &ReportConfig) -> Reductions {
        self.engine.phase(Phase::Reduce, || {
            self.map_chunks(Phase::Reduce, values.len(), |range| {
                Reductions::of(&values[range], cfg)
            })
            .into_iter()
            .fold(Reductions::EMPTY, Reductions::combine)
        })
    }

    /// Apply `f` to every chunk range of `0..len` on the pool, returning results in chunk order.
    fn map_chunks<T, F>(&self, phase: Phase, len: usize, f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(Range<usize>) -> T + Send + Sync,
    {
        let engine = self.engine;
        chunk_ranges(len, engine.opts.chunk_size)
            .into_par_iter()
            .map(|range| {
                let permit = self.sem.acquire();
                let waited = permit.waited();
                if waited > Duration::ZERO {
                    engine.metrics.on_throttle_wait(waited);
                    engine.emit(ExecutionEvent::ThrottleWaited { duration: waited });
                }

                let start_row = range.start;
                let row_count = range.end - range.start;
                engine.metrics.on_chunk_start();
                engine.emit(ExecutionEvent::ChunkStarted {
                    phase,
                    start_row,
                    row_count,
                });

                let out = f(range);
                engine.metrics.on_rows_processed(row_count);

                engine.emit(ExecutionEvent::ChunkFinished { phase, start_row });
                engine.metrics.on_chunk_end();
                drop(permit);
                out
            })
            .collect()
    }
}

fn chunk_ranges(row_count: usize, chunk_size: usize) -> Vec<Range<usize>> {
    if row_count == 0 {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(row_count.div_ceil(chunk_size));
    let mut start = 0usize;
    while start < row_count {
        let end = (start + chunk_size).min(row_count);
        out.push(start..end);
        start = end;
    }
    out
}
