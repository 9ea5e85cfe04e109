//! `batch-aggregation` turns an in-memory batch of records into a single statistics
//! [`types::Report`].
//!
//! A batch flows through four steps:
//!
//! 1. a lazy [`processing::Pipeline`] of filter and transform stages maps each record to at most
//!    one `f64`
//! 2. the pipeline is drained once into a shared, read-only [`processing::Materialized`]
//!    sequence
//! 3. independent engines run over that sequence: reductions (count/total/average/min/max,
//!    quantifiers, band counts), an inclusive running sum, and order statistics (descending
//!    sort, median)
//! 4. their results are assembled into a [`types::Report`]
//!
//! [`processing`] runs everything on the calling thread. [`execution::ExecutionEngine`] runs the
//! same operations on a rayon pool: chunked, throttled, observable, and deterministic for a fixed
//! chunk size.
//!
//! ## Quick example: transaction metrics
//!
//! ```rust
//! use batch_aggregation::config::TransactionConfig;
//! use batch_aggregation::domains::{compute_metrics, Transaction};
//!
//! # fn main() -> Result<(), batch_aggregation::PipelineError> {
//! let batch = vec![
//!     Transaction::new("Alice", 100.0, true),
//!     Transaction::new("Bob", 500.0, false),
//!     Transaction::new("Carol", 10.0, true),
//! ];
//! // 2% fee, then drop anything under 10.0.
//! let report = compute_metrics(&batch, &TransactionConfig::default())?;
//! assert_eq!(report.count, 1);
//! assert_eq!(report.total, 98.0);
//! assert_eq!(report.median, Some(98.0));
//! # Ok(())
//! # }
//! ```
//!
//! ## Parallel execution
//!
//! ```rust
//! use batch_aggregation::config::ReportConfig;
//! use batch_aggregation::execution::{ExecutionEngine, ExecutionOptions};
//! use batch_aggregation::processing::Materialized;
//!
//! # fn main() -> Result<(), batch_aggregation::PipelineError> {
//! let engine = ExecutionEngine::new(ExecutionOptions {
//!     num_threads: Some(2),
//!     chunk_size: 2,
//!     max_in_flight_chunks: 2,
//! })?;
//! let values = Materialized::from(vec![5.0, 1.0, 4.0, 2.0, 3.0]);
//! let report = engine.aggregate(&values, &ReportConfig::default());
//! assert_eq!(report.sorted_desc, vec![5.0, 4.0, 3.0, 2.0, 1.0]);
//! assert_eq!(report.running_sum, vec![5.0, 6.0, 10.0, 12.0, 15.0]);
//! assert_eq!(report.median, Some(3.0));
//! # Ok(())
//! # }
//! ```
//!
//! ### Empty batches
//!
//! An empty batch is not an error. The report has `count == 0`, `total == average == 0.0`,
//! `min == f64::INFINITY`, `max == f64::NEG_INFINITY`, `median == None`, vacuous quantifier
//! defaults and empty sequences.
//!
//! ### Median
//!
//! The median is the element at index `count / 2` of the ascending order. For even counts this is
//! the upper of the two middle values, not their mean.
//!
//! ## Modules
//!
//! - [`processing`]: stage pipelines, materialization, and the sequential engines
//! - [`execution`]: the parallel engine, observers and metrics
//! - [`domains`]: transaction and fleet analytics built on the core
//! - [`config`]: validated configuration values
//! - [`types`]: the report data model
//! - [`error`]: the construction error type

pub mod config;
pub mod domains;
pub mod error;
pub mod execution;
pub mod processing;
pub mod types;

pub use error::{PipelineError, PipelineResult};
