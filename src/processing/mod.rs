//! Sequential batch aggregation core.
//!
//! The processing layer turns a batch of records into a [`crate::types::Report`]:
//!
//! - [`stage`]: lazy filter/transform [`Pipeline`]s
//! - [`materialize()`]: one-pass collection into a shared [`Materialized`] sequence
//! - [`reduce`]: count/total/average/min/max, quantifiers and band counts
//! - [`scan`]: inclusive running sums
//! - [`order`]: descending sort and median selection
//! - [`aggregate()`]: all of the above assembled into a report on the calling thread
//!
//! [`crate::execution::ExecutionEngine`] runs the same operations in parallel.
//!
//! ## Example: pipeline → materialize → aggregate
//!
//! ```rust
//! use batch_aggregation::config::ReportConfig;
//! use batch_aggregation::processing::{aggregate, materialize, Pipeline};
//!
//! struct Tx {
//!     amount: f64,
//!     approved: bool,
//! }
//!
//! let batch = vec![
//!     Tx { amount: 100.0, approved: true },
//!     Tx { amount: 500.0, approved: false },
//!     Tx { amount: 10.0, approved: true },
//! ];
//!
//! let pipeline = Pipeline::<Tx>::builder()
//!     .filter(|t| t.approved)
//!     .extract(|t| t.amount * 0.98)
//!     .filter_value(|v| v >= 10.0)
//!     .build()
//!     .unwrap();
//!
//! let values = materialize(pipeline.apply(&batch));
//! let report = aggregate(&values, &ReportConfig::default());
//! assert_eq!(report.count, 1);
//! assert_eq!(report.total, 98.0);
//! ```

pub mod materialize;
pub mod order;
pub mod reduce;
pub mod report;
pub mod scan;
pub mod stage;

pub use materialize::{materialize, Materialized};
pub use order::{descending_sorted_copy, median};
pub use reduce::{all_of, any_of, none_of, reduce, Band, ReduceOp, Summary};
pub use report::aggregate;
pub use scan::inclusive_running_sum;
pub use stage::{Filter, Pipeline, PipelineBuilder, Stage, StageIter, Transform};
