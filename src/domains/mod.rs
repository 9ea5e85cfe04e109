//! Concrete analytics built on the aggregation core.
//!
//! - [`transactions`]: revenue metrics over payment transactions ([`compute_metrics`])
//! - [`fleet`]: efficiency and mileage report over truck telemetry ([`generate_fleet_report`])
//!
//! Each front-end has a sequential entry point and an `_parallel` variant running on an
//! [`crate::execution::ExecutionEngine`]. Both validate their configuration before touching a
//! record.

pub mod fleet;
pub mod transactions;

pub use fleet::{generate_fleet_report, generate_fleet_report_parallel, FleetReport, Telemetry};
pub use transactions::{compute_metrics, compute_metrics_parallel, Transaction};
