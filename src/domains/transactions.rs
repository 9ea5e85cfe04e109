//! Transaction revenue metrics.
//!
//! Approved transactions are charged the configured fee; net amounts below the minimum value are
//! ignored. The remaining amounts feed a full [`Report`].

use serde::{Deserialize, Serialize};

use crate::config::TransactionConfig;
use crate::error::PipelineResult;
use crate::execution::ExecutionEngine;
use crate::processing::{aggregate, materialize, Pipeline};
use crate::types::Report;

/// One payment transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub user: String,
    pub amount: f64,
    pub approved: bool,
}

impl Transaction {
    pub fn new(user: impl Into<String>, amount: f64, approved: bool) -> Self {
        Self {
            user: user.into(),
            amount,
            approved,
        }
    }
}

/// approved → `amount * fee_rate` → `>= min_value`.
pub fn transaction_pipeline(cfg: &TransactionConfig) -> PipelineResult<Pipeline<Transaction>> {
    cfg.validate()?;
    let fee_rate = cfg.fee_rate;
    let min_value = cfg.min_value;
    Pipeline::<Transaction>::builder()
        .filter(|t| t.approved)
        .extract(|t| t.amount)
        .map_value(move |amount| amount * fee_rate)
        .filter_value(move |net| net >= min_value)
        .build()
}

/// Compute revenue metrics on the calling thread.
pub fn compute_metrics(
    transactions: &[Transaction],
    cfg: &TransactionConfig,
) -> PipelineResult<Report> {
    let pipeline = transaction_pipeline(cfg)?;
    let values = materialize(pipeline.apply(transactions));
    log::debug!(
        "transactions: {} of {} kept after fee and minimum-value filter",
        values.len(),
        transactions.len()
    );
    Ok(aggregate(&values, &cfg.report))
}

/// Compute revenue metrics on `engine`'s worker pool.
pub fn compute_metrics_parallel(
    engine: &ExecutionEngine,
    transactions: &[Transaction],
    cfg: &TransactionConfig,
) -> PipelineResult<Report> {
    let pipeline = transaction_pipeline(cfg)?;
    let report = engine.run_pipeline(&pipeline, transactions, &cfg.report);
    log::debug!(
        "transactions: {} of {} kept after fee and minimum-value filter",
        report.count,
        transactions.len()
    );
    Ok(report)
}
