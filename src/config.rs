//! Configuration for pipelines and report assembly.
//!
//! All thresholds are fixed when a pipeline is built. Every config type implements [`Default`]
//! with the reference values and can be loaded from JSON; missing fields fall back to the
//! defaults. Validation happens before any record is processed, so a bad threshold is reported
//! as a construction error rather than surfacing halfway through a batch.
//!
//! ```rust
//! use batch_aggregation::config::TransactionConfig;
//!
//! let cfg = TransactionConfig::from_json(r#"{ "fee_rate": 0.95 }"#).unwrap();
//! assert_eq!(cfg.fee_rate, 0.95);
//! assert_eq!(cfg.min_value, 10.0);
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};

/// Value thresholds splitting values into small / medium / large bands.
///
/// `v < small_below` is small, `v < large_from` is medium, everything else is large.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BandBoundaries {
    pub small_below: f64,
    pub large_from: f64,
}

impl Default for BandBoundaries {
    fn default() -> Self {
        Self {
            small_below: 100.0,
            large_from: 1_000.0,
        }
    }
}

impl BandBoundaries {
    pub fn validate(&self) -> PipelineResult<()> {
        finite("bands.small_below", self.small_below)?;
        finite("bands.large_from", self.large_from)?;
        if self.small_below > self.large_from {
            return Err(PipelineError::invalid_config(
                "bands",
                format!(
                    "small_below ({}) must not exceed large_from ({})",
                    self.small_below, self.large_from
                ),
            ));
        }
        Ok(())
    }
}

/// Options controlling report assembly over a materialized sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Categorical band thresholds.
    pub bands: BandBoundaries,
    /// Values strictly above this count towards `Report::high_value`.
    pub high_threshold: f64,
    /// Values strictly above this set `Quantifiers::any_very_large`.
    pub huge_threshold: f64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            bands: BandBoundaries::default(),
            high_threshold: 1_000.0,
            huge_threshold: 2_000.0,
        }
    }
}

impl ReportConfig {
    pub fn validate(&self) -> PipelineResult<()> {
        self.bands.validate()?;
        finite("high_threshold", self.high_threshold)?;
        finite("huge_threshold", self.huge_threshold)?;
        Ok(())
    }

    /// Parse and validate a JSON document.
    pub fn from_json(input: &str) -> PipelineResult<Self> {
        parse_validated(input, Self::validate)
    }
}

/// Parameters of the transaction metrics pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionConfig {
    /// Multiplier applied to every approved amount (0.98 = 2% fee).
    pub fee_rate: f64,
    /// Net amounts below this value are dropped.
    pub min_value: f64,
    pub report: ReportConfig,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            fee_rate: 0.98,
            min_value: 10.0,
            report: ReportConfig::default(),
        }
    }
}

impl TransactionConfig {
    pub fn validate(&self) -> PipelineResult<()> {
        finite("fee_rate", self.fee_rate)?;
        if self.fee_rate <= 0.0 {
            return Err(PipelineError::invalid_config(
                "fee_rate",
                format!("must be > 0 (got {})", self.fee_rate),
            ));
        }
        finite("min_value", self.min_value)?;
        self.report.validate()
    }

    /// Parse and validate a JSON document.
    pub fn from_json(input: &str) -> PipelineResult<Self> {
        parse_validated(input, Self::validate)
    }
}

/// Parameters of the fleet efficiency report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetConfig {
    /// Trucks scoring below this are excluded from the efficiency pipeline.
    pub min_safety_score: u8,
    /// MPG readings at or below this are treated as sensor noise.
    pub min_mpg: f64,
    /// Every truck must score strictly above this for the fleet to pass integrity.
    pub integrity_floor: u8,
    /// A single trip above this mileage flags high utilization.
    pub high_utilization_miles: f64,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            min_safety_score: 70,
            min_mpg: 2.0,
            integrity_floor: 50,
            high_utilization_miles: 800.0,
        }
    }
}

impl FleetConfig {
    pub const MAX_SAFETY_SCORE: u8 = 100;

    pub fn validate(&self) -> PipelineResult<()> {
        score("min_safety_score", self.min_safety_score)?;
        score("integrity_floor", self.integrity_floor)?;
        finite("min_mpg", self.min_mpg)?;
        finite("high_utilization_miles", self.high_utilization_miles)?;
        Ok(())
    }

    /// Parse and validate a JSON document.
    pub fn from_json(input: &str) -> PipelineResult<Self> {
        parse_validated(input, Self::validate)
    }
}

fn parse_validated<T, V>(input: &str, validate: V) -> PipelineResult<T>
where
    T: DeserializeOwned,
    V: FnOnce(&T) -> PipelineResult<()>,
{
    let cfg: T = serde_json::from_str(input)?;
    validate(&cfg)?;
    Ok(cfg)
}

fn finite(field: &str, v: f64) -> PipelineResult<()> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(PipelineError::invalid_config(
            field,
            format!("must be finite (got {v})"),
        ))
    }
}

fn score(field: &str, v: u8) -> PipelineResult<()> {
    if v <= FleetConfig::MAX_SAFETY_SCORE {
        Ok(())
    } else {
        Err(PipelineError::invalid_config(
            field,
            format!("must be within 0..={} (got {v})", FleetConfig::MAX_SAFETY_SCORE),
        ))
    }
}
