//! Fleet operations report over truck telemetry.
//!
//! Two sequences are materialized from the same logs: fuel efficiency (MPG) of active trucks,
//! and raw mileage of every truck. Efficiency statistics come from the first, mileage statistics
//! from the second, and integrity/maintenance checks run over the records themselves.

use serde::{Deserialize, Serialize};

use crate::config::FleetConfig;
use crate::error::PipelineResult;
use crate::execution::ExecutionEngine;
use crate::processing::{
    all_of, any_of, descending_sorted_copy, inclusive_running_sum, materialize, Pipeline, Summary,
};

/// One telemetry entry for a truck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    pub truck_id: String,
    pub miles_driven: f64,
    pub fuel_used_gallons: f64,
    pub engine_hours: u32,
    pub maintenance_required: bool,
    /// 0-100.
    pub safety_score: u8,
}

/// Fleet-level statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FleetReport {
    /// Active trucks with a plausible efficiency reading.
    pub fleet_size: usize,
    /// Mean MPG over `fleet_size` trucks (`0.0` when none).
    pub avg_efficiency: f64,
    /// Miles driven by every logged truck, active or not.
    pub total_mileage: f64,
    /// Longest single trip (`0.0` when there are no logs).
    pub max_miles_single_trip: f64,
    /// Trucks flagged for maintenance.
    pub critical_maintenance_count: usize,
    /// Every truck scores above the integrity floor.
    pub operational_integrity: bool,
    /// At least one trip exceeds the high-utilization mileage.
    pub high_utilization_detected: bool,
    /// Efficiency readings, best first.
    pub efficiency_distribution: Vec<f64>,
    /// Running mileage total in log order.
    pub cumulative_mileage: Vec<f64>,
}

impl Default for FleetReport {
    fn default() -> Self {
        Self {
            fleet_size: 0,
            avg_efficiency: 0.0,
            total_mileage: 0.0,
            max_miles_single_trip: 0.0,
            critical_maintenance_count: 0,
            operational_integrity: true,
            high_utilization_detected: false,
            efficiency_distribution: Vec::new(),
            cumulative_mileage: Vec::new(),
        }
    }
}

/// Miles per gallon, or `0.0` when no fuel was recorded.
pub fn miles_per_gallon(t: &Telemetry) -> f64 {
    if t.fuel_used_gallons > 0.0 {
        t.miles_driven / t.fuel_used_gallons
    } else {
        0.0
    }
}

/// Not in maintenance and at or above the safety floor.
pub fn is_active(t: &Telemetry, min_safety_score: u8) -> bool {
    !t.maintenance_required && t.safety_score >= min_safety_score
}

/// active → MPG → `> min_mpg`.
pub fn efficiency_pipeline(cfg: &FleetConfig) -> PipelineResult<Pipeline<Telemetry>> {
    cfg.validate()?;
    let min_safety = cfg.min_safety_score;
    let min_mpg = cfg.min_mpg;
    Pipeline::<Telemetry>::builder()
        .filter(move |t| is_active(t, min_safety))
        .extract(miles_per_gallon)
        .filter_value(move |mpg| mpg > min_mpg)
        .build()
}

/// Raw mileage of every log entry.
pub fn mileage_pipeline() -> PipelineResult<Pipeline<Telemetry>> {
    Pipeline::<Telemetry>::builder()
        .extract(|t| t.miles_driven)
        .build()
}

/// Build the fleet report on the calling thread.
///
/// A fleet with no active truck yields [`FleetReport::default`]: no mileage or integrity
/// statistics are reported for it.
pub fn generate_fleet_report(
    logs: &[Telemetry],
    cfg: &FleetConfig,
) -> PipelineResult<FleetReport> {
    let efficiency = materialize(efficiency_pipeline(cfg)?.apply(logs));
    log::debug!("fleet: {} of {} trucks active", efficiency.len(), logs.len());
    if efficiency.is_empty() {
        return Ok(FleetReport::default());
    }
    let mileage = materialize(mileage_pipeline()?.apply(logs));

    let eff = Summary::of(&efficiency);
    let miles = Summary::of(&mileage);
    let floor = cfg.integrity_floor;
    let high = cfg.high_utilization_miles;

    Ok(FleetReport {
        fleet_size: eff.count,
        avg_efficiency: eff.average(),
        total_mileage: miles.total,
        max_miles_single_trip: miles.max,
        critical_maintenance_count: maintenance_count(logs),
        operational_integrity: all_of(logs, |t| t.safety_score > floor),
        high_utilization_detected: any_of(mileage.as_slice(), |&m| m > high),
        efficiency_distribution: descending_sorted_copy(&efficiency),
        cumulative_mileage: inclusive_running_sum(&mileage),
    })
}

/// Build the fleet report on `engine`'s worker pool as a single run.
///
/// Both sequences are materialized concurrently, then the efficiency, mileage and integrity
/// statistics fan out over the pool.
pub fn generate_fleet_report_parallel(
    engine: &ExecutionEngine,
    logs: &[Telemetry],
    cfg: &FleetConfig,
) -> PipelineResult<FleetReport> {
    let efficiency_stages = efficiency_pipeline(cfg)?;
    let mileage_stages = mileage_pipeline()?;
    let floor = cfg.integrity_floor;
    let high = cfg.high_utilization_miles;

    let report = engine.execute(|run| {
        let (efficiency, mileage) = rayon::join(
            || run.materialize(&efficiency_stages, logs),
            || run.materialize(&mileage_stages, logs),
        );
        log::debug!("fleet: {} of {} trucks active", efficiency.len(), logs.len());
        if efficiency.is_empty() {
            return FleetReport::default();
        }

        let ((eff, efficiency_distribution), ((miles, cumulative_mileage), flags)) = rayon::join(
            || rayon::join(|| run.summary(&efficiency), || run.sorted_desc(&efficiency)),
            || {
                rayon::join(
                    || rayon::join(|| run.summary(&mileage), || run.running_sum(&mileage)),
                    || {
                        rayon::join(
                            || run.all_of(logs, |t| t.safety_score > floor),
                            || run.any_of(mileage.as_slice(), |&m| m > high),
                        )
                    },
                )
            },
        );
        let (operational_integrity, high_utilization_detected) = flags;

        FleetReport {
            fleet_size: eff.count,
            avg_efficiency: eff.average(),
            total_mileage: miles.total,
            max_miles_single_trip: miles.max,
            critical_maintenance_count: maintenance_count(logs),
            operational_integrity,
            high_utilization_detected,
            efficiency_distribution,
            cumulative_mileage,
        }
    });
    Ok(report)
}

fn maintenance_count(logs: &[Telemetry]) -> usize {
    logs.iter().filter(|t| t.maintenance_required).count()
}
