//! Parametric studies: the same scenario re-run across one varying field.

use log::{info, warn};
use rayon::prelude::*;

use crate::scenario::Scenario;
use crate::simulation::{RunError, RunSummary, simulate};

const VALUE_TOLERANCE: f64 = 1e-9;

/// The configuration field varied by a sweep, with its values.
#[derive(Debug, Clone, PartialEq)]
pub enum SweepAxis {
    PanelCount(Vec<u32>),
    /// Total array mass; converted to panels through the mass-per-panel constant.
    ArrayMassKg(Vec<f64>),
    BatteryCapacityWh(Vec<f64>),
}

impl SweepAxis {
    pub fn len(&self) -> usize {
        match self {
            SweepAxis::PanelCount(values) => values.len(),
            SweepAxis::ArrayMassKg(values) | SweepAxis::BatteryCapacityWh(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Column-style name of the swept field.
    pub fn label(&self) -> &'static str {
        match self {
            SweepAxis::PanelCount(_) => "panel_count",
            SweepAxis::ArrayMassKg(_) => "array_mass_kg",
            SweepAxis::BatteryCapacityWh(_) => "battery_capacity_wh",
        }
    }

    fn point(&self, base: &Scenario, index: usize) -> (f64, Result<Scenario, RunError>) {
        let (value, scenario) = match self {
            SweepAxis::PanelCount(values) => {
                (f64::from(values[index]), base.with_panel_count(values[index]))
            }
            SweepAxis::ArrayMassKg(values) => (values[index], base.with_array_mass_kg(values[index])),
            SweepAxis::BatteryCapacityWh(values) => {
                (values[index], base.with_capacity_wh(values[index]))
            }
        };
        (value, scenario.map_err(RunError::from))
    }
}

/// Outcome of one sweep value. A failed run does not affect its siblings.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepPoint {
    pub value: f64,
    pub outcome: Result<RunSummary, RunError>,
}

impl SweepPoint {
    pub fn summary(&self) -> Option<&RunSummary> {
        self.outcome.as_ref().ok()
    }

    pub fn error(&self) -> Option<&RunError> {
        self.outcome.as_ref().err()
    }

    pub fn min_soc(&self) -> Option<f64> {
        self.summary().map(|s| s.min_soc)
    }

    pub fn margin(&self) -> Option<f64> {
        self.summary().map(|s| s.margin)
    }
}

/// All points of a sweep, in the order the values were given.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepResult {
    label: &'static str,
    points: Vec<SweepPoint>,
}

impl SweepResult {
    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn points(&self) -> &[SweepPoint] {
        &self.points
    }

    /// The point for a swept value, if it was part of the sweep.
    pub fn get(&self, value: f64) -> Option<&SweepPoint> {
        self.points
            .iter()
            .find(|p| (p.value - value).abs() <= VALUE_TOLERANCE)
    }

    pub fn successes(&self) -> impl Iterator<Item = (f64, &RunSummary)> {
        self.points
            .iter()
            .filter_map(|p| p.summary().map(|s| (p.value, s)))
    }

    pub fn failures(&self) -> impl Iterator<Item = (f64, &RunError)> {
        self.points
            .iter()
            .filter_map(|p| p.error().map(|e| (p.value, e)))
    }

    /// `(value, minimum SOC)` for every successful run.
    pub fn min_soc_series(&self) -> Vec<(f64, f64)> {
        self.successes().map(|(v, s)| (v, s.min_soc)).collect()
    }

    /// Smallest swept value whose run keeps a non-negative margin.
    pub fn best_viable(&self) -> Option<&SweepPoint> {
        self.points
            .iter()
            .filter(|p| p.summary().map(|s| s.viable).unwrap_or(false))
            .min_by(|a, b| a.value.total_cmp(&b.value))
    }
}

/// Run `base` once per axis value, varying only that field.
///
/// Runs are independent and execute on the rayon pool; results keep the
/// order of the axis values.
pub fn run_sweep(base: &Scenario, axis: &SweepAxis) -> SweepResult {
    info!("sweeping {} over {} values", axis.label(), axis.len());

    let points: Vec<SweepPoint> = (0..axis.len())
        .into_par_iter()
        .map(|index| {
            let (value, scenario) = axis.point(base, index);
            let outcome = scenario
                .and_then(|scenario| simulate(&scenario))
                .map(|result| result.summary());
            if let Err(err) = &outcome {
                warn!("{} = {}: run failed: {}", axis.label(), value, err);
            }
            SweepPoint { value, outcome }
        })
        .collect();

    let failed = points.iter().filter(|p| p.outcome.is_err()).count();
    info!(
        "sweep finished: {} succeeded, {} failed",
        points.len() - failed,
        failed
    );

    SweepResult {
        label: axis.label(),
        points,
    }
}
