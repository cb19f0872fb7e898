//! Single-run time stepping of the battery state of charge.

use eps_power::LoadModel;
use log::debug;
use serde::Serialize;
use thiserror::Error;

use crate::scenario::{ConfigurationError, Scenario};

/// One simulated instant. `soc` is the value after the step's update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeStepRecord {
    pub time_s: f64,
    pub orbital_angle_deg: f64,
    pub sunlit: bool,
    pub solar_power_w: f64,
    pub load_power_w: f64,
    pub net_power_w: f64,
    pub soc: f64,
    /// Load shedding was active during this step.
    pub safe_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RunError {
    #[error("invalid configuration: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("non-finite {quantity} at t = {time_s} s (step {step})")]
    NumericAnomaly {
        step: usize,
        time_s: f64,
        quantity: &'static str,
    },
}

/// Scalar outcome of one run, detached from its time series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RunSummary {
    pub panel_count: u32,
    pub array_mass_kg: f64,
    pub battery_capacity_wh: f64,
    pub min_soc: f64,
    pub max_soc: f64,
    pub mean_soc: f64,
    pub final_soc: f64,
    pub time_of_min_soc_s: f64,
    pub safety_threshold: f64,
    /// Minimum SOC minus the safety threshold.
    pub margin: f64,
    pub viable: bool,
    pub records: usize,
}

/// Complete, time-ordered output of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    records: Vec<TimeStepRecord>,
    summary: RunSummary,
}

impl RunResult {
    fn finalize(scenario: &Scenario, records: Vec<TimeStepRecord>) -> Self {
        // the grid always contains t = 0
        debug_assert!(!records.is_empty());
        let mut min_soc = f64::INFINITY;
        let mut max_soc = f64::NEG_INFINITY;
        let mut time_of_min = 0.0;
        let mut total = 0.0;
        for record in &records {
            // strict comparison keeps the earliest time of the minimum
            if record.soc < min_soc {
                min_soc = record.soc;
                time_of_min = record.time_s;
            }
            max_soc = max_soc.max(record.soc);
            total += record.soc;
        }
        let final_soc = records.last().map_or(scenario.initial_soc(), |r| r.soc);
        let mean_soc = total / records.len() as f64;
        let margin = min_soc - scenario.safety_threshold();

        let summary = RunSummary {
            panel_count: scenario.panel_count(),
            array_mass_kg: scenario.array_mass_kg(),
            battery_capacity_wh: scenario.battery().capacity_wh(),
            min_soc,
            max_soc,
            mean_soc,
            final_soc,
            time_of_min_soc_s: time_of_min,
            safety_threshold: scenario.safety_threshold(),
            margin,
            viable: margin >= 0.0,
            records: records.len(),
        };
        Self { records, summary }
    }

    pub fn records(&self) -> &[TimeStepRecord] {
        &self.records
    }

    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    pub fn min_soc(&self) -> f64 {
        self.summary.min_soc
    }

    pub fn max_soc(&self) -> f64 {
        self.summary.max_soc
    }

    pub fn time_of_min_soc_s(&self) -> f64 {
        self.summary.time_of_min_soc_s
    }

    pub fn mean_soc(&self) -> f64 {
        self.summary.mean_soc
    }

    pub fn final_soc(&self) -> f64 {
        self.summary.final_soc
    }

    pub fn margin(&self) -> f64 {
        self.summary.margin
    }

    pub fn is_viable(&self) -> bool {
        self.summary.viable
    }
}

/// Run a scenario with its configured load profile.
pub fn simulate(scenario: &Scenario) -> Result<RunResult, RunError> {
    simulate_with_load(scenario, scenario.loads())
}

/// Run a scenario against an arbitrary load source.
///
/// Grid points are `t_k = k * dt` for `k = 0..=N`, computed from the index so
/// long runs do not accumulate drift. At each point the state of charge is
/// advanced by one full step using the power balance at `t_k`.
pub fn simulate_with_load<L>(scenario: &Scenario, loads: &L) -> Result<RunResult, RunError>
where
    L: LoadModel + ?Sized,
{
    let orbit = scenario.orbit();
    let array = scenario.array();
    let battery = scenario.battery();
    let safe_mode = scenario.safe_mode();
    let dt = scenario.time_step_s();
    let steps = scenario.step_count();

    debug!(
        "simulating {} panels, {:.1} Wh battery over {} steps of {} s",
        scenario.panel_count(),
        battery.capacity_wh(),
        steps + 1,
        dt
    );

    let mut records = Vec::with_capacity(steps + 1);
    let mut soc = scenario.initial_soc();
    for step in 0..=steps {
        let time_s = step as f64 * dt;
        let sunlit = orbit.is_sunlit(time_s);
        let solar_power_w = array.solar_power(orbit.illumination(time_s));
        let shedding = safe_mode.filter(|mode| soc < mode.enter_below_soc);
        let load_power_w = match shedding {
            Some(mode) => mode.load_w,
            None => loads.load_power(time_s),
        };
        check_finite(step, time_s, "solar power", solar_power_w)?;
        check_finite(step, time_s, "load power", load_power_w)?;
        let net_power_w = solar_power_w - load_power_w;
        check_finite(step, time_s, "net power", net_power_w)?;

        soc = battery.step(soc, net_power_w, dt);
        check_finite(step, time_s, "state of charge", soc)?;

        records.push(TimeStepRecord {
            time_s,
            orbital_angle_deg: orbit.orbital_angle_deg(time_s),
            sunlit,
            solar_power_w,
            load_power_w,
            net_power_w,
            soc,
            safe_mode: shedding.is_some(),
        });
    }

    let result = RunResult::finalize(scenario, records);
    debug!(
        "run complete: min SOC {:.4} at t = {} s, final SOC {:.4}",
        result.min_soc(),
        result.time_of_min_soc_s(),
        result.final_soc()
    );
    Ok(result)
}

fn check_finite(
    step: usize,
    time_s: f64,
    quantity: &'static str,
    value: f64,
) -> Result<(), RunError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(RunError::NumericAnomaly {
            step,
            time_s,
            quantity,
        })
    }
}
