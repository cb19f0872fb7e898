//! Validation of run configurations into ready-to-simulate scenarios.

use eps_battery::{BatteryError, BatteryModel};
use eps_config::{LoadWindowConfig, PanelConfig, SimulationConfig, WindowRepeat};
use eps_orbits::{OrbitError, OrbitGeometry};
use eps_power::{
    LoadBudget, LoadError, LoadProfile, LoadWindow, PanelSpec, PowerError, PowerSource, Repeat,
};
use thiserror::Error;

/// Upper bound on grid points per run.
pub const MAX_STEPS: usize = 20_000_000;
/// The time step must resolve each orbit into at least this many points.
const MIN_STEPS_PER_ORBIT: f64 = 10.0;
/// Absorbs rounding when the duration is an exact multiple of the time step.
const GRID_TOLERANCE: f64 = 1e-9;
/// Largest distance from a whole panel count accepted when converting array mass.
const PANEL_COUNT_TOLERANCE: f64 = 1e-6;

/// Invalid run configuration, detected before any step is taken.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("orbit: {0}")]
    Orbit(#[from] OrbitError),
    #[error("solar array: {0}")]
    Power(#[from] PowerError),
    #[error("load profile: {0}")]
    Load(#[from] LoadError),
    #[error("battery: {0}")]
    Battery(#[from] BatteryError),
    #[error("time step must be positive and finite (got {0} s)")]
    InvalidTimeStep(f64),
    #[error("time step of {dt_s} s is too coarse for a {period_s} s orbit")]
    TimeStepTooCoarse { dt_s: f64, period_s: f64 },
    #[error("duration must be finite and non-negative (got {0} s)")]
    InvalidDuration(f64),
    #[error("run needs {steps:.0} steps, above the limit of {limit}")]
    TooManySteps { steps: f64, limit: usize },
    #[error("initial state of charge must lie in [0, 1] (got {0})")]
    InvalidInitialSoc(f64),
    #[error("state-of-charge safety threshold must lie in [0, 1] (got {0})")]
    InvalidSafetyThreshold(f64),
    #[error("safe-mode entry threshold must lie in [0, 1] (got {0})")]
    InvalidSafeModeThreshold(f64),
    #[error("safe-mode load must be finite and non-negative (got {0} W)")]
    InvalidSafeModeLoad(f64),
    #[error("mass per panel must be positive and finite (got {0} kg)")]
    InvalidPanelMass(f64),
    #[error("array mass of {mass_kg} kg is not a whole number of {mass_per_panel_kg} kg panels")]
    FractionalPanelCount { mass_kg: f64, mass_per_panel_kg: f64 },
}

/// Load shedding rule applied while the battery is below a floor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SafeMode {
    pub enter_below_soc: f64,
    pub load_w: f64,
}

/// A validated, immutable run configuration with its component models.
///
/// Built from an [`eps_config::SimulationConfig`]; every invariant is checked
/// here so the simulation loop never has to reject input.
#[derive(Debug, Clone)]
pub struct Scenario {
    config: SimulationConfig,
    orbit: OrbitGeometry,
    array: PowerSource,
    loads: LoadProfile,
    battery: BatteryModel,
    safe_mode: Option<SafeMode>,
    step_count: usize,
}

impl Scenario {
    pub fn new(config: &SimulationConfig) -> Result<Self, ConfigurationError> {
        let orbit = OrbitGeometry::new(config.orbital_period_s, config.eclipse_fraction)?;
        let unit_power_w = match &config.panel {
            Some(panel) => panel_spec(panel).unit_power_w()?,
            None => config.unit_panel_power_w,
        };
        let array = PowerSource::new(config.panel_count, unit_power_w)?;
        let nominal_load_w = if config.load_budget.is_empty() {
            config.nominal_load_w
        } else {
            config
                .load_budget
                .iter()
                .fold(LoadBudget::default(), |budget, entry| {
                    budget.with(entry.name.as_str(), entry.power_w)
                })
                .total_w()?
        };
        let windows = config.comm_windows.iter().map(load_window).collect();
        let loads = LoadProfile::new(
            nominal_load_w,
            config.comm_load_w,
            windows,
            config.orbital_period_s,
        )?;
        let battery = BatteryModel::new(
            config.battery_capacity_wh,
            config.charge_efficiency,
            config.discharge_efficiency,
        )?;

        let dt = config.time_step_s;
        if !(dt.is_finite() && dt > 0.0) {
            return Err(ConfigurationError::InvalidTimeStep(dt));
        }
        if dt > orbit.period_s() / MIN_STEPS_PER_ORBIT {
            return Err(ConfigurationError::TimeStepTooCoarse {
                dt_s: dt,
                period_s: orbit.period_s(),
            });
        }
        let duration = config.duration_s;
        if !(duration.is_finite() && duration >= 0.0) {
            return Err(ConfigurationError::InvalidDuration(duration));
        }
        let steps = (duration / dt + GRID_TOLERANCE).floor();
        if steps >= MAX_STEPS as f64 {
            return Err(ConfigurationError::TooManySteps {
                steps,
                limit: MAX_STEPS,
            });
        }

        if !(0.0..=1.0).contains(&config.initial_soc) {
            return Err(ConfigurationError::InvalidInitialSoc(config.initial_soc));
        }
        if !(0.0..=1.0).contains(&config.soc_safety_threshold) {
            return Err(ConfigurationError::InvalidSafetyThreshold(
                config.soc_safety_threshold,
            ));
        }
        if !(config.mass_per_panel_kg.is_finite() && config.mass_per_panel_kg > 0.0) {
            return Err(ConfigurationError::InvalidPanelMass(config.mass_per_panel_kg));
        }
        let safe_mode = config.safe_mode.map(validate_safe_mode).transpose()?;

        Ok(Self {
            config: config.clone(),
            orbit,
            array,
            loads,
            battery,
            safe_mode,
            step_count: steps as usize,
        })
    }

    /// Same scenario with a different panel count.
    pub fn with_panel_count(&self, panel_count: u32) -> Result<Self, ConfigurationError> {
        let mut config = self.config.clone();
        config.panel_count = panel_count;
        Self::new(&config)
    }

    /// Same scenario with as many panels as `mass_kg` of array allows.
    ///
    /// The mass has to correspond to a whole number of panels.
    pub fn with_array_mass_kg(&self, mass_kg: f64) -> Result<Self, ConfigurationError> {
        let per_panel = self.config.mass_per_panel_kg;
        let panels = mass_kg / per_panel;
        let whole = panels.round();
        if !panels.is_finite()
            || whole < 0.0
            || whole > f64::from(u32::MAX)
            || (panels - whole).abs() > PANEL_COUNT_TOLERANCE
        {
            return Err(ConfigurationError::FractionalPanelCount {
                mass_kg,
                mass_per_panel_kg: per_panel,
            });
        }
        self.with_panel_count(whole as u32)
    }

    /// Same scenario with a different battery capacity.
    pub fn with_capacity_wh(&self, capacity_wh: f64) -> Result<Self, ConfigurationError> {
        let mut config = self.config.clone();
        config.battery_capacity_wh = capacity_wh;
        Self::new(&config)
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn orbit(&self) -> &OrbitGeometry {
        &self.orbit
    }

    pub fn array(&self) -> &PowerSource {
        &self.array
    }

    pub fn loads(&self) -> &LoadProfile {
        &self.loads
    }

    pub fn battery(&self) -> &BatteryModel {
        &self.battery
    }

    pub fn safe_mode(&self) -> Option<SafeMode> {
        self.safe_mode
    }

    pub fn time_step_s(&self) -> f64 {
        self.config.time_step_s
    }

    /// Number of steps after `t = 0`; the run records `step_count() + 1` points.
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn initial_soc(&self) -> f64 {
        self.config.initial_soc
    }

    pub fn safety_threshold(&self) -> f64 {
        self.config.soc_safety_threshold
    }

    pub fn panel_count(&self) -> u32 {
        self.array.panel_count()
    }

    pub fn array_mass_kg(&self) -> f64 {
        eps_power::array_mass_kg(self.array.panel_count(), self.config.mass_per_panel_kg)
    }
}

fn panel_spec(config: &PanelConfig) -> PanelSpec {
    PanelSpec {
        area_m2: config.area_m2,
        packing_efficiency: config.packing_efficiency,
        cell_efficiency: config.cell_efficiency,
        mppt_efficiency: config.mppt_efficiency,
        wiring_efficiency: config.wiring_efficiency,
    }
}

fn load_window(config: &LoadWindowConfig) -> LoadWindow {
    LoadWindow {
        start_s: config.start_s,
        end_s: config.end_s,
        load_w: config.load_w,
        repeat: match config.repeat {
            WindowRepeat::Once => Repeat::Once,
            WindowRepeat::EveryOrbit => Repeat::EveryOrbit,
        },
    }
}

fn validate_safe_mode(config: eps_config::SafeModeConfig) -> Result<SafeMode, ConfigurationError> {
    if !(0.0..=1.0).contains(&config.enter_below_soc) {
        return Err(ConfigurationError::InvalidSafeModeThreshold(
            config.enter_below_soc,
        ));
    }
    if !(config.load_w.is_finite() && config.load_w >= 0.0) {
        return Err(ConfigurationError::InvalidSafeModeLoad(config.load_w));
    }
    Ok(SafeMode {
        enter_below_soc: config.enter_below_soc,
        load_w: config.load_w,
    })
}
