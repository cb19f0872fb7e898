//! Configuration models and loaders for the CubeSat EPS simulator.
//!
//! Files describe a single simulation run. Every field is optional: anything
//! left out falls back to the reference 1U scenario returned by
//! [`SimulationConfig::default`]. Unknown keys are rejected.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raw run configuration as read from TOML/YAML manifests.
///
/// Values are not validated here; `eps_engine` checks them when the run is set up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    pub orbital_period_s: f64,
    /// Fraction of each orbit spent in the Earth's shadow.
    pub eclipse_fraction: f64,
    pub panel_count: u32,
    pub unit_panel_power_w: f64,
    pub battery_capacity_wh: f64,
    pub charge_efficiency: f64,
    pub discharge_efficiency: f64,
    pub nominal_load_w: f64,
    /// Load drawn inside a communication window unless the window overrides it.
    pub comm_load_w: f64,
    pub comm_windows: Vec<LoadWindowConfig>,
    pub soc_safety_threshold: f64,
    pub initial_soc: f64,
    pub time_step_s: f64,
    pub duration_s: f64,
    pub mass_per_panel_kg: f64,
    pub safe_mode: Option<SafeModeConfig>,
    /// Cell-level panel description. When present it replaces `unit_panel_power_w`.
    pub panel: Option<PanelConfig>,
    /// Per-subsystem draws. When non-empty their sum replaces `nominal_load_w`.
    pub load_budget: Vec<SubsystemLoadConfig>,
}

/// A scheduled interval during which the spacecraft draws a different load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoadWindowConfig {
    pub start_s: f64,
    pub end_s: f64,
    #[serde(default)]
    pub load_w: Option<f64>,
    #[serde(default)]
    pub repeat: WindowRepeat,
}

/// Whether a window is pinned to mission time or repeats each orbit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowRepeat {
    /// `start_s`/`end_s` are absolute mission times.
    #[default]
    Once,
    /// `start_s`/`end_s` are offsets from the start of every orbit.
    EveryOrbit,
}

/// Load shedding applied while the battery sits below a state-of-charge floor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SafeModeConfig {
    pub enter_below_soc: f64,
    pub load_w: f64,
}

/// Panel geometry and conversion chain used to derive the per-panel output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PanelConfig {
    pub area_m2: f64,
    pub packing_efficiency: f64,
    pub cell_efficiency: f64,
    pub mppt_efficiency: f64,
    pub wiring_efficiency: f64,
}

/// One line of the power budget, e.g. `{ name = "ADCS", power_w = 0.8 }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubsystemLoadConfig {
    pub name: String,
    pub power_w: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            orbital_period_s: 5_760.0,
            eclipse_fraction: 0.35,
            panel_count: 4,
            unit_panel_power_w: 2.0,
            battery_capacity_wh: 50.0,
            charge_efficiency: 0.9,
            discharge_efficiency: 0.9,
            nominal_load_w: 5.0,
            comm_load_w: 15.0,
            comm_windows: Vec::new(),
            soc_safety_threshold: 0.3,
            initial_soc: 0.9,
            time_step_s: 10.0,
            duration_s: 5_760.0,
            mass_per_panel_kg: 0.05,
            safe_mode: None,
            panel: None,
            load_budget: Vec::new(),
        }
    }
}

impl SimulationConfig {
    /// Stretch the run to cover `orbits` full orbital periods.
    pub fn with_orbits(mut self, orbits: u32) -> Self {
        self.duration_s = f64::from(orbits) * self.orbital_period_s;
        self
    }
}

/// Errors that can occur while loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Load a single run configuration from a `.toml` or YAML file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SimulationConfig, ConfigError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)?;
    if is_toml(path) {
        Ok(toml::from_str(&contents)?)
    } else {
        Ok(serde_yaml::from_str(&contents)?)
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension().map(|ext| ext == "toml").unwrap_or(false)
}
