//! Solar array generation and spacecraft load demand.

pub mod load;

pub use load::{LoadBudget, LoadError, LoadModel, LoadProfile, LoadWindow, Repeat};

use eps_core::constants::SOLAR_CONSTANT_W_M2;
use eps_orbits::OrbitGeometry;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PowerError {
    #[error("unit panel power must be finite and non-negative (got {0} W)")]
    InvalidUnitPower(f64),
    #[error("panel {name} must lie in (0, 1] (got {value})")]
    InvalidPanelEfficiency { name: &'static str, value: f64 },
    #[error("panel area must be positive and finite (got {0} m²)")]
    InvalidPanelArea(f64),
}

/// Body-mounted array of identical panels with ideal conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerSource {
    panel_count: u32,
    unit_panel_power_w: f64,
}

impl PowerSource {
    pub fn new(panel_count: u32, unit_panel_power_w: f64) -> Result<Self, PowerError> {
        if !(unit_panel_power_w.is_finite() && unit_panel_power_w >= 0.0) {
            return Err(PowerError::InvalidUnitPower(unit_panel_power_w));
        }
        Ok(Self {
            panel_count,
            unit_panel_power_w,
        })
    }

    pub fn panel_count(&self) -> u32 {
        self.panel_count
    }

    pub fn unit_panel_power_w(&self) -> f64 {
        self.unit_panel_power_w
    }

    /// Array output at full sun.
    pub fn peak_power_w(&self) -> f64 {
        self.solar_power(1.0)
    }

    /// Array output for an illumination factor in `[0, 1]`.
    pub fn solar_power(&self, illumination: f64) -> f64 {
        f64::from(self.panel_count) * self.unit_panel_power_w * illumination
    }

    pub fn solar_power_at(&self, orbit: &OrbitGeometry, time_s: f64) -> f64 {
        self.solar_power(orbit.illumination(time_s))
    }
}

/// Physical description of one panel, used to derive its rated output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelSpec {
    pub area_m2: f64,
    /// Fraction of the face covered by cells.
    pub packing_efficiency: f64,
    pub cell_efficiency: f64,
    pub mppt_efficiency: f64,
    pub wiring_efficiency: f64,
}

impl Default for PanelSpec {
    /// A 10 cm x 10 cm face half covered with 30% triple-junction cells.
    fn default() -> Self {
        Self {
            area_m2: 0.1 * 0.1,
            packing_efficiency: 0.5,
            cell_efficiency: 0.30,
            mppt_efficiency: 0.95,
            wiring_efficiency: 0.97,
        }
    }
}

impl PanelSpec {
    /// Power delivered to the bus by one panel at normal incidence.
    pub fn unit_power_w(&self) -> Result<f64, PowerError> {
        if !(self.area_m2.is_finite() && self.area_m2 > 0.0) {
            return Err(PowerError::InvalidPanelArea(self.area_m2));
        }
        let factors = [
            ("packing efficiency", self.packing_efficiency),
            ("cell efficiency", self.cell_efficiency),
            ("MPPT efficiency", self.mppt_efficiency),
            ("wiring efficiency", self.wiring_efficiency),
        ];
        let mut watts = SOLAR_CONSTANT_W_M2 * self.area_m2;
        for (name, value) in factors {
            if !(value > 0.0 && value <= 1.0) {
                return Err(PowerError::InvalidPanelEfficiency { name, value });
            }
            watts *= value;
        }
        Ok(watts)
    }
}

/// Total solar array mass for a given panel count.
pub fn array_mass_kg(panel_count: u32, mass_per_panel_kg: f64) -> f64 {
    f64::from(panel_count) * mass_per_panel_kg
}
