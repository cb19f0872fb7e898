//! Lumped-capacity battery state-of-charge integrator.
//!
//! The battery is a single energy reservoir. Charging energy is derated by the
//! charge efficiency on the way in; discharge draws more stored energy than the
//! load receives, by the inverse of the discharge efficiency. The result is
//! clamped to `[0, 1]`, and energy implied outside that range is discarded.

use eps_core::units::energy_wh;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BatteryError {
    #[error("battery capacity must be positive and finite (got {0} Wh)")]
    InvalidCapacity(f64),
    #[error("{name} efficiency must lie in (0, 1] (got {value})")]
    InvalidEfficiency { name: &'static str, value: f64 },
}

/// Energy exchanged with the battery over one step, tagged by direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChargeTransfer {
    /// Net power was non-negative; `stored_wh` entered the cells after losses.
    Charging { stored_wh: f64 },
    /// Net power was negative; `drawn_wh` left the cells, including losses.
    Discharging { drawn_wh: f64 },
}

impl ChargeTransfer {
    /// Signed change in stored energy.
    pub fn delta_wh(&self) -> f64 {
        match *self {
            ChargeTransfer::Charging { stored_wh } => stored_wh,
            ChargeTransfer::Discharging { drawn_wh } => -drawn_wh,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatteryModel {
    capacity_wh: f64,
    charge_efficiency: f64,
    discharge_efficiency: f64,
}

impl BatteryModel {
    pub fn new(
        capacity_wh: f64,
        charge_efficiency: f64,
        discharge_efficiency: f64,
    ) -> Result<Self, BatteryError> {
        if !(capacity_wh.is_finite() && capacity_wh > 0.0) {
            return Err(BatteryError::InvalidCapacity(capacity_wh));
        }
        check_efficiency("charge", charge_efficiency)?;
        check_efficiency("discharge", discharge_efficiency)?;
        Ok(Self {
            capacity_wh,
            charge_efficiency,
            discharge_efficiency,
        })
    }

    pub fn capacity_wh(&self) -> f64 {
        self.capacity_wh
    }

    pub fn charge_efficiency(&self) -> f64 {
        self.charge_efficiency
    }

    pub fn discharge_efficiency(&self) -> f64 {
        self.discharge_efficiency
    }

    /// Energy moved in or out of the cells when `net_power_w` flows for `dt_s`.
    ///
    /// Zero net power takes the charging branch.
    pub fn transfer(&self, net_power_w: f64, dt_s: f64) -> ChargeTransfer {
        let bus_wh = energy_wh(net_power_w, dt_s);
        if net_power_w >= 0.0 {
            ChargeTransfer::Charging {
                stored_wh: bus_wh * self.charge_efficiency,
            }
        } else {
            ChargeTransfer::Discharging {
                drawn_wh: -bus_wh / self.discharge_efficiency,
            }
        }
    }

    /// Advance the state of charge by one step and clamp it to `[0, 1]`.
    pub fn step(&self, soc: f64, net_power_w: f64, dt_s: f64) -> f64 {
        let delta = self.transfer(net_power_w, dt_s).delta_wh() / self.capacity_wh;
        (soc + delta).clamp(0.0, 1.0)
    }

    /// Stored energy corresponding to a state of charge.
    pub fn energy_wh(&self, soc: f64) -> f64 {
        soc * self.capacity_wh
    }
}

fn check_efficiency(name: &'static str, value: f64) -> Result<(), BatteryError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(BatteryError::InvalidEfficiency { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn battery() -> BatteryModel {
        BatteryModel::new(50.0, 0.9, 0.9).unwrap()
    }

    #[test]
    fn charging_is_derated_by_charge_efficiency() {
        // 3 W for one hour into 50 Wh at 90%: +2.7 Wh
        let soc = battery().step(0.5, 3.0, 3_600.0);
        assert!((soc - (0.5 + 2.7 / 50.0)).abs() < 1e-12);
    }

    #[test]
    fn discharging_divides_by_discharge_efficiency() {
        // 5 W for 10 s draws 50/3600/0.9 Wh
        let soc = battery().step(0.9, -5.0, 10.0);
        assert!((soc - (0.9 - 1.0 / 3_240.0)).abs() < 1e-12);
    }

    #[test]
    fn zero_net_power_takes_the_charging_branch() {
        let b = battery();
        assert_eq!(
            b.transfer(0.0, 10.0),
            ChargeTransfer::Charging { stored_wh: 0.0 }
        );
        assert_eq!(b.step(0.42, 0.0, 10.0), 0.42);
    }

    #[test]
    fn clamping_discards_excess_energy() {
        let b = battery();
        assert_eq!(b.step(0.999, 100.0, 3_600.0), 1.0);
        assert_eq!(b.step(0.001, -100.0, 3_600.0), 0.0);
        // saturation is lossy: discharging after a clamp does not recover the overflow
        let full = b.step(1.0, 10.0, 3_600.0);
        let after = b.step(full, -10.0, 360.0);
        assert!(after < 1.0);
    }

    #[test]
    fn efficiencies_never_improve_the_energy_balance() {
        let lossy = BatteryModel::new(50.0, 0.8, 0.7).unwrap();
        let ideal = BatteryModel::new(50.0, 1.0, 1.0).unwrap();
        assert!(lossy.step(0.5, 4.0, 600.0) < ideal.step(0.5, 4.0, 600.0));
        assert!(lossy.step(0.5, -4.0, 600.0) < ideal.step(0.5, -4.0, 600.0));
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        assert_eq!(
            BatteryModel::new(0.0, 0.9, 0.9),
            Err(BatteryError::InvalidCapacity(0.0))
        );
        assert!(BatteryModel::new(f64::INFINITY, 0.9, 0.9).is_err());
        assert_eq!(
            BatteryModel::new(50.0, 0.0, 0.9),
            Err(BatteryError::InvalidEfficiency {
                name: "charge",
                value: 0.0
            })
        );
        assert!(BatteryModel::new(50.0, 0.9, 1.01).is_err());
        assert!(BatteryModel::new(50.0, f64::NAN, 0.9).is_err());
        assert!(BatteryModel::new(50.0, 1.0, 1.0).is_ok());
    }
}
