//! Sunlight/eclipse geometry for circular low Earth orbits.
//!
//! The eclipse is modelled as the leading arc of every orbit: phases in
//! `[0, eclipse_fraction)` are in shadow, the remainder is sunlit. Illumination
//! is binary; there is no penumbra.

use eps_core::constants::{EARTH_RADIUS_KM, MU_EARTH_KM3_S2};
use eps_core::time;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum OrbitError {
    #[error("orbital period must be positive and finite (got {0} s)")]
    InvalidPeriod(f64),
    #[error("eclipse fraction must lie in [0, 1) (got {0})")]
    InvalidEclipseFraction(f64),
    #[error("orbit altitude must be positive and finite (got {0} km)")]
    InvalidAltitude(f64),
}

/// Periodic sunlit/eclipse timeline of a circular orbit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitGeometry {
    period_s: f64,
    eclipse_fraction: f64,
}

impl OrbitGeometry {
    pub fn new(period_s: f64, eclipse_fraction: f64) -> Result<Self, OrbitError> {
        if !(period_s.is_finite() && period_s > 0.0) {
            return Err(OrbitError::InvalidPeriod(period_s));
        }
        if !(0.0..1.0).contains(&eclipse_fraction) {
            return Err(OrbitError::InvalidEclipseFraction(eclipse_fraction));
        }
        Ok(Self {
            period_s,
            eclipse_fraction,
        })
    }

    /// Geometry of a circular orbit at `altitude_km` with the Sun in the orbit plane.
    pub fn circular_leo(altitude_km: f64) -> Result<Self, OrbitError> {
        let period = circular_period_s(altitude_km)?;
        let fraction = cylindrical_eclipse_fraction(altitude_km)?;
        Self::new(period, fraction)
    }

    pub fn period_s(&self) -> f64 {
        self.period_s
    }

    pub fn eclipse_fraction(&self) -> f64 {
        self.eclipse_fraction
    }

    /// Fractional orbital position in `[0, 1)`.
    pub fn phase(&self, time_s: f64) -> f64 {
        time::phase(time_s, self.period_s)
    }

    /// Orbital angle in degrees, `[0, 360)`.
    pub fn orbital_angle_deg(&self, time_s: f64) -> f64 {
        self.phase(time_s) * 360.0
    }

    pub fn is_sunlit(&self, time_s: f64) -> bool {
        self.phase(time_s) >= self.eclipse_fraction
    }

    /// 1.0 in sunlight, 0.0 in eclipse.
    pub fn illumination(&self, time_s: f64) -> f64 {
        if self.is_sunlit(time_s) { 1.0 } else { 0.0 }
    }

    /// Duration of the shadow arc of one orbit.
    pub fn eclipse_duration_s(&self) -> f64 {
        self.eclipse_fraction * self.period_s
    }
}

/// Keplerian period of a circular Earth orbit.
pub fn circular_period_s(altitude_km: f64) -> Result<f64, OrbitError> {
    let radius = orbit_radius_km(altitude_km)?;
    Ok(2.0 * std::f64::consts::PI * (radius.powi(3) / MU_EARTH_KM3_S2).sqrt())
}

/// Shadow fraction of a circular orbit under a cylindrical Earth shadow with zero beta angle.
pub fn cylindrical_eclipse_fraction(altitude_km: f64) -> Result<f64, OrbitError> {
    let radius = orbit_radius_km(altitude_km)?;
    Ok((EARTH_RADIUS_KM / radius).asin() / std::f64::consts::PI)
}

fn orbit_radius_km(altitude_km: f64) -> Result<f64, OrbitError> {
    if !(altitude_km.is_finite() && altitude_km > 0.0) {
        return Err(OrbitError::InvalidAltitude(altitude_km));
    }
    Ok(EARTH_RADIUS_KM + altitude_km)
}
