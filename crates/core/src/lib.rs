//! Core units, constants, and shared primitives for the CubeSat EPS simulator workspace.

/// Physical constants expressed in SI units (unless stated otherwise).
pub mod constants {
    /// Mean solar irradiance at 1 AU (W/m²).
    pub const SOLAR_CONSTANT_W_M2: f64 = 1361.0;
    /// Earth gravitational parameter (km³/s²).
    pub const MU_EARTH_KM3_S2: f64 = 398_600.441_8;
    /// Earth equatorial radius (km).
    pub const EARTH_RADIUS_KM: f64 = 6_378.137;
    /// Seconds per hour.
    pub const SECONDS_PER_HOUR: f64 = 3_600.0;
}

/// Basic unit conversion helpers.
pub mod units {
    use super::constants::SECONDS_PER_HOUR;

    /// Energy delivered by `power_w` over `dt_s`, in watt-hours.
    #[inline]
    pub fn energy_wh(power_w: f64, dt_s: f64) -> f64 {
        power_w * dt_s / SECONDS_PER_HOUR
    }
}

/// Lightweight time utilities shared across crates.
pub mod time {
    /// Time folded into `[0, period_s)`.
    ///
    /// Negative and very large times wrap through the Euclidean remainder.
    #[inline]
    pub fn wrap(time_s: f64, period_s: f64) -> f64 {
        let wrapped = time_s.rem_euclid(period_s);
        // rem_euclid can round up to exactly `period_s` for tiny negative inputs
        if wrapped >= period_s { 0.0 } else { wrapped }
    }

    /// Fractional position within a repeating period, always in `[0, 1)`.
    #[inline]
    pub fn phase(time_s: f64, period_s: f64) -> f64 {
        let phase = wrap(time_s, period_s) / period_s;
        if phase >= 1.0 { 0.0 } else { phase }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_wraps_negative_and_large_times() {
        assert_eq!(time::phase(0.0, 100.0), 0.0);
        assert!((time::phase(250.0, 100.0) - 0.5).abs() < 1e-12);
        assert!((time::phase(-25.0, 100.0) - 0.75).abs() < 1e-12);
        assert_eq!(time::phase(-1e-18, 100.0), 0.0);
        let p = time::phase(1.0e12 + 10.0, 100.0);
        assert!((0.0..1.0).contains(&p));
    }

    #[test]
    fn energy_conversion_is_watt_hours() {
        assert!((units::energy_wh(5.0, 3_600.0) - 5.0).abs() < 1e-12);
        assert!((units::energy_wh(-5.0, 10.0) + 5.0 / 360.0).abs() < 1e-15);
    }
}
