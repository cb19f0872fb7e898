//! Spacecraft load demand: a nominal draw interrupted by scheduled windows.

use eps_core::time;
use thiserror::Error;

/// Anything that can report the bus load at a given mission time.
///
/// Implemented by [`LoadProfile`] and by plain closures, so externally
/// generated schedules can drive the simulation engine.
pub trait LoadModel {
    fn load_power(&self, time_s: f64) -> f64;
}

impl<F> LoadModel for F
where
    F: Fn(f64) -> f64,
{
    fn load_power(&self, time_s: f64) -> f64 {
        self(time_s)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadError {
    #[error("{name} load must be finite and non-negative (got {value} W)")]
    InvalidLoad { name: &'static str, value: f64 },
    #[error("orbital period must be positive and finite (got {0} s)")]
    InvalidPeriod(f64),
    #[error("load window {index} must satisfy start < end (got [{start_s}, {end_s}))")]
    EmptyWindow {
        index: usize,
        start_s: f64,
        end_s: f64,
    },
    #[error("per-orbit load window {index} must lie within [0, {period_s}] s")]
    WindowOutsideOrbit { index: usize, period_s: f64 },
    #[error("load windows {first} and {second} overlap")]
    OverlappingWindows { first: usize, second: usize },
    #[error("subsystem {subsystem} load must be finite and non-negative (got {value} W)")]
    InvalidSubsystemLoad { subsystem: String, value: f64 },
}

/// How a window's bounds are interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Repeat {
    /// Absolute mission time.
    #[default]
    Once,
    /// Offset from the start of each orbit.
    EveryOrbit,
}

/// Half-open interval `[start_s, end_s)` with an alternate load.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadWindow {
    pub start_s: f64,
    pub end_s: f64,
    /// Overrides the profile's communication load when set.
    pub load_w: Option<f64>,
    pub repeat: Repeat,
}

impl LoadWindow {
    pub fn once(start_s: f64, end_s: f64) -> Self {
        Self {
            start_s,
            end_s,
            load_w: None,
            repeat: Repeat::Once,
        }
    }

    pub fn every_orbit(start_s: f64, end_s: f64) -> Self {
        Self {
            repeat: Repeat::EveryOrbit,
            ..Self::once(start_s, end_s)
        }
    }

    pub fn with_load(mut self, load_w: f64) -> Self {
        self.load_w = Some(load_w);
        self
    }

    fn contains(&self, time_s: f64, period_s: f64) -> bool {
        let t = match self.repeat {
            Repeat::Once => time_s,
            Repeat::EveryOrbit => time::wrap(time_s, period_s),
        };
        self.start_s <= t && t < self.end_s
    }
}

/// Validated load schedule. Windows are pairwise disjoint.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadProfile {
    nominal_w: f64,
    comm_load_w: f64,
    windows: Vec<LoadWindow>,
    period_s: f64,
}

impl LoadProfile {
    pub fn new(
        nominal_w: f64,
        comm_load_w: f64,
        windows: Vec<LoadWindow>,
        period_s: f64,
    ) -> Result<Self, LoadError> {
        check_load("nominal", nominal_w)?;
        check_load("communication", comm_load_w)?;
        if !(period_s.is_finite() && period_s > 0.0) {
            return Err(LoadError::InvalidPeriod(period_s));
        }

        for (index, window) in windows.iter().enumerate() {
            if let Some(load) = window.load_w {
                check_load("window", load)?;
            }
            if !(window.start_s.is_finite() && window.end_s.is_finite())
                || window.start_s >= window.end_s
            {
                return Err(LoadError::EmptyWindow {
                    index,
                    start_s: window.start_s,
                    end_s: window.end_s,
                });
            }
            if window.repeat == Repeat::EveryOrbit
                && (window.start_s < 0.0 || window.end_s > period_s)
            {
                return Err(LoadError::WindowOutsideOrbit { index, period_s });
            }
        }

        for (first, a) in windows.iter().enumerate() {
            for (offset, b) in windows[first + 1..].iter().enumerate() {
                if windows_overlap(a, b, period_s) {
                    return Err(LoadError::OverlappingWindows {
                        first,
                        second: first + 1 + offset,
                    });
                }
            }
        }

        Ok(Self {
            nominal_w,
            comm_load_w,
            windows,
            period_s,
        })
    }

    /// Profile with a constant draw and no scheduled events.
    pub fn constant(nominal_w: f64, period_s: f64) -> Result<Self, LoadError> {
        Self::new(nominal_w, 0.0, Vec::new(), period_s)
    }

    pub fn nominal_w(&self) -> f64 {
        self.nominal_w
    }

    pub fn windows(&self) -> &[LoadWindow] {
        &self.windows
    }

    /// The window active at `time_s`, if any.
    pub fn active_window(&self, time_s: f64) -> Option<&LoadWindow> {
        self.windows
            .iter()
            .find(|w| w.contains(time_s, self.period_s))
    }

    pub fn load_power(&self, time_s: f64) -> f64 {
        match self.active_window(time_s) {
            Some(window) => window.load_w.unwrap_or(self.comm_load_w),
            None => self.nominal_w,
        }
    }
}

impl LoadModel for LoadProfile {
    fn load_power(&self, time_s: f64) -> f64 {
        LoadProfile::load_power(self, time_s)
    }
}

fn check_load(name: &'static str, value: f64) -> Result<(), LoadError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(LoadError::InvalidLoad { name, value })
    }
}

fn intervals_overlap(a_start: f64, a_end: f64, b_start: f64, b_end: f64) -> bool {
    a_start < b_end && b_start < a_end
}

fn windows_overlap(a: &LoadWindow, b: &LoadWindow, period_s: f64) -> bool {
    match (a.repeat, b.repeat) {
        (Repeat::Once, Repeat::Once) | (Repeat::EveryOrbit, Repeat::EveryOrbit) => {
            intervals_overlap(a.start_s, a.end_s, b.start_s, b.end_s)
        }
        (Repeat::Once, Repeat::EveryOrbit) => once_hits_periodic(a, b, period_s),
        (Repeat::EveryOrbit, Repeat::Once) => once_hits_periodic(b, a, period_s),
    }
}

fn once_hits_periodic(once: &LoadWindow, periodic: &LoadWindow, period_s: f64) -> bool {
    if once.end_s - once.start_s >= period_s {
        return true;
    }
    // only a handful of orbit repetitions can touch an interval shorter than one period
    let first = ((once.start_s - periodic.end_s) / period_s).floor() as i64;
    let last = ((once.end_s - periodic.start_s) / period_s).ceil() as i64;
    (first..=last).any(|k| {
        let shift = k as f64 * period_s;
        intervals_overlap(
            once.start_s,
            once.end_s,
            periodic.start_s + shift,
            periodic.end_s + shift,
        )
    })
}

/// Named per-subsystem power draws summed into a nominal load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadBudget {
    entries: Vec<(String, f64)>,
}

impl LoadBudget {
    pub fn with(mut self, subsystem: impl Into<String>, power_w: f64) -> Self {
        self.entries.push((subsystem.into(), power_w));
        self
    }

    pub fn entries(&self) -> &[(String, f64)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all draws. Every entry must be a finite, non-negative power.
    pub fn total_w(&self) -> Result<f64, LoadError> {
        let mut total = 0.0;
        for (subsystem, power_w) in &self.entries {
            if !(power_w.is_finite() && *power_w >= 0.0) {
                return Err(LoadError::InvalidSubsystemLoad {
                    subsystem: subsystem.clone(),
                    value: *power_w,
                });
            }
            total += power_w;
        }
        Ok(total)
    }
}
