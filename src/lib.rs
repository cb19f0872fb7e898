//! CubeSat electrical power subsystem simulator.
//!
//! The engine steps battery state of charge through sunlit and eclipse arcs
//! of a circular orbit and sweeps sizing parameters across many runs. Member
//! crates are re-exported here so front-ends share one entry point.

pub use eps_battery as battery;
pub use eps_config as config;
pub use eps_core as common;
pub use eps_engine as engine;
pub use eps_export as export;
pub use eps_orbits as orbits;
pub use eps_power as power;

/// Returns the version of the library for smoke tests.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
