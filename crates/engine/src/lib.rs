//! EPS simulation engine façade: validated scenarios, the time-stepping run, and parametric sweeps.

pub mod scenario;
pub mod simulation;
pub mod sweep;

pub use scenario::{ConfigurationError, MAX_STEPS, SafeMode, Scenario};
pub use simulation::{RunError, RunResult, RunSummary, TimeStepRecord, simulate, simulate_with_load};
pub use sweep::{SweepAxis, SweepPoint, SweepResult, run_sweep};
