use anyhow::Context;
use clap::Parser;
use cubesat_eps::config::{SimulationConfig, load_config};
use cubesat_eps::engine::{Scenario, simulate};
use cubesat_eps::export::{self, summary, timeseries};
use cubesat_eps::orbits::{circular_period_s, cylindrical_eclipse_fraction};
use log::info;
use std::path::PathBuf;

#[path = "shared/logging.rs"]
mod logging;

/// Simulate battery state of charge over one or more orbits.
#[derive(Parser, Debug)]
#[command(author, version, about = "CubeSat EPS state-of-charge simulator")]
struct Cli {
    /// Scenario file (TOML or YAML); defaults to the built-in reference scenario
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the number of solar panels
    #[arg(long)]
    panels: Option<u32>,

    /// Derive period and eclipse fraction from a circular orbit at this altitude (km)
    #[arg(long)]
    altitude_km: Option<f64>,

    /// Simulate this many whole orbits instead of the configured duration
    #[arg(long)]
    orbits: Option<u32>,

    /// Time-series CSV output (use '-' for stdout)
    #[arg(long)]
    output: Option<PathBuf>,

    /// JSON summary output
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    let mut config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("failed to load scenario {}", path.display()))?,
        None => SimulationConfig::default(),
    };
    apply_overrides(&mut config, &cli)?;

    let scenario = Scenario::new(&config).context("invalid scenario")?;
    info!(
        "running {} steps of {} s",
        scenario.step_count() + 1,
        scenario.time_step_s()
    );
    let result = simulate(&scenario)?;
    let s = result.summary();

    if let Some(path) = &cli.output {
        let mut writer = export::writer_for_path(path)?;
        timeseries::write_csv(&mut *writer, &result)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    if let Some(path) = &cli.summary {
        let label = cli
            .config
            .as_deref()
            .and_then(|p| p.file_stem())
            .and_then(|stem| stem.to_str())
            .unwrap_or("reference");
        let meta = summary::Metadata {
            label,
            orbital_period_s: config.orbital_period_s,
            eclipse_fraction: config.eclipse_fraction,
            time_step_s: config.time_step_s,
            duration_s: config.duration_s,
        };
        summary::write_json(path, &meta, &s)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    // keep stdout clean when the series itself goes there
    if cli.output.as_deref() == Some(std::path::Path::new("-")) {
        return Ok(());
    }

    println!("=== EPS Run ===");
    println!(
        "Orbit          : period = {:.1} s, eclipse = {:.1}% ({:.1} s)",
        scenario.orbit().period_s(),
        scenario.orbit().eclipse_fraction() * 100.0,
        scenario.orbit().eclipse_duration_s()
    );
    println!(
        "Array          : {} panels x {:.2} W = {:.2} W peak, {:.3} kg",
        s.panel_count,
        scenario.array().unit_panel_power_w(),
        scenario.array().peak_power_w(),
        s.array_mass_kg
    );
    println!(
        "Load           : {:.2} W nominal",
        scenario.loads().nominal_w()
    );
    println!("Battery        : {:.1} Wh", s.battery_capacity_wh);
    println!(
        "SOC            : min = {:.4} at t = {} s, max = {:.4}, mean = {:.4}, final = {:.4}",
        s.min_soc, s.time_of_min_soc_s, s.max_soc, s.mean_soc, s.final_soc
    );
    println!(
        "Margin         : {:+.4} vs threshold {:.2} -> {}",
        s.margin,
        s.safety_threshold,
        if s.viable { "VIABLE" } else { "NOT VIABLE" }
    );

    Ok(())
}

fn apply_overrides(config: &mut SimulationConfig, cli: &Cli) -> anyhow::Result<()> {
    if let Some(panels) = cli.panels {
        config.panel_count = panels;
    }
    if let Some(altitude) = cli.altitude_km {
        config.orbital_period_s = circular_period_s(altitude)?;
        config.eclipse_fraction = cylindrical_eclipse_fraction(altitude)?;
        // the configured duration belonged to the old orbit
        config.duration_s = config.orbital_period_s;
    }
    if let Some(orbits) = cli.orbits {
        *config = std::mem::take(config).with_orbits(orbits);
    }
    Ok(())
}
