use anyhow::{Context, anyhow};
use clap::{ArgGroup, Parser};
use cubesat_eps::config::{SimulationConfig, load_config};
use cubesat_eps::engine::{Scenario, SweepAxis, SweepResult, run_sweep};
use cubesat_eps::export::{self, sweep as export_sweep};
use std::path::PathBuf;

#[path = "shared/logging.rs"]
mod logging;

/// Re-run one scenario across a list of panel counts, array masses or battery capacities.
#[derive(Parser, Debug)]
#[command(author, version, about = "CubeSat EPS parametric sweep")]
#[command(group(
    ArgGroup::new("axis")
        .required(true)
        .args(["panels", "masses_kg", "capacities_wh"])
))]
struct Cli {
    /// Scenario file (TOML or YAML); defaults to the built-in reference scenario
    #[arg(long)]
    config: Option<PathBuf>,

    /// Panel counts to sweep, comma separated
    #[arg(long, value_delimiter = ',')]
    panels: Vec<u32>,

    /// Total array masses (kg) to sweep, comma separated
    #[arg(long, value_delimiter = ',')]
    masses_kg: Vec<f64>,

    /// Battery capacities (Wh) to sweep, comma separated
    #[arg(long, value_delimiter = ',')]
    capacities_wh: Vec<f64>,

    /// Simulate this many whole orbits per point instead of the configured duration
    #[arg(long)]
    orbits: Option<u32>,

    /// Sweep CSV output (use '-' for stdout)
    #[arg(long)]
    output: Option<PathBuf>,

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
    if let Some(orbits) = cli.orbits {
        config = config.with_orbits(orbits);
    }
    let base = Scenario::new(&config).context("invalid base scenario")?;
    let axis = select_axis(&cli)?;

    let result = run_sweep(&base, &axis);

    if let Some(path) = &cli.output {
        let mut writer = export::writer_for_path(path)?;
        export_sweep::write_csv(&mut *writer, &result)
            .with_context(|| format!("failed to write {}", path.display()))?;
        if path.as_os_str() == "-" {
            return Ok(());
        }
    }

    print_table(&result);
    Ok(())
}

fn select_axis(cli: &Cli) -> anyhow::Result<SweepAxis> {
    if !cli.panels.is_empty() {
        Ok(SweepAxis::PanelCount(cli.panels.clone()))
    } else if !cli.masses_kg.is_empty() {
        Ok(SweepAxis::ArrayMassKg(cli.masses_kg.clone()))
    } else if !cli.capacities_wh.is_empty() {
        Ok(SweepAxis::BatteryCapacityWh(cli.capacities_wh.clone()))
    } else {
        Err(anyhow!("no sweep values given"))
    }
}

fn print_table(result: &SweepResult) {
    println!(
        "{:>20} {:>7} {:>9} {:>9}  status",
        result.label(),
        "panels",
        "min SOC",
        "margin"
    );
    for point in result.points() {
        match &point.outcome {
            Ok(s) => println!(
                "{:>20} {:>7} {:>9.4} {:>+9.4}  {}",
                point.value,
                s.panel_count,
                s.min_soc,
                s.margin,
                if s.viable { "ok" } else { "below threshold" }
            ),
            Err(err) => println!(
                "{:>20} {:>7} {:>9} {:>9}  error: {}",
                point.value, "-", "-", "-", err
            ),
        }
    }
    match result.best_viable() {
        Some(best) => println!("Best viable {} : {}", result.label(), best.value),
        None => println!("No viable {} in sweep", result.label()),
    }
}
