//! Export helpers for CSV and JSON artifacts.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Create a writer for the target path, handling stdout (`-`) by convention.
pub fn writer_for_path(path: &Path) -> io::Result<Box<dyn Write>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    Ok(Box::new(BufWriter::new(file)))
}

pub mod timeseries {
    use std::io::{self, Write};

    use eps_engine::{RunResult, TimeStepRecord};

    pub const HEADER: &str =
        "time_s,orbital_angle_deg,sunlit,solar_power_w,load_power_w,net_power_w,soc,safe_mode";

    /// Write the standard time-series CSV header.
    pub fn write_header(writer: &mut dyn Write) -> io::Result<()> {
        writeln!(writer, "{}", HEADER)
    }

    /// Serialize one record, matching the header ordering.
    pub fn write_record(writer: &mut dyn Write, record: &TimeStepRecord) -> io::Result<()> {
        writeln!(
            writer,
            "{},{:.4},{},{:.6},{:.6},{:.6},{:.9},{}",
            record.time_s,
            record.orbital_angle_deg,
            record.sunlit,
            record.solar_power_w,
            record.load_power_w,
            record.net_power_w,
            record.soc,
            record.safe_mode,
        )
    }

    /// Write a full run: header followed by every record in time order.
    pub fn write_csv(writer: &mut dyn Write, result: &RunResult) -> io::Result<()> {
        write_header(writer)?;
        for record in result.records() {
            write_record(writer, record)?;
        }
        writer.flush()
    }
}

pub mod sweep {
    use std::io::{self, Write};

    use eps_engine::SweepResult;

    pub const HEADER: &str = "parameter,value,panel_count,array_mass_kg,battery_capacity_wh,min_soc,max_soc,mean_soc,final_soc,margin,viable,error";

    /// Write one row per sweep point; failed runs leave the metric columns empty.
    pub fn write_csv(writer: &mut dyn Write, result: &SweepResult) -> io::Result<()> {
        writeln!(writer, "{}", HEADER)?;
        for point in result.points() {
            match &point.outcome {
                Ok(s) => writeln!(
                    writer,
                    "{},{},{},{:.3},{:.3},{:.6},{:.6},{:.6},{:.6},{:.6},{},",
                    result.label(),
                    point.value,
                    s.panel_count,
                    s.array_mass_kg,
                    s.battery_capacity_wh,
                    s.min_soc,
                    s.max_soc,
                    s.mean_soc,
                    s.final_soc,
                    s.margin,
                    s.viable,
                )?,
                Err(err) => writeln!(
                    writer,
                    "{},{},,,,,,,,,false,\"{}\"",
                    result.label(),
                    point.value,
                    err.to_string().replace('"', "'"),
                )?,
            }
        }
        writer.flush()
    }
}

pub mod summary {
    use serde::Serialize;
    use serde_json::to_writer_pretty;
    use std::fs::{self, File};
    use std::io;
    use std::path::Path;

    use eps_engine::RunSummary;

    /// Metadata describing where a run came from.
    #[derive(Debug)]
    pub struct Metadata<'a> {
        pub label: &'a str,
        pub orbital_period_s: f64,
        pub eclipse_fraction: f64,
        pub time_step_s: f64,
        pub duration_s: f64,
    }

    #[derive(Serialize)]
    struct SummarySidecar<'a> {
        label: &'a str,
        orbital_period_s: f64,
        eclipse_fraction: f64,
        time_step_s: f64,
        duration_s: f64,
        #[serde(flatten)]
        summary: &'a RunSummary,
    }

    /// Write a pretty-printed JSON summary next to the time-series export.
    pub fn write_json(output: &Path, meta: &Metadata<'_>, summary: &RunSummary) -> io::Result<()> {
        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let sidecar = SummarySidecar {
            label: meta.label,
            orbital_period_s: meta.orbital_period_s,
            eclipse_fraction: meta.eclipse_fraction,
            time_step_s: meta.time_step_s,
            duration_s: meta.duration_s,
            summary,
        };
        to_writer_pretty(File::create(output)?, &sidecar)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eps_config::SimulationConfig;
    use eps_engine::{Scenario, SweepAxis, run_sweep, simulate};

    #[test]
    fn timeseries_has_one_row_per_record() {
        let scenario = Scenario::new(&SimulationConfig::default()).unwrap();
        let result = simulate(&scenario).unwrap();
        let mut buf = Vec::new();
        timeseries::write_csv(&mut buf, &result).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some(timeseries::HEADER));
        let first = lines.next().unwrap();
        assert!(first.starts_with("0,0.0000,false,0.000000,5.000000,-5.000000,"));
        assert_eq!(text.lines().count(), result.records().len() + 1);
    }

    #[test]
    fn sweep_rows_mark_failures() {
        let scenario = Scenario::new(&SimulationConfig::default()).unwrap();
        let result = run_sweep(&scenario, &SweepAxis::BatteryCapacityWh(vec![50.0, -1.0]));
        let mut buf = Vec::new();
        sweep::write_csv(&mut buf, &result).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(rows.len(), 3);
        assert!(rows[1].starts_with("battery_capacity_wh,50,4,"));
        assert!(rows[1].ends_with(",true,"));
        assert!(rows[2].starts_with("battery_capacity_wh,-1,,"));
        assert!(rows[2].contains("battery capacity must be positive"));
        assert_eq!(
            rows[1].split(',').count(),
            sweep::HEADER.split(',').count()
        );
    }

    #[test]
    fn summary_sidecar_flattens_run_scalars() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("run.json");
        let scenario = Scenario::new(&SimulationConfig::default()).unwrap();
        let summary = simulate(&scenario).unwrap().summary();
        let meta = summary::Metadata {
            label: "reference",
            orbital_period_s: 5_760.0,
            eclipse_fraction: 0.35,
            time_step_s: 10.0,
            duration_s: 5_760.0,
        };
        summary::write_json(&path, &meta, &summary).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["label"], "reference");
        assert_eq!(value["panel_count"], 4);
        assert!(value["min_soc"].as_f64().unwrap() < 0.9);
    }
}
