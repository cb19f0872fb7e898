use cubesat_eps::config::{LoadWindowConfig, SafeModeConfig, SimulationConfig, WindowRepeat};
use cubesat_eps::engine::{Scenario, SweepAxis, run_sweep, simulate};

fn run(cfg: &SimulationConfig) -> cubesat_eps::engine::RunResult {
    simulate(&Scenario::new(cfg).expect("valid scenario")).expect("run")
}

fn with_panels(panels: u32) -> SimulationConfig {
    SimulationConfig {
        panel_count: panels,
        ..SimulationConfig::default()
    }
}

#[test]
fn reference_scenario_minimum_is_pinned() {
    let result = run(&SimulationConfig::default());
    assert_eq!(result.records().len(), 577);
    let expected = 0.9 - 202.0 / 3_240.0;
    assert!(
        (result.min_soc() - expected).abs() < 1e-9,
        "min SOC {} vs {}",
        result.min_soc(),
        expected
    );
    assert_eq!(result.time_of_min_soc_s(), 2_010.0);
    assert!(result.is_viable());
}

#[test]
fn soc_stays_in_unit_interval_at_extremes() {
    let flooded = SimulationConfig {
        panel_count: 200,
        battery_capacity_wh: 2.0,
        ..SimulationConfig::default()
    }
    .with_orbits(3);
    let starved = SimulationConfig {
        panel_count: 0,
        battery_capacity_wh: 5.0,
        nominal_load_w: 40.0,
        ..SimulationConfig::default()
    }
    .with_orbits(3);

    let high = run(&flooded);
    let low = run(&starved);
    for record in high.records().iter().chain(low.records()) {
        assert!((0.0..=1.0).contains(&record.soc), "soc {}", record.soc);
    }
    assert_eq!(high.max_soc(), 1.0);
    assert_eq!(low.min_soc(), 0.0);
}

#[test]
fn repeated_runs_are_identical() {
    let cfg = SimulationConfig {
        comm_windows: vec![LoadWindowConfig {
            start_s: 2_500.0,
            end_s: 3_100.0,
            load_w: None,
            repeat: WindowRepeat::EveryOrbit,
        }],
        ..SimulationConfig::default()
    }
    .with_orbits(5);
    let scenario = Scenario::new(&cfg).unwrap();
    let first = simulate(&scenario).unwrap();
    let second = simulate(&scenario).unwrap();
    assert_eq!(first, second);
}

#[test]
fn minimum_soc_never_drops_as_panels_are_added() {
    let base = Scenario::new(&SimulationConfig::default().with_orbits(3)).unwrap();
    let sweep = run_sweep(&base, &SweepAxis::PanelCount((0..=12).collect()));
    let series = sweep.min_soc_series();
    assert_eq!(series.len(), 13);
    for pair in series.windows(2) {
        assert!(
            pair[1].1 >= pair[0].1,
            "min SOC fell from {} panels to {}",
            pair[0].0,
            pair[1].0
        );
    }
}

// Monotonicity only holds for a fixed load. Shedding reacts to SOC, so a
// stronger array can leave safe mode earlier and bottom out lower.
#[test]
fn load_shedding_can_reorder_minimum_soc() {
    let shedding = SimulationConfig {
        battery_capacity_wh: 10.0,
        initial_soc: 0.45,
        safe_mode: Some(SafeModeConfig {
            enter_below_soc: 0.3,
            load_w: 0.5,
        }),
        ..SimulationConfig::default()
    }
    .with_orbits(6);
    let fixed_load = SimulationConfig {
        safe_mode: None,
        ..shedding.clone()
    };
    let panels = SweepAxis::PanelCount((0..=8).collect());

    let shed = run_sweep(&Scenario::new(&shedding).unwrap(), &panels).min_soc_series();
    assert!(
        shed[2].1 < shed[1].1,
        "two panels {} vs one panel {}",
        shed[2].1,
        shed[1].1
    );

    let fixed = run_sweep(&Scenario::new(&fixed_load).unwrap(), &panels).min_soc_series();
    assert!(fixed.windows(2).all(|pair| pair[1].1 >= pair[0].1));
}

#[test]
fn eight_panels_do_at_least_as_well_as_two() {
    let two = run(&with_panels(2));
    let eight = run(&with_panels(8));
    assert!(eight.min_soc() >= two.min_soc());
}

#[test]
fn soc_never_rises_in_eclipse() {
    let result = run(&SimulationConfig::default().with_orbits(2));
    let mut previous = 0.9;
    for record in result.records() {
        if !record.sunlit {
            assert!(record.soc <= previous, "rose at t = {}", record.time_s);
        }
        previous = record.soc;
    }
}

#[test]
fn zero_panels_only_discharge() {
    let result = run(&with_panels(0));
    assert!(result.records().iter().all(|r| r.solar_power_w == 0.0));
    let mut previous = 0.9;
    for record in result.records() {
        assert!(record.net_power_w < 0.0);
        assert!(record.soc < previous);
        previous = record.soc;
    }
}

#[test]
fn one_point_sweep_matches_direct_run() {
    let cfg = with_panels(3);
    let direct = run(&cfg).summary();
    let base = Scenario::new(&SimulationConfig::default()).unwrap();
    let sweep = run_sweep(&base, &SweepAxis::PanelCount(vec![3]));
    assert_eq!(sweep.points().len(), 1);
    assert_eq!(sweep.points()[0].summary(), Some(&direct));
}

#[test]
fn mass_sweep_matches_panel_sweep() {
    let base = Scenario::new(&SimulationConfig::default()).unwrap();
    let by_mass = run_sweep(&base, &SweepAxis::ArrayMassKg(vec![0.1, 0.3]));
    let by_count = run_sweep(&base, &SweepAxis::PanelCount(vec![2, 6]));
    let mass_mins: Vec<f64> = by_mass.min_soc_series().iter().map(|p| p.1).collect();
    let count_mins: Vec<f64> = by_count.min_soc_series().iter().map(|p| p.1).collect();
    assert_eq!(mass_mins, count_mins);
}

#[test]
fn partial_final_step_is_dropped() {
    let cfg = SimulationConfig {
        duration_s: 95.0,
        ..SimulationConfig::default()
    };
    let result = run(&cfg);
    assert_eq!(result.records().len(), 10);
    assert_eq!(result.records()[9].time_s, 90.0);
}

#[test]
fn comm_window_raises_load_each_orbit() {
    let cfg = SimulationConfig {
        comm_windows: vec![LoadWindowConfig {
            start_s: 3_000.0,
            end_s: 3_600.0,
            load_w: None,
            repeat: WindowRepeat::EveryOrbit,
        }],
        ..SimulationConfig::default()
    }
    .with_orbits(2);
    let result = run(&cfg);
    let load_at = |t: f64| {
        result
            .records()
            .iter()
            .find(|r| r.time_s == t)
            .map(|r| r.load_power_w)
            .unwrap()
    };
    assert_eq!(load_at(2_990.0), 5.0);
    assert_eq!(load_at(3_000.0), 15.0);
    assert_eq!(load_at(3_590.0), 15.0);
    assert_eq!(load_at(3_600.0), 5.0);
    assert_eq!(load_at(5_760.0 + 3_000.0), 15.0);
}
