use cubesat_eps::config::{SimulationConfig, load_config};
use cubesat_eps::engine::{Scenario, simulate};
use std::path::PathBuf;

fn sample(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("configs")
        .join(name)
}

#[test]
fn reference_file_matches_built_in_default() {
    let cfg = load_config(sample("reference.toml")).expect("reference.toml");
    assert_eq!(cfg, SimulationConfig::default());
}

#[test]
fn ground_pass_sample_runs_with_windows_and_shedding() {
    let cfg = load_config(sample("ground_passes.yaml")).expect("ground_passes.yaml");
    assert_eq!(cfg.comm_windows.len(), 2);
    let scenario = Scenario::new(&cfg).expect("valid scenario");
    let result = simulate(&scenario).expect("run");

    assert_eq!(result.records().len(), 3_457);
    let campaign = result
        .records()
        .iter()
        .find(|r| r.time_s == 12_000.0)
        .expect("campaign start");
    if !campaign.safe_mode {
        assert_eq!(campaign.load_power_w, 9.0);
    }
    assert!(
        result
            .records()
            .iter()
            .filter(|r| r.time_s >= 2_400.0 && r.time_s < 3_000.0)
            .all(|r| r.load_power_w == 15.0 || r.safe_mode)
    );
}

#[test]
fn budgeted_sample_derives_array_and_load() {
    let cfg = load_config(sample("budgeted.toml")).expect("budgeted.toml");
    assert_eq!(cfg.load_budget.len(), 4);
    let scenario = Scenario::new(&cfg).expect("valid scenario");
    assert!((scenario.array().unit_panel_power_w() - 1.881_242_25).abs() < 1e-9);
    assert!((scenario.loads().nominal_w() - 2.5).abs() < 1e-12);

    let result = simulate(&scenario).expect("run");
    assert_eq!(result.records().len(), 1_729);
    let sunlit = result.records().iter().find(|r| r.sunlit).expect("sunlit step");
    assert!((sunlit.net_power_w - (6.0 * 1.881_242_25 - 2.5)).abs() < 1e-9);
    assert!(result.is_viable());
}
