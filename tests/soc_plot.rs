use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::{self, File};
use std::io::Write;

#[test]
fn soc_plot_renders_png() {
    let dir = tempfile::tempdir().expect("tempdir");
    let csv_path = dir.path().join("run.csv");
    let png_path = dir.path().join("soc.png");

    let mut file = File::create(&csv_path).expect("csv create");
    writeln!(
        file,
        "time_s,orbital_angle_deg,sunlit,solar_power_w,load_power_w,net_power_w,soc,safe_mode"
    )
    .unwrap();
    for i in 0..60 {
        let t = i as f64 * 100.0;
        let sunlit = i >= 20;
        let solar = if sunlit { 8.0 } else { 0.0 };
        writeln!(
            file,
            "{t},{:.4},{sunlit},{solar:.6},5.000000,{:.6},{:.9},false",
            t / 5_760.0 * 360.0,
            solar - 5.0,
            0.9 - 0.001 * (i as f64 - 20.0).abs(),
        )
        .unwrap();
    }

    Command::cargo_bin("soc_plot")
        .expect("soc_plot bin")
        .args([
            "--input",
            csv_path.to_str().unwrap(),
            "--output",
            png_path.to_str().unwrap(),
            "--threshold",
            "0.3",
            "--width",
            "400",
            "--height",
            "300",
        ])
        .assert()
        .success();

    let metadata = fs::metadata(png_path).expect("png metadata");
    assert!(metadata.len() > 0, "PNG output should not be empty");
}

#[test]
fn soc_plot_rejects_csv_without_soc_column() {
    let dir = tempfile::tempdir().expect("tempdir");
    let csv_path = dir.path().join("bad.csv");
    fs::write(&csv_path, "time_s,solar_power_w\n0,1.0\n").unwrap();

    Command::cargo_bin("soc_plot")
        .expect("soc_plot bin")
        .args([
            "--input",
            csv_path.to_str().unwrap(),
            "--output",
            dir.path().join("bad.png").to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("CSV missing 'soc' column"));
}
