use anyhow::anyhow;
use clap::Parser;
use csv::ReaderBuilder;
use plotters::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Render SOC and power-balance curves from an eps_simulate CSV"
)]
struct Cli {
    #[arg(long)]
    input: PathBuf,
    #[arg(long, default_value = "artifacts/soc.png")]
    output: PathBuf,
    #[arg(long, default_value_t = 1200)]
    width: u32,
    #[arg(long, default_value_t = 900)]
    height: u32,
    /// Draw a horizontal SOC safety threshold line
    #[arg(long)]
    threshold: Option<f64>,
}

#[derive(Debug, Clone, Copy)]
struct Sample {
    time_s: f64,
    soc: f64,
    solar_power_w: f64,
    load_power_w: f64,
    net_power_w: f64,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let samples = read_samples(&cli.input)?;
    if samples.is_empty() {
        return Err(anyhow!("No rows in the provided CSV"));
    }

    if let Some(parent) = cli.output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let output_str = cli
        .output
        .to_str()
        .ok_or_else(|| anyhow!("Output path contains invalid UTF-8"))?;
    let root = BitMapBackend::new(output_str, (cli.width, cli.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let font_family = select_font_family();
    let caption_font = FontDesc::new(font_family, 24.0, FontStyle::Bold);
    let label_font = FontDesc::new(font_family, 18.0, FontStyle::Normal);

    let hours = |t: f64| t / 3_600.0;
    let t_min = hours(samples[0].time_s);
    let mut t_max = hours(samples[samples.len() - 1].time_s);
    if t_max <= t_min {
        t_max = t_min + 1.0;
    }

    let (soc_area, power_area) = root.split_vertically((cli.height / 2) as i32);

    {
        let mut chart = ChartBuilder::on(&soc_area)
            .margin(20)
            .caption("Battery state of charge", caption_font.clone())
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(t_min..t_max, 0.0..1.0)?;

        chart
            .configure_mesh()
            .x_desc("Time (h)")
            .y_desc("SOC")
            .label_style(label_font.clone())
            .y_label_formatter(&|v| format!("{v:.1}"))
            .draw()?;

        chart.draw_series(LineSeries::new(
            samples.iter().map(|s| (hours(s.time_s), s.soc)),
            ShapeStyle::from(&BLUE).stroke_width(2),
        ))?;

        if let Some(threshold) = cli.threshold {
            chart.draw_series(std::iter::once(PathElement::new(
                vec![(t_min, threshold), (t_max, threshold)],
                ShapeStyle::from(&RED.mix(0.7)).stroke_width(1),
            )))?;
        }
    }

    {
        let (p_min, p_max) = samples.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY),
            |(lo, hi), s| {
                let lo = lo.min(s.net_power_w).min(0.0);
                let hi = hi.max(s.solar_power_w).max(s.load_power_w).max(s.net_power_w);
                (lo, hi)
            },
        );
        let pad = ((p_max - p_min) * 0.05).max(0.5);

        let mut chart = ChartBuilder::on(&power_area)
            .margin(20)
            .caption("Power balance", caption_font)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(t_min..t_max, (p_min - pad)..(p_max + pad))?;

        chart
            .configure_mesh()
            .x_desc("Time (h)")
            .y_desc("Power (W)")
            .label_style(label_font.clone())
            .draw()?;

        let series: [(&str, RGBColor, fn(&Sample) -> f64); 3] = [
            ("solar", RGBColor(230, 160, 20), |s| s.solar_power_w),
            ("load", RGBColor(200, 40, 40), |s| s.load_power_w),
            ("net", RGBColor(30, 120, 60), |s| s.net_power_w),
        ];
        for (name, color, value) in series {
            chart
                .draw_series(LineSeries::new(
                    samples.iter().map(|s| (hours(s.time_s), value(s))),
                    ShapeStyle::from(&color).stroke_width(2),
                ))?
                .label(name)
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], ShapeStyle::from(&color))
                });
        }

        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .label_font(label_font)
            .draw()?;
    }

    root.present()?;
    Ok(())
}

fn select_font_family() -> FontFamily<'static> {
    if cfg!(target_os = "macos") {
        FontFamily::Name("Helvetica")
    } else if cfg!(target_os = "windows") {
        FontFamily::Name("Arial")
    } else {
        FontFamily::Name("DejaVu Sans")
    }
}

fn read_samples(path: &Path) -> anyhow::Result<Vec<Sample>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let headers = rdr.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| anyhow!("CSV missing '{}' column", name))
    };
    let time_idx = column("time_s")?;
    let soc_idx = column("soc")?;
    let solar_idx = column("solar_power_w")?;
    let load_idx = column("load_power_w")?;
    let net_idx = column("net_power_w")?;

    let mut samples = Vec::new();
    for rec in rdr.records() {
        let r = rec?;
        let field = |idx: usize| r.get(idx).unwrap_or("").parse::<f64>().unwrap_or(f64::NAN);
        let sample = Sample {
            time_s: field(time_idx),
            soc: field(soc_idx),
            solar_power_w: field(solar_idx),
            load_power_w: field(load_idx),
            net_power_w: field(net_idx),
        };
        if sample.time_s.is_finite() && sample.soc.is_finite() {
            samples.push(sample);
        }
    }
    Ok(samples)
}
